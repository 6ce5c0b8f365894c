//! Tapered white-noise burst buffer.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Length of the noise burst in seconds. Effects longer than this run the
/// buffer dry and the noise layer falls silent early.
pub const NOISE_SECONDS: f64 = 2.0;

/// A one-shot buffer of white noise whose amplitude tapers linearly to zero.
#[derive(Debug, Clone)]
pub struct NoiseBurst {
    data: Vec<f32>,
    position: usize,
}

impl NoiseBurst {
    /// Fill `NOISE_SECONDS` of samples from a seeded generator.
    pub fn new(sample_rate: f64, seed: u64) -> Self {
        let len = (NOISE_SECONDS * sample_rate) as usize;
        let mut rng = StdRng::seed_from_u64(seed);
        let data = (0..len)
            .map(|i| {
                let taper = 1.0 - i as f32 / len as f32;
                rng.random_range(-1.0_f32..1.0) * taper
            })
            .collect();
        NoiseBurst { data, position: 0 }
    }

    /// Next sample, or silence once the buffer is exhausted.
    pub fn next_sample(&mut self) -> f64 {
        match self.data.get(self.position) {
            Some(&s) => {
                self.position += 1;
                s as f64
            }
            None => 0.0,
        }
    }
}
