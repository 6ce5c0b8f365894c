//! Mixer — Sums overlapping toot voices with master gain.

use super::voice::TootVoice;

/// A summing mixer for one render block.
#[derive(Debug, Clone)]
pub struct Mixer {
    pub master_gain: f64,
    buffer: Vec<f64>,
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}

impl Mixer {
    pub fn new() -> Self {
        Mixer {
            master_gain: 1.0,
            buffer: Vec::new(),
        }
    }

    /// Prepare a block of `num_samples` filled with zeros.
    pub fn clear(&mut self, num_samples: usize) {
        self.buffer.clear();
        self.buffer.resize(num_samples, 0.0);
    }

    /// Render `voice` into the block starting at `offset`, stopping at the
    /// block end or when the voice finishes.
    pub fn add_voice(&mut self, offset: usize, voice: &mut TootVoice) {
        for index in offset..self.buffer.len() {
            if voice.is_finished() {
                break;
            }
            let sample = voice.next_sample();
            self.buffer[index] += sample;
        }
    }

    /// Write the block to `out` with master gain and soft clipping applied.
    pub fn output_into(&self, out: &mut [f32]) {
        for (dst, &s) in out.iter_mut().zip(&self.buffer) {
            *dst = soft_clip(s * self.master_gain) as f32;
        }
    }
}

/// Soft clipper using tanh so stacked toots saturate instead of wrapping.
fn soft_clip(x: f64) -> f64 {
    x.tanh()
}
