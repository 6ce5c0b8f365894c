//! Synth engine — turns toot parameters into a scheduled effect.
//!
//! `play_effect` is fire-and-forget: it draws the random plan, hands a voice
//! to the shared context and returns. There is no completion signal and no
//! cap on overlapping effects; the context mixes whatever is scheduled.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::toot::{EffectPlan, TootParams};

use super::output::AudioOutput;

/// The engine: a mute switch plus the randomness that keeps repeated
/// toots from sounding identical.
pub struct SynthEngine {
    enabled: bool,
    rng: StdRng,
}

impl Default for SynthEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SynthEngine {
    /// An enabled engine seeded from the OS.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    /// An enabled engine with reproducible jitter.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        SynthEngine { enabled: true, rng }
    }

    /// Gate future effects. Effects already scheduled keep playing.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Schedule one toot on `output`, opening it if needed.
    ///
    /// Returns the plan that was scheduled, or `None` when sound is disabled
    /// or the output is unavailable. Never fails and never blocks.
    pub fn play_effect(&mut self, output: &mut AudioOutput, params: &TootParams) -> Option<EffectPlan> {
        if !self.enabled {
            return None;
        }
        let ctx = output.context()?;

        let plan = params.resolve().plan(&mut self.rng);
        let start = ctx.schedule(plan);
        log::debug!(
            "Toot @ {start:.3}s: {:.2}s, {:.1}Hz, wet {:.2}",
            plan.duration,
            plan.pitch_hz,
            plan.wetness
        );
        Some(plan)
    }
}
