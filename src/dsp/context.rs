//! Audio context — the shared render timeline every effect is scheduled on.
//!
//! The context owns the clock (`current_time` advances only as samples are
//! rendered) and the set of playing voices. Whoever consumes audio pulls
//! blocks with [`AudioContext::render_into`]: a device callback, an
//! AudioWorklet through the WASM bindings, or an offline WAV export.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::toot::EffectPlan;

use super::mixer::Mixer;
use super::voice::TootVoice;

/// A voice plus the frame it starts on.
struct ScheduledVoice {
    start_frame: u64,
    voice: TootVoice,
}

struct Timeline {
    sample_rate: u32,
    /// Frames rendered since the context was created.
    frame: u64,
    voices: Vec<ScheduledVoice>,
    mixer: Mixer,
}

impl Timeline {
    fn render_into(&mut self, out: &mut [f32]) {
        let block_start = self.frame;
        let block_end = block_start + out.len() as u64;

        self.mixer.clear(out.len());
        for scheduled in self.voices.iter_mut() {
            if scheduled.start_frame >= block_end {
                continue;
            }
            let offset = scheduled.start_frame.saturating_sub(block_start) as usize;
            self.mixer.add_voice(offset, &mut scheduled.voice);
        }
        self.mixer.output_into(out);

        self.frame = block_end;
        self.voices.retain(|v| !v.voice.is_finished());
    }
}

/// Cloneable handle to one render timeline.
#[derive(Clone)]
pub struct AudioContext {
    timeline: Arc<Mutex<Timeline>>,
}

impl AudioContext {
    pub fn new(sample_rate: u32, master_gain: f64) -> Self {
        let mut mixer = Mixer::new();
        mixer.master_gain = master_gain;
        AudioContext {
            timeline: Arc::new(Mutex::new(Timeline {
                sample_rate,
                frame: 0,
                voices: Vec::new(),
                mixer,
            })),
        }
    }

    // A panic inside a render callback must not silence the context forever.
    fn timeline(&self) -> MutexGuard<'_, Timeline> {
        self.timeline.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn sample_rate(&self) -> u32 {
        self.timeline().sample_rate
    }

    /// Seconds of audio rendered so far.
    pub fn current_time(&self) -> f64 {
        let t = self.timeline();
        t.frame as f64 / t.sample_rate as f64
    }

    /// Start an effect at the current time. Returns the start time in seconds.
    pub fn schedule(&self, plan: EffectPlan) -> f64 {
        let mut t = self.timeline();
        let voice = TootVoice::new(plan, t.sample_rate as f64);
        let start_frame = t.frame;
        t.voices.push(ScheduledVoice { start_frame, voice });
        start_frame as f64 / t.sample_rate as f64
    }

    /// Render the next `out.len()` mono frames.
    pub fn render_into(&self, out: &mut [f32]) {
        self.timeline().render_into(out);
    }

    /// Render the next `frames` mono frames into a new buffer.
    pub fn render(&self, frames: usize) -> Vec<f32> {
        let mut out = vec![0.0_f32; frames];
        self.render_into(&mut out);
        out
    }

    /// Voices still sounding.
    pub fn active_voices(&self) -> usize {
        self.timeline().voices.len()
    }

    /// Plans of the voices still sounding, oldest first.
    pub fn active_plans(&self) -> Vec<EffectPlan> {
        self.timeline().voices.iter().map(|v| *v.voice.plan()).collect()
    }

    /// Frames until every scheduled voice has stopped.
    pub fn frames_remaining(&self) -> u64 {
        let t = self.timeline();
        t.voices
            .iter()
            .map(|v| {
                let end = v.start_frame + v.voice.len_samples() as u64;
                end.saturating_sub(t.frame)
            })
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toot::TootParams;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn plan(duration: f64, seed: u64) -> EffectPlan {
        TootParams::new()
            .with_duration(duration)
            .resolve()
            .plan(&mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn clock_advances_with_rendering() {
        let ctx = AudioContext::new(8000, 1.0);
        assert_eq!(ctx.current_time(), 0.0);
        ctx.render(4000);
        assert!((ctx.current_time() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn schedule_starts_at_current_time() {
        let ctx = AudioContext::new(8000, 1.0);
        ctx.render(800);
        let start = ctx.schedule(plan(0.5, 1));
        assert!((start - 0.1).abs() < 1e-12);
        assert_eq!(ctx.active_voices(), 1);
    }

    #[test]
    fn finished_voices_are_dropped() {
        let ctx = AudioContext::new(8000, 1.0);
        ctx.schedule(plan(0.3, 2));
        let remaining = ctx.frames_remaining();
        assert!(remaining > 0);
        for _ in 0..(remaining / 128 + 1) {
            ctx.render(128);
        }
        assert_eq!(ctx.active_voices(), 0, "No voice may outlive its stop");
        assert_eq!(ctx.frames_remaining(), 0);
    }

    #[test]
    fn overlapping_effects_mix() {
        let ctx = AudioContext::new(8000, 1.0);
        ctx.schedule(plan(1.0, 3));
        ctx.render(100);
        ctx.schedule(plan(1.0, 4));
        assert_eq!(ctx.active_voices(), 2);
        let block = ctx.render(2000);
        assert!(block.iter().any(|s| s.abs() > 0.001));
        assert!(block.iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn idle_context_renders_silence() {
        let ctx = AudioContext::new(8000, 1.0);
        assert!(ctx.render(256).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn clones_share_one_timeline() {
        let ctx = AudioContext::new(8000, 1.0);
        let device_side = ctx.clone();
        ctx.schedule(plan(0.5, 5));
        device_side.render(400);
        assert!((ctx.current_time() - 0.05).abs() < 1e-12);
        assert_eq!(device_side.active_plans().len(), 1);
    }
}
