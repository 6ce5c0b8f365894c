//! Toot parameters: what callers ask for, what the engine resolves it to,
//! and the per-call randomized plan a voice is built from.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Floor for gains that are ramped exponentially (zero is not reachable).
pub const MIN_GAIN: f64 = 0.0001;

/// Shortest effect the engine will schedule, in seconds.
pub const MIN_DURATION: f64 = 0.05;

/// Longest requested duration, in seconds, before jitter.
pub const MAX_DURATION: f64 = 30.0;

/// Partial synthesis parameters. Every field is optional; omitted fields
/// fall back to [`SynthesisParameters::default`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TootParams {
    /// Duration in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Wetness [0, 1]: 0 = dry puff, 1 = very wet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wet: Option<f64>,
    /// Base tone frequency in Hz.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
    /// Vibrato rate in Hz.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibrato: Option<f64>,
    /// Vibrato deviation in Hz.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibrato_depth: Option<f64>,
    /// Output volume [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl TootParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn with_wet(mut self, wet: f64) -> Self {
        self.wet = Some(wet);
        self
    }

    pub fn with_pitch(mut self, hz: f64) -> Self {
        self.pitch = Some(hz);
        self
    }

    pub fn with_vibrato_depth(mut self, hz: f64) -> Self {
        self.vibrato_depth = Some(hz);
        self
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Fill in defaults and force every value into its legal range.
    pub fn resolve(&self) -> SynthesisParameters {
        let d = SynthesisParameters::default();
        let pick = |v: Option<f64>, fallback: f64| v.filter(|x| x.is_finite()).unwrap_or(fallback);

        SynthesisParameters {
            duration: pick(self.duration, d.duration).clamp(MIN_DURATION, MAX_DURATION),
            wetness: pick(self.wet, d.wetness).clamp(0.0, 1.0),
            base_pitch_hz: pick(self.pitch, d.base_pitch_hz).max(1.0),
            vibrato_rate_hz: pick(self.vibrato, d.vibrato_rate_hz).max(0.0),
            vibrato_depth_hz: pick(self.vibrato_depth, d.vibrato_depth_hz).max(0.0),
            volume: pick(self.volume, d.volume).clamp(MIN_GAIN, 1.0),
        }
    }
}

/// Fully resolved parameters, before per-call jitter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisParameters {
    pub duration: f64,
    pub wetness: f64,
    pub base_pitch_hz: f64,
    pub vibrato_rate_hz: f64,
    pub vibrato_depth_hz: f64,
    pub volume: f64,
}

impl Default for SynthesisParameters {
    fn default() -> Self {
        SynthesisParameters {
            duration: 1.2,
            wetness: 0.5,
            base_pitch_hz: 70.0,
            vibrato_rate_hz: 6.0,
            vibrato_depth_hz: 8.0,
            volume: 0.7,
        }
    }
}

impl SynthesisParameters {
    /// Draw every random quantity one effect needs.
    ///
    /// Relative jitter: duration ±10%, pitch ±15%, vibrato rate ±10%,
    /// vibrato depth ±25%; wetness is shifted ±0.2 and clamped.
    pub fn plan<R: Rng>(&self, rng: &mut R) -> EffectPlan {
        let duration = (self.duration * (1.0 + rng.random_range(-0.1..0.1))).max(MIN_DURATION);
        let pitch_hz = self.base_pitch_hz * (1.0 + rng.random_range(-0.15..0.15));
        let wetness = (self.wetness + rng.random_range(-0.2..0.2)).clamp(0.0, 1.0);
        let vibrato_depth_hz = self.vibrato_depth_hz * (1.0 + rng.random_range(-0.25..0.25));
        let vibrato_rate_hz = self.vibrato_rate_hz * (1.0 + rng.random_range(-0.1..0.1));
        let tone_start_hz = pitch_hz + rng.random_range(0.0..20.0);
        let sputter_hz = 12.0 + rng.random_range(0.0..18.0);
        let sputter_delay = rng.random_range(0.0..0.05);
        let noise_seed = rng.random();

        EffectPlan {
            base: *self,
            duration,
            pitch_hz,
            wetness,
            vibrato_rate_hz,
            vibrato_depth_hz,
            tone_start_hz,
            sputter_hz,
            sputter_delay,
            noise_seed,
        }
    }
}

/// One effect's parameters after jitter. A voice built from the same plan
/// always renders the same samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectPlan {
    /// The parameters the plan was drawn from.
    pub base: SynthesisParameters,
    /// Effective duration `D` in seconds.
    pub duration: f64,
    pub pitch_hz: f64,
    pub wetness: f64,
    pub vibrato_rate_hz: f64,
    pub vibrato_depth_hz: f64,
    /// Tone frequency at t = 0, before the glide.
    pub tone_start_hz: f64,
    /// Sputter rate at t = 0; it halves by `D`.
    pub sputter_hz: f64,
    /// Seconds after t = 0 at which the sputter oscillator starts.
    pub sputter_delay: f64,
    pub noise_seed: u64,
}

impl EffectPlan {
    pub fn volume(&self) -> f64 {
        self.base.volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn empty_params_resolve_to_defaults() {
        let p = TootParams::new().resolve();
        assert_eq!(p, SynthesisParameters::default());
    }

    #[test]
    fn resolve_clamps_out_of_range() {
        let p = TootParams::new()
            .with_wet(3.0)
            .with_volume(-1.0)
            .with_duration(0.0)
            .with_pitch(f64::NAN)
            .resolve();
        assert_eq!(p.wetness, 1.0);
        assert_eq!(p.volume, MIN_GAIN);
        assert_eq!(p.duration, MIN_DURATION);
        assert_eq!(p.base_pitch_hz, 70.0, "NaN should fall back to the default");
    }

    #[test]
    fn huge_duration_is_capped() {
        let p = TootParams::new().with_duration(1e12).resolve();
        assert_eq!(p.duration, MAX_DURATION);
        let plan = p.plan(&mut StdRng::seed_from_u64(2));
        assert!(plan.duration <= MAX_DURATION * 1.1 + 1e-9);
    }

    #[test]
    fn parses_camel_case_json() {
        let p: TootParams =
            serde_json::from_str(r#"{"wet": 0.3, "pitch": 110, "vibratoDepth": 4}"#).unwrap();
        assert_eq!(p.wet, Some(0.3));
        assert_eq!(p.pitch, Some(110.0));
        assert_eq!(p.vibrato_depth, Some(4.0));
        assert_eq!(p.duration, None);
    }

    #[test]
    fn jitter_stays_within_ranges() {
        let base = SynthesisParameters::default();
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..1000 {
            let plan = base.plan(&mut rng);
            assert!((1.08..=1.32).contains(&plan.duration), "duration {}", plan.duration);
            assert!((59.5..=80.5).contains(&plan.pitch_hz), "pitch {}", plan.pitch_hz);
            assert!((0.3..=0.7).contains(&plan.wetness), "wet {}", plan.wetness);
            assert!((6.0..=10.0).contains(&plan.vibrato_depth_hz), "depth {}", plan.vibrato_depth_hz);
            assert!((5.4..=6.6).contains(&plan.vibrato_rate_hz), "rate {}", plan.vibrato_rate_hz);
            assert!(plan.tone_start_hz >= plan.pitch_hz && plan.tone_start_hz < plan.pitch_hz + 20.0);
            assert!((12.0..30.0).contains(&plan.sputter_hz));
            assert!((0.0..0.05).contains(&plan.sputter_delay));
        }
    }

    #[test]
    fn wetness_jitter_is_clamped() {
        let base = TootParams::new().with_wet(0.0).resolve();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let plan = base.plan(&mut rng);
            assert!((0.0..=0.2).contains(&plan.wetness));
        }
    }

    #[test]
    fn repeated_plans_differ() {
        let base = SynthesisParameters::default();
        let mut rng = StdRng::seed_from_u64(5);
        let a = base.plan(&mut rng);
        let b = base.plan(&mut rng);
        assert_ne!(a, b, "Identical presets must not produce identical effects");
        assert_eq!(a.base, b.base);
    }
}
