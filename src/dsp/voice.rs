//! Voice — one toot: a pitched tone, filtered noise and a sputter modulator
//! summed into an enveloped master gain.
//!
//! Signal graph (all automation times relative to the voice start, `D` = duration):
//!
//! ```text
//!  vibrato (sine) ─► depth env ─┐
//!                               ▼ (+Hz)
//!  tone (saw, glide) ───────────────────────┐
//!  noise ─► bandpass ─► lowpass ─► noise env ┼─► master env ─► out
//!                                           │        ▲ (+gain)
//!  sputter (square, slowing) ─► sputter gain ─────────┘
//! ```

use crate::toot::{EffectPlan, MIN_GAIN};

use super::envelope::Automation;
use super::filter::{BiquadFilter, FilterType};
use super::noise::NoiseBurst;
use super::oscillator::{Oscillator, Waveform};

/// A single scheduled effect. Produces silence and reports finished once
/// `D` has elapsed; every source stops at the same instant.
#[derive(Debug, Clone)]
pub struct TootVoice {
    plan: EffectPlan,
    sample_rate: f64,
    /// Samples rendered so far.
    position: usize,
    /// Sample index at which everything stops.
    stop_sample: usize,
    /// Sample index at which the sputter oscillator starts.
    sputter_start: usize,

    master_gain: Automation,

    tone: Oscillator,
    tone_freq: Automation,
    vibrato: Oscillator,
    vibrato_depth: Automation,

    noise: NoiseBurst,
    bandpass: BiquadFilter,
    bandpass_freq: Automation,
    lowpass: BiquadFilter,
    lowpass_freq: Automation,
    noise_gain: Automation,

    sputter: Oscillator,
    sputter_freq: Automation,
    sputter_gain: f64,
}

impl TootVoice {
    pub fn new(plan: EffectPlan, sample_rate: f64) -> Self {
        let d = plan.duration;
        let wet = plan.wetness;

        let mut master_gain = Automation::new(1.0);
        master_gain
            .set_value_at_time(MIN_GAIN, 0.0)
            .exponential_ramp_to_value_at_time(plan.volume(), 0.03)
            .exponential_ramp_to_value_at_time(0.001, d);

        // Tone glides down to half pitch (never below 30 Hz) over the first 70%.
        let mut tone_freq = Automation::new(plan.tone_start_hz);
        tone_freq
            .set_value_at_time(plan.tone_start_hz, 0.0)
            .exponential_ramp_to_value_at_time((plan.pitch_hz * 0.5).max(30.0), d * 0.7);

        // Vibrato fades in to full depth at 30%, back out by D.
        let mut vibrato = Oscillator::new(Waveform::Sine, sample_rate);
        vibrato.frequency = plan.vibrato_rate_hz;
        let mut vibrato_depth = Automation::new(0.0);
        vibrato_depth
            .set_value_at_time(0.0, 0.0)
            .linear_ramp_to_value_at_time(plan.vibrato_depth_hz, d * 0.3)
            .linear_ramp_to_value_at_time(0.0, d);

        // Bandpass centre keys off the un-jittered pitch.
        let bp_base = plan.base.base_pitch_hz * (1.0 + wet * 1.5);
        let mut bandpass_freq = Automation::new(bp_base);
        bandpass_freq
            .set_value_at_time(bp_base * 2.5, 0.0)
            .exponential_ramp_to_value_at_time(bp_base * 0.8, 0.1)
            .linear_ramp_to_value_at_time(bp_base, d * 0.5);
        let mut bandpass = BiquadFilter::new(FilterType::Bandpass, sample_rate);
        bandpass.set_q(0.3 + wet * 6.0);

        let lp_base = 900.0 + wet * 1200.0;
        let mut lowpass_freq = Automation::new(lp_base);
        lowpass_freq
            .set_value_at_time(lp_base, 0.0)
            .exponential_ramp_to_value_at_time(lp_base * 0.6, d);
        let lowpass = BiquadFilter::new(FilterType::Lowpass, sample_rate);

        let mut noise_gain = Automation::new(1.0);
        noise_gain
            .set_value_at_time(MIN_GAIN, 0.0)
            .exponential_ramp_to_value_at_time(0.6 + wet * 0.7, 0.05)
            .exponential_ramp_to_value_at_time(0.001, d);

        let mut sputter_freq = Automation::new(plan.sputter_hz);
        sputter_freq
            .set_value_at_time(plan.sputter_hz, 0.0)
            .exponential_ramp_to_value_at_time(plan.sputter_hz * 0.5, d);

        TootVoice {
            plan,
            sample_rate,
            position: 0,
            stop_sample: (d * sample_rate).round() as usize,
            sputter_start: (plan.sputter_delay * sample_rate).round() as usize,
            master_gain,
            tone: Oscillator::new(Waveform::Sawtooth, sample_rate),
            tone_freq,
            vibrato,
            vibrato_depth,
            noise: NoiseBurst::new(sample_rate, plan.noise_seed),
            bandpass,
            bandpass_freq,
            lowpass,
            lowpass_freq,
            noise_gain,
            sputter: Oscillator::new(Waveform::Square, sample_rate),
            sputter_freq,
            sputter_gain: 0.4 + wet * 0.6,
        }
    }

    /// Generate the next sample.
    pub fn next_sample(&mut self) -> f64 {
        if self.is_finished() {
            return 0.0;
        }
        let n = self.position;
        let t = n as f64 / self.sample_rate;
        self.position += 1;

        // Tone with vibrato added to its frequency parameter.
        let vibrato = self.vibrato.next_sample() * self.vibrato_depth.value_at(t);
        let tone = self.tone.next_sample_at(self.tone_freq.value_at(t) + vibrato);

        // Air burst.
        self.bandpass.set_frequency(self.bandpass_freq.value_at(t));
        self.lowpass.set_frequency(self.lowpass_freq.value_at(t));
        let air = self.lowpass.process(self.bandpass.process(self.noise.next_sample()));
        let air = air * self.noise_gain.value_at(t);

        // Sputter drives the master gain parameter, not the audio sum.
        let sputter = if n >= self.sputter_start {
            self.sputter.next_sample_at(self.sputter_freq.value_at(t)) * self.sputter_gain
        } else {
            0.0
        };
        let gain = self.master_gain.value_at(t) + sputter;

        (tone + air) * gain
    }

    /// Is this voice past its scheduled stop?
    pub fn is_finished(&self) -> bool {
        self.position >= self.stop_sample
    }

    /// Total length of the voice in samples.
    pub fn len_samples(&self) -> usize {
        self.stop_sample
    }

    pub fn plan(&self) -> &EffectPlan {
        &self.plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toot::{SynthesisParameters, TootParams};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const SR: f64 = 22050.0;

    fn plan_for(params: TootParams, seed: u64) -> EffectPlan {
        params.resolve().plan(&mut StdRng::seed_from_u64(seed))
    }

    fn render_all(voice: &mut TootVoice) -> Vec<f64> {
        let mut out = Vec::new();
        while !voice.is_finished() {
            out.push(voice.next_sample());
        }
        out
    }

    #[test]
    fn voice_produces_sound() {
        let mut v = TootVoice::new(plan_for(TootParams::new(), 1), SR);
        let out = render_all(&mut v);
        let peak = out.iter().fold(0.0_f64, |m, s| m.max(s.abs()));
        assert!(peak > 0.01, "Voice should produce audible output, peak {peak}");
    }

    #[test]
    fn stops_exactly_at_duration() {
        let plan = plan_for(TootParams::new().with_duration(0.5), 2);
        let mut v = TootVoice::new(plan, SR);
        let out = render_all(&mut v);
        assert_eq!(out.len(), (plan.duration * SR).round() as usize);
        assert!(v.is_finished());
        for _ in 0..100 {
            assert_eq!(v.next_sample(), 0.0, "Voice must be silent after its stop");
        }
    }

    #[test]
    fn output_finite_and_bounded() {
        for seed in 0..8 {
            let plan = plan_for(TootParams::new().with_wet(1.0).with_volume(1.0), seed);
            let mut v = TootVoice::new(plan, SR);
            for (i, s) in render_all(&mut v).into_iter().enumerate() {
                assert!(s.is_finite(), "Non-finite sample {i} (seed {seed})");
                assert!(s.abs() < 10.0, "Runaway sample {s} at {i} (seed {seed})");
            }
        }
    }

    #[test]
    fn fades_in_from_near_silence() {
        let mut v = TootVoice::new(plan_for(TootParams::new(), 3), SR);
        let first = v.next_sample();
        assert!(first.abs() < 0.01, "Attack should start near zero, got {first}");
    }

    #[test]
    fn glide_lands_on_half_pitch() {
        let plan = plan_for(TootParams::new().with_pitch(110.0), 4);
        let v = TootVoice::new(plan, SR);
        let d = plan.duration;
        let target = (plan.pitch_hz * 0.5).max(30.0);
        assert!((v.tone_freq.value_at(0.0) - plan.tone_start_hz).abs() < 1e-9);
        assert!((v.tone_freq.value_at(d * 0.7) - target).abs() < 1e-9);
        assert!((v.tone_freq.value_at(d) - target).abs() < 1e-9, "Glide holds after 70%");
    }

    #[test]
    fn low_pitch_glide_floors_at_thirty_hz() {
        let plan = plan_for(TootParams::new().with_pitch(40.0), 5);
        let v = TootVoice::new(plan, SR);
        assert!((v.tone_freq.value_at(plan.duration) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn vibrato_fades_in_and_out() {
        let plan = plan_for(TootParams::new(), 7);
        let v = TootVoice::new(plan, SR);
        let d = plan.duration;
        assert_eq!(v.vibrato_depth.value_at(0.0), 0.0);
        assert!((v.vibrato_depth.value_at(d * 0.3) - plan.vibrato_depth_hz).abs() < 1e-9);
        assert!(v.vibrato_depth.value_at(d).abs() < 1e-9);
    }

    #[test]
    fn bandpass_swoops_then_settles() {
        let plan = plan_for(TootParams::new(), 8);
        let v = TootVoice::new(plan, SR);
        let base = plan.base.base_pitch_hz * (1.0 + plan.wetness * 1.5);
        assert!((v.bandpass_freq.value_at(0.0) - base * 2.5).abs() < 1e-9);
        assert!((v.bandpass_freq.value_at(0.1) - base * 0.8).abs() < 1e-9);
        assert!((v.bandpass_freq.value_at(plan.duration * 0.5) - base).abs() < 1e-9);
        let q = 0.3 + plan.wetness * 6.0;
        assert!((v.bandpass.q - q).abs() < 1e-12);
    }

    #[test]
    fn lowpass_decays_to_sixty_percent() {
        let plan = plan_for(TootParams::new().with_wet(0.9), 9);
        let v = TootVoice::new(plan, SR);
        let start = 900.0 + plan.wetness * 1200.0;
        assert!((v.lowpass_freq.value_at(0.0) - start).abs() < 1e-9);
        assert!((v.lowpass_freq.value_at(plan.duration) - start * 0.6).abs() < 1e-9);
    }

    #[test]
    fn sputter_waits_for_its_start() {
        let plan = plan_for(TootParams::new(), 10);
        let v = TootVoice::new(plan, SR);
        assert_eq!(v.sputter_start, (plan.sputter_delay * SR).round() as usize);
        assert!(v.sputter_start < v.stop_sample);
        assert!((v.sputter_gain - (0.4 + plan.wetness * 0.6)).abs() < 1e-12);
    }

    #[test]
    fn noise_gain_swells_then_dies() {
        let plan = plan_for(TootParams::new().with_wet(0.4), 12);
        let v = TootVoice::new(plan, SR);
        assert!((v.noise_gain.value_at(0.0) - MIN_GAIN).abs() < 1e-12);
        assert!((v.noise_gain.value_at(0.05) - (0.6 + plan.wetness * 0.7)).abs() < 1e-9);
        assert!((v.noise_gain.value_at(plan.duration) - 0.001).abs() < 1e-9);
    }

    #[test]
    fn sputter_modulates_master_gain() {
        let plan = plan_for(TootParams::new(), 10);
        let mut with = TootVoice::new(plan, SR);
        let mut without = TootVoice::new(plan, SR);
        without.sputter_gain = 0.0;
        let master = without.master_gain.clone();
        let depth = with.sputter_gain;
        let start = with.sputter_start;
        let a = render_all(&mut with);
        let b = render_all(&mut without);

        assert_eq!(a[..start], b[..start], "Gain is unmodulated before the sputter starts");

        // a = src * (master + sputter), b = src * master
        let from = start.max((0.05 * SR) as usize);
        let to = (plan.duration * 0.8 * SR) as usize;
        let mut sputter = Vec::new();
        for n in from..to {
            let src = b[n] / master.value_at(n as f64 / SR);
            if src.abs() > 1e-3 {
                sputter.push((a[n] - b[n]) / src);
            }
        }
        assert!(!sputter.is_empty());

        let at_depth = sputter
            .iter()
            .filter(|s| (s.abs() - depth).abs() < 0.05 * depth)
            .count();
        assert!(
            at_depth * 10 > sputter.len() * 8,
            "Modulator should sit at ±{depth}: {at_depth} of {} samples",
            sputter.len()
        );

        // Two sign flips per square cycle; the rate halves over D.
        let flips = sputter.windows(2).filter(|w| w[0].signum() != w[1].signum()).count();
        let window = (to - from) as f64 / SR;
        let lo = (plan.sputter_hz * window).floor() as usize;
        let hi = (2.0 * plan.sputter_hz * window).ceil() as usize;
        assert!(
            (lo.saturating_sub(4)..=hi + 4).contains(&flips),
            "{flips} flips outside {lo}..={hi} for {} Hz",
            plan.sputter_hz
        );
    }

    #[test]
    fn same_plan_same_samples() {
        let plan = plan_for(TootParams::new(), 11);
        let a = render_all(&mut TootVoice::new(plan, SR));
        let b = render_all(&mut TootVoice::new(plan, SR));
        assert_eq!(a, b);
    }

    #[test]
    fn long_effect_outlasts_noise_buffer() {
        let base = SynthesisParameters {
            duration: 3.0,
            ..SynthesisParameters::default()
        };
        let plan = base.plan(&mut StdRng::seed_from_u64(6));
        let mut v = TootVoice::new(plan, 8000.0);
        let out = render_all(&mut v);
        assert_eq!(out.len(), v.len_samples());
        assert!(out.iter().all(|s| s.is_finite()));
    }
}
