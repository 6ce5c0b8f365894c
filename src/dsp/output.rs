//! Audio output handle — creates the shared context on first use.
//!
//! The chat owns exactly one `AudioOutput` and lends it to the engine for
//! each effect. Opening happens once; a failed open is remembered and every
//! later request gets `None`, so sound simply stays off.

use std::ops::RangeInclusive;

use crate::error::AudioError;

use super::context::AudioContext;
#[cfg(feature = "playback")]
use super::device::{self, DeviceStream};

/// Sample rates a context can be created at.
pub const SUPPORTED_SAMPLE_RATES: RangeInclusive<u32> = 8_000..=192_000;

/// Reject rates the voices cannot be rendered at.
pub fn check_sample_rate(sample_rate: u32) -> Result<(), AudioError> {
    if SUPPORTED_SAMPLE_RATES.contains(&sample_rate) {
        Ok(())
    } else {
        Err(AudioError::UnsupportedFormat(format!(
            "sample rate {sample_rate}Hz outside {}..={}Hz",
            SUPPORTED_SAMPLE_RATES.start(),
            SUPPORTED_SAMPLE_RATES.end()
        )))
    }
}

/// Where rendered audio goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputTarget {
    /// No device: the host pulls samples (AudioWorklet, WAV capture, tests).
    Offline { sample_rate: u32 },
    /// The platform's default output device.
    #[cfg(feature = "playback")]
    DefaultDevice,
}

enum State {
    Closed,
    Open {
        context: AudioContext,
        #[cfg(feature = "playback")]
        _device: Option<DeviceStream>,
    },
    Failed,
}

pub struct AudioOutput {
    target: OutputTarget,
    master_gain: f64,
    state: State,
}

impl AudioOutput {
    pub fn new(target: OutputTarget) -> Self {
        AudioOutput {
            target,
            master_gain: 1.0,
            state: State::Closed,
        }
    }

    pub fn offline(sample_rate: u32) -> Self {
        Self::new(OutputTarget::Offline { sample_rate })
    }

    #[cfg(feature = "playback")]
    pub fn default_device() -> Self {
        Self::new(OutputTarget::DefaultDevice)
    }

    pub fn with_master_gain(mut self, gain: f64) -> Self {
        self.master_gain = gain;
        self
    }

    pub fn target(&self) -> OutputTarget {
        self.target
    }

    /// The context, opening it on first call. `None` if the output is unavailable.
    pub fn context(&mut self) -> Option<&AudioContext> {
        if matches!(self.state, State::Closed) {
            self.state = match self.open() {
                Ok(state) => state,
                Err(e) => {
                    log::warn!("Audio output unavailable, sound disabled: {e}");
                    State::Failed
                }
            };
        }
        self.existing()
    }

    /// The context if it has already been opened; never opens it.
    pub fn existing(&self) -> Option<&AudioContext> {
        match &self.state {
            State::Open { context, .. } => Some(context),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open { .. })
    }

    pub fn has_failed(&self) -> bool {
        matches!(self.state, State::Failed)
    }

    fn open(&self) -> Result<State, AudioError> {
        match self.target {
            OutputTarget::Offline { sample_rate } => {
                check_sample_rate(sample_rate)?;
                log::debug!("Opened offline audio context @ {sample_rate}Hz");
                Ok(State::Open {
                    context: AudioContext::new(sample_rate, self.master_gain),
                    #[cfg(feature = "playback")]
                    _device: None,
                })
            }
            #[cfg(feature = "playback")]
            OutputTarget::DefaultDevice => {
                let (context, stream) = device::open_default(self.master_gain)?;
                Ok(State::Open {
                    context,
                    _device: Some(stream),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_lazily() {
        let mut out = AudioOutput::offline(8000);
        assert!(!out.is_open());
        assert!(out.existing().is_none());
        assert!(out.context().is_some());
        assert!(out.is_open());
    }

    #[test]
    fn same_context_every_time() {
        let mut out = AudioOutput::offline(8000);
        if let Some(ctx) = out.context() {
            ctx.render(80);
        }
        let t = out.context().map(|c| c.current_time());
        assert_eq!(t, Some(0.01), "Second call must reuse the first context");
    }

    #[test]
    fn failure_is_remembered_and_silent() {
        let mut out = AudioOutput::offline(0);
        assert!(out.context().is_none());
        assert!(out.has_failed());
        assert!(out.context().is_none());
    }

    #[test]
    fn oversized_rate_fails_without_allocating() {
        let mut out = AudioOutput::offline(u32::MAX);
        assert!(out.context().is_none());
        assert!(out.has_failed());
    }

    #[test]
    fn rate_bounds_are_inclusive() {
        assert!(check_sample_rate(8_000).is_ok());
        assert!(check_sample_rate(192_000).is_ok());
        assert!(check_sample_rate(7_999).is_err());
        assert!(check_sample_rate(192_001).is_err());
    }
}
