//! Bot configuration. Every field has a default, so `{}` is a valid config.

use serde::{Deserialize, Serialize};

use crate::dsp::output::SUPPORTED_SAMPLE_RATES;
use crate::error::FartBotError;
use crate::preset::{TootPreset, builtin_presets};

pub const GREETING: &str = "Welcome to FartBot. I speak fluent 💨. Ask me anything!";
pub const CLEARED: &str = "Chat cleared. Fresh air... for now.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BotConfig {
    /// Delay before the bot answers typed input, in milliseconds.
    pub thinking_delay_ms: u64,
    /// Delay before the bot answers a preset press, in milliseconds.
    pub preset_reply_delay_ms: u64,
    /// Sample rate of the offline context (ignored by device output).
    pub sample_rate: u32,
    /// Gain applied to the mix before soft clipping.
    pub master_gain: f64,
    /// First bot message.
    pub greeting: String,
    /// The single message left after a clear.
    pub cleared_text: String,
    pub presets: Vec<TootPreset>,
    /// Fixes reply picks and effect jitter when set.
    pub seed: Option<u64>,
    /// Whether sound starts enabled.
    pub sound_enabled: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        BotConfig {
            thinking_delay_ms: 150,
            preset_reply_delay_ms: 120,
            sample_rate: 44100,
            master_gain: 1.0,
            greeting: GREETING.to_string(),
            cleared_text: CLEARED.to_string(),
            presets: builtin_presets(),
            seed: None,
            sound_enabled: true,
        }
    }
}

impl BotConfig {
    /// Parse a JSON config; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, FartBotError> {
        let config: BotConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), FartBotError> {
        if !SUPPORTED_SAMPLE_RATES.contains(&self.sample_rate) {
            return Err(FartBotError::Config(format!(
                "sampleRate must be within {}..={}, got {}",
                SUPPORTED_SAMPLE_RATES.start(),
                SUPPORTED_SAMPLE_RATES.end(),
                self.sample_rate
            )));
        }
        if !self.master_gain.is_finite() || self.master_gain < 0.0 {
            return Err(FartBotError::Config(format!(
                "masterGain must be a non-negative number, got {}",
                self.master_gain
            )));
        }
        Ok(())
    }
}
