//! Toot presets — named, fixed parameter sets offered as one-tap shortcuts.

use serde::{Deserialize, Serialize};

use crate::toot::TootParams;

/// A named toot. Pressing it skips text-based parameter derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TootPreset {
    /// Button label; also used as the "input text" for the bot's reply.
    pub label: String,
    /// Parameters passed straight to the engine.
    pub params: TootParams,
}

impl TootPreset {
    pub fn new(label: impl Into<String>, params: TootParams) -> Self {
        TootPreset {
            label: label.into(),
            params,
        }
    }
}

/// The stock toot keys.
pub fn builtin_presets() -> Vec<TootPreset> {
    let preset = |label: &str, wet: f64, pitch: f64, duration: f64| {
        TootPreset::new(
            label,
            TootParams::new().with_wet(wet).with_pitch(pitch).with_duration(duration),
        )
    };
    vec![
        preset("Puff", 0.1, 90.0, 0.5),
        preset("SBD", 0.2, 60.0, 1.2),
        preset("Rocket", 0.3, 110.0, 0.8),
        preset("Thunder", 0.6, 45.0, 1.6),
    ]
}

/// Look a preset up by label, ignoring case.
pub fn find_preset<'a>(presets: &'a [TootPreset], label: &str) -> Option<&'a TootPreset> {
    let label = label.trim();
    presets.iter().find(|p| p.label.eq_ignore_ascii_case(label))
}
