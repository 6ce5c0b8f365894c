pub mod chat;
pub mod config;
pub mod dsp;
pub mod error;
pub mod preset;
pub mod toot;

use crate::chat::Chat;
use crate::config::BotConfig;
use crate::toot::TootParams;
use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the fartbot-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{e}"))
}

/// JS hands us `Date.now()` / `performance.now()` as a double.
fn millis(now_ms: f64) -> u64 {
    if now_ms.is_finite() && now_ms > 0.0 {
        now_ms as u64
    } else {
        0
    }
}

/// WASM-exposed chat. Audio is pulled by an AudioWorklet through `render`.
#[wasm_bindgen(js_name = FartBot)]
pub struct WasmFartBot {
    chat: Chat,
}

#[wasm_bindgen(js_class = FartBot)]
impl WasmFartBot {
    /// Default configuration at the worklet's sample rate.
    #[wasm_bindgen(constructor)]
    pub fn new(sample_rate: u32, now_ms: f64) -> Result<WasmFartBot, JsValue> {
        let config = BotConfig {
            sample_rate,
            ..BotConfig::default()
        };
        config.validate().map_err(js_err)?;
        Ok(WasmFartBot {
            chat: Chat::offline(config, millis(now_ms)),
        })
    }

    /// Build from a JSON `BotConfig`; missing fields take defaults.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config_json: &str, now_ms: f64) -> Result<WasmFartBot, JsValue> {
        let config = BotConfig::from_json(config_json).map_err(js_err)?;
        Ok(WasmFartBot {
            chat: Chat::offline(config, millis(now_ms)),
        })
    }

    pub fn submit(&mut self, text: &str, now_ms: f64) {
        self.chat.submit(text, millis(now_ms));
    }

    #[wasm_bindgen(js_name = pressPreset)]
    pub fn press_preset(&mut self, label: &str, now_ms: f64) -> Result<(), JsValue> {
        self.chat.press_preset(label, millis(now_ms)).map_err(js_err)
    }

    pub fn clear(&mut self, now_ms: f64) {
        self.chat.clear(millis(now_ms));
    }

    /// Deliver due replies; returns how many were appended.
    pub fn tick(&mut self, now_ms: f64) -> u32 {
        self.chat.poll(millis(now_ms)) as u32
    }

    /// When the next reply is due, for arming a `setTimeout`.
    #[wasm_bindgen(js_name = nextDueMs)]
    pub fn next_due_ms(&self) -> Option<f64> {
        self.chat.next_due_ms().map(|ms| ms as f64)
    }

    #[wasm_bindgen(js_name = setSoundEnabled)]
    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.chat.set_sound_enabled(enabled);
    }

    #[wasm_bindgen(js_name = soundEnabled)]
    pub fn sound_enabled(&self) -> bool {
        self.chat.sound_enabled()
    }

    /// The message list as `[{sender, text, timestamp}]`.
    pub fn messages(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.chat.messages()).map_err(js_err)
    }

    /// The preset list as `[{label, params}]`.
    pub fn presets(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.chat.presets()).map_err(js_err)
    }

    /// Next `frames` mono samples of the shared audio context.
    pub fn render(&self, frames: usize) -> Vec<f32> {
        self.chat.render(frames)
    }
}

/// WASM-exposed: render one toot (JSON `TootParams`) to a WAV byte array.
#[wasm_bindgen]
pub fn render_toot_wav(params_json: &str, sample_rate: u32, seed: u32) -> Result<Vec<u8>, JsValue> {
    let params: TootParams = serde_json::from_str(params_json).map_err(js_err)?;
    dsp::renderer::render_toot_wav(&params, sample_rate, seed as u64).map_err(js_err)
}
