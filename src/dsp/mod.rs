//! DSP Engine — Pure Rust toot synthesis.
//!
//! Every effect is rendered in Rust, sample by sample. The same code feeds
//! an AudioWorklet (via WASM), a native output device, and offline WAV export.

pub mod context;
#[cfg(feature = "playback")]
pub mod device;
pub mod engine;
pub mod envelope;
pub mod filter;
pub mod mixer;
pub mod noise;
pub mod oscillator;
pub mod output;
pub mod renderer;
pub mod voice;
