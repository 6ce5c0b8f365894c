use std::fmt;

#[derive(Debug)]
pub enum FartBotError {
    Audio(AudioError),
    Config(String),
    UnknownPreset(String),
    Io(std::io::Error),
}

/// Failures opening or driving an audio output. These never reach chat
/// callers; the output handle logs them and falls silent.
#[derive(Debug)]
pub enum AudioError {
    NoOutputDevice,
    UnsupportedFormat(String),
    Stream(String),
}

impl fmt::Display for FartBotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FartBotError::Audio(e) => write!(f, "Audio error: {e}"),
            FartBotError::Config(msg) => write!(f, "Config error: {msg}"),
            FartBotError::UnknownPreset(label) => write!(f, "Unknown preset '{label}'"),
            FartBotError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for FartBotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FartBotError::Audio(e) => Some(e),
            FartBotError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::NoOutputDevice => write!(f, "No audio output device found"),
            AudioError::UnsupportedFormat(format) => write!(f, "Unsupported sample format {format}"),
            AudioError::Stream(msg) => write!(f, "Audio stream failed: {msg}"),
        }
    }
}

impl std::error::Error for AudioError {}

impl From<AudioError> for FartBotError {
    fn from(e: AudioError) -> Self {
        FartBotError::Audio(e)
    }
}

impl From<std::io::Error> for FartBotError {
    fn from(e: std::io::Error) -> Self {
        FartBotError::Io(e)
    }
}

impl From<serde_json::Error> for FartBotError {
    fn from(e: serde_json::Error) -> Self {
        FartBotError::Config(e.to_string())
    }
}
