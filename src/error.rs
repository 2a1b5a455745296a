use thiserror::Error;

#[derive(Error, Debug)]
pub enum PianoError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("audio error: {0}")]
    Audio(String),
    #[error("MIDI error: {0}")]
    Midi(String),
}

pub type Result<T> = std::result::Result<T, PianoError>;
