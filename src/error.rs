use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrivenerError {
    #[error("Invalid audio: {0}")]
    InvalidAudio(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[cfg(feature = "whisper")]
    #[error("Whisper model not found: {0}")]
    WhisperModelNotFound(std::path::PathBuf),

    #[error("Diarization error: {0}")]
    Diarization(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScrivenerError>;
