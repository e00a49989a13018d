use crate::error::{Result, ScrivenerError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Engines the default model loader knows how to build.
pub const TRANSCRIPTION_ENGINES: &[&str] = &["whisper", "openai", "command"];

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrivenerConfig {
    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub transcription: TranscriptionConfig,

    #[serde(default)]
    pub diarization: DiarizationConfig,
}

impl ScrivenerConfig {
    pub fn validate(&self) -> Result<()> {
        let chunk = self.audio.chunk_duration;
        if !chunk.is_finite() || chunk <= 0.0 {
            return Err(ScrivenerError::InvalidConfig(format!(
                "chunk_duration must be a positive number of seconds, got {}",
                chunk
            )));
        }

        if self.audio.sample_rate == 0 {
            return Err(ScrivenerError::InvalidConfig(
                "sample_rate must be non-zero".to_string(),
            ));
        }

        if !TRANSCRIPTION_ENGINES.contains(&self.transcription.engine.as_str()) {
            return Err(ScrivenerError::InvalidConfig(format!(
                "Unknown transcription engine: {}. Use: {}",
                self.transcription.engine,
                TRANSCRIPTION_ENGINES.join(", ")
            )));
        }

        Ok(())
    }

    /// Directory that holds intermediate audio for in-flight requests.
    pub fn temp_dir(&self) -> PathBuf {
        self.audio
            .temp_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("scrivener"))
    }

    /// Token used to gate diarization; blank tokens count as absent.
    pub fn hf_token(&self) -> Option<&str> {
        self.diarization
            .hf_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn update_hf_token(&mut self, token: impl Into<String>) {
        self.diarization.hf_token = Some(token.into());
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Length of each transcription chunk in seconds
    #[serde(default = "default_chunk_duration")]
    pub chunk_duration: f64,
    /// Sample rate audio is normalized to before chunking
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Working directory for normalized audio and chunk files
    pub temp_dir: Option<PathBuf>,
    /// ffmpeg binary used for non-WAV inputs
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg_path: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            chunk_duration: 300.0,
            sample_rate: 16000,
            temp_dir: None,
            ffmpeg_path: "ffmpeg".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Transcription engine: "whisper", "openai", "command"
    #[serde(default = "default_engine")]
    pub engine: String,
    /// Model identifier passed to the engine and reported in responses
    #[serde(default = "default_model_id")]
    pub model_id: String,
    pub whisper_model_path: Option<PathBuf>,
    #[serde(default)]
    pub use_gpu: bool,
    pub openai_api_key: Option<String>,
    /// External ASR program for the "command" engine
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            engine: "whisper".to_string(),
            model_id: "base".to_string(),
            whisper_model_path: None,
            use_gpu: false,
            openai_api_key: None,
            command: None,
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiarizationConfig {
    /// Run diarization unless a request says otherwise
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Prefix segment text with speaker labels
    #[serde(default = "default_true")]
    pub include_in_text: bool,
    pub hf_token: Option<String>,
    pub num_speakers: Option<usize>,
    /// External diarization program (e.g. a pyannote wrapper script)
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for DiarizationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            include_in_text: true,
            hf_token: None,
            num_speakers: None,
            command: None,
            args: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_chunk_duration() -> f64 {
    300.0
}

fn default_sample_rate() -> u32 {
    16000
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_engine() -> String {
    "whisper".to_string()
}

fn default_model_id() -> String {
    "base".to_string()
}
