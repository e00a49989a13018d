use crate::audio::artifacts::ArtifactScope;
use crate::error::{Result, ScrivenerError};
use crate::external::ExternalCommand;
use crate::transcription::{ChunkTranscript, SpeechRecognizer};
use std::path::{Path, PathBuf};

/// Recognizer that shells out once per chunk.
///
/// The program must write `{"text": ..., "segments": [{start, end, text}]}`
/// with chunk-relative times. Language and word timing requests are passed
/// as `SCRIVENER_LANGUAGE` and `SCRIVENER_WORD_TIMESTAMPS`.
pub struct CommandRecognizer {
    command: ExternalCommand,
    work_dir: PathBuf,
}

impl CommandRecognizer {
    pub fn new(command: ExternalCommand, work_dir: PathBuf) -> Self {
        Self { command, work_dir }
    }
}

fn recognizer_envs(language: Option<&str>, word_timestamps: bool) -> Vec<(&'static str, String)> {
    let mut envs = vec![("SCRIVENER_WORD_TIMESTAMPS", word_timestamps.to_string())];
    if let Some(lang) = language {
        envs.push(("SCRIVENER_LANGUAGE", lang.to_string()));
    }
    envs
}

impl SpeechRecognizer for CommandRecognizer {
    fn transcribe(
        &mut self,
        chunk_path: &Path,
        language: Option<&str>,
        word_timestamps: bool,
    ) -> Result<ChunkTranscript> {
        std::fs::create_dir_all(&self.work_dir)?;
        let mut scope = ArtifactScope::new();
        let output = self
            .work_dir
            .join(format!("{}_transcript.json", uuid::Uuid::new_v4()));
        scope.register(&output);

        let body = self
            .command
            .run(chunk_path, &output, &recognizer_envs(language, word_timestamps))
            .map_err(|e| ScrivenerError::Transcription(format!("{:#}", e)))?;

        let transcript: ChunkTranscript = serde_json::from_str(&body).map_err(|e| {
            ScrivenerError::Transcription(format!(
                "{} wrote unreadable output: {}",
                self.command.program(),
                e
            ))
        })?;
        Ok(transcript)
    }
}
