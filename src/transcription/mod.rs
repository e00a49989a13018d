use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod aggregate;
pub mod command;
pub mod models;
pub mod openai;
#[cfg(feature = "whisper")]
pub mod whisper;

/// Assumed speaking rate behind [`estimate_duration`].
pub const WORDS_PER_MINUTE_ESTIMATE: f64 = 150.0;

/// Word-level timing returned by recognizers that support it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTimestamp {
    pub start: f64,
    pub end: f64,
    pub word: String,
}

/// A segment of transcribed text. Times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<WordTimestamp>>,
}

impl TranscriptSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            speaker: None,
            words: None,
        }
    }

    /// Move the segment (and its words) by `offset` seconds.
    pub fn shift(&mut self, offset: f64) {
        self.start += offset;
        self.end += offset;
        if let Some(words) = self.words.as_mut() {
            for word in words {
                word.start += offset;
                word.end += offset;
            }
        }
    }

    pub fn speaker(&self) -> Option<&str> {
        self.speaker.as_deref()
    }

    pub fn set_speaker(&mut self, speaker: impl Into<String>) {
        self.speaker = Some(speaker.into());
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// What a recognizer returns for one chunk; times are relative to the chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkTranscript {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,
}

impl ChunkTranscript {
    pub fn new(text: impl Into<String>, segments: Vec<TranscriptSegment>) -> Self {
        Self {
            text: text.into(),
            segments,
        }
    }
}

/// Final result handed back to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    pub text: String,
    pub segments: Option<Vec<TranscriptSegment>>,
    pub language: Option<String>,
    pub duration: Option<f64>,
    pub model: String,
}

/// Speech-to-text collaborator invoked once per chunk.
///
/// Implementations are driven from a single thread at a time; the
/// orchestrator owns the instance and never shares it between requests.
pub trait SpeechRecognizer: Send {
    fn transcribe(
        &mut self,
        chunk_path: &Path,
        language: Option<&str>,
        word_timestamps: bool,
    ) -> Result<ChunkTranscript>;
}

/// Rough duration from word count at a fixed speaking rate, in minutes.
///
/// This is not the measured audio length; responses report it for parity
/// with existing consumers.
pub fn estimate_duration(segments: &[TranscriptSegment]) -> f64 {
    if segments.is_empty() {
        return 0.0;
    }
    let words: usize = segments.iter().map(TranscriptSegment::word_count).sum();
    words as f64 / WORDS_PER_MINUTE_ESTIMATE
}

/// Space-join segment texts, as used once speaker prefixes are embedded.
pub fn join_segment_text(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
