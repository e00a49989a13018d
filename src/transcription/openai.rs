use crate::error::{Result, ScrivenerError};
use crate::transcription::{ChunkTranscript, SpeechRecognizer, TranscriptSegment, WordTimestamp};
use reqwest::blocking::{multipart, Client};
use serde::Deserialize;
use std::path::Path;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/audio/transcriptions";

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    text: String,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    segments: Option<Vec<OpenAISegment>>,
    #[serde(default)]
    words: Option<Vec<WordTimestamp>>,
}

#[derive(Debug, Deserialize)]
struct OpenAISegment {
    start: f64,
    end: f64,
    text: String,
}

/// Chunk recognizer backed by the OpenAI transcription endpoint
pub struct OpenAIRecognizer {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenAIRecognizer {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

impl SpeechRecognizer for OpenAIRecognizer {
    fn transcribe(
        &mut self,
        chunk_path: &Path,
        language: Option<&str>,
        word_timestamps: bool,
    ) -> Result<ChunkTranscript> {
        let audio_data = std::fs::read(chunk_path)?;
        let filename = chunk_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        let file_part = multipart::Part::bytes(audio_data)
            .file_name(filename)
            .mime_str("audio/wav")
            .map_err(|e| ScrivenerError::Api(format!("Failed to create multipart: {}", e)))?;

        let mut form = multipart::Form::new()
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "segment");
        if word_timestamps {
            form = form.text("timestamp_granularities[]", "word");
        }
        if let Some(lang) = language {
            form = form.text("language", lang.to_string());
        }
        let form = form.part("file", file_part);

        let response = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .map_err(|e| ScrivenerError::Api(format!("OpenAI request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(ScrivenerError::Api(format!("OpenAI error {}: {}", status, body)));
        }

        let result: OpenAIResponse = response
            .json()
            .map_err(|e| ScrivenerError::Api(format!("Failed to parse OpenAI response: {}", e)))?;

        Ok(into_chunk_transcript(result))
    }
}

fn into_chunk_transcript(result: OpenAIResponse) -> ChunkTranscript {
    let mut segments: Vec<TranscriptSegment> = match result.segments {
        Some(api_segments) => api_segments
            .into_iter()
            .map(|s| TranscriptSegment::new(s.start, s.end, s.text.trim()))
            .collect(),
        // Fallback: single segment with full text
        None => vec![TranscriptSegment::new(
            0.0,
            result.duration.unwrap_or(0.0),
            result.text.trim(),
        )],
    };

    // Word timings come back as one flat list; hand each word to the
    // segment it starts in.
    if let Some(words) = result.words {
        for word in words {
            let owner = segments
                .iter_mut()
                .find(|s| word.start >= s.start && word.start < s.end);
            if let Some(segment) = owner {
                segment.words.get_or_insert_with(Vec::new).push(word);
            }
        }
    }

    ChunkTranscript::new(result.text.trim(), segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_url() {
        assert!(OPENAI_API_URL.starts_with("https://"));
    }

    #[test]
    fn test_verbose_json_segments() {
        let result: OpenAIResponse = serde_json::from_str(
            r#"{"text": " hello there friend ", "duration": 3.0,
                "segments": [{"id": 0, "start": 0.0, "end": 1.5, "text": " hello there"},
                             {"id": 1, "start": 1.5, "end": 3.0, "text": " friend"}]}"#,
        )
        .unwrap();
        let transcript = into_chunk_transcript(result);

        assert_eq!(transcript.text, "hello there friend");
        assert_eq!(transcript.segments.len(), 2);
        assert_eq!(transcript.segments[0].text, "hello there");
        assert!(transcript.segments[0].words.is_none());
    }

    #[test]
    fn test_words_are_attached_to_segments() {
        let result: OpenAIResponse = serde_json::from_str(
            r#"{"text": "a b", "segments": [{"start": 0.0, "end": 1.0, "text": "a"},
                                             {"start": 1.0, "end": 2.0, "text": "b"}],
                "words": [{"word": "a", "start": 0.1, "end": 0.4},
                          {"word": "b", "start": 1.2, "end": 1.6}]}"#,
        )
        .unwrap();
        let transcript = into_chunk_transcript(result);

        let first = transcript.segments[0].words.as_ref().unwrap();
        let second = transcript.segments[1].words.as_ref().unwrap();
        assert_eq!(first[0].word, "a");
        assert_eq!(second[0].word, "b");
    }

    #[test]
    fn test_missing_segments_fall_back_to_whole_text() {
        let result: OpenAIResponse =
            serde_json::from_str(r#"{"text": "just text", "duration": 4.5}"#).unwrap();
        let transcript = into_chunk_transcript(result);
        assert_eq!(transcript.segments.len(), 1);
        assert_eq!(transcript.segments[0].end, 4.5);
        assert_eq!(transcript.segments[0].text, "just text");
    }
}
