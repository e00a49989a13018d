use crate::audio::AudioChunk;
use crate::error::{Result, ScrivenerError};
use crate::transcription::{SpeechRecognizer, TranscriptSegment};

/// Transcript for the whole file, in file-relative time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateTranscript {
    pub text: String,
    pub segments: Vec<TranscriptSegment>,
}

/// Per-chunk options forwarded to the recognizer
#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkOptions<'a> {
    pub language: Option<&'a str>,
    pub word_timestamps: bool,
}

/// Transcribe `chunks` strictly in index order and stitch the results.
///
/// Segments of chunk `i` are shifted by the chunk's start offset, so the
/// output stays ordered by start time. Any recognizer failure aborts the
/// whole file.
pub fn transcribe_chunks<F>(
    recognizer: &mut dyn SpeechRecognizer,
    chunks: &[AudioChunk],
    options: ChunkOptions<'_>,
    mut on_chunk: F,
) -> Result<AggregateTranscript>
where
    F: FnMut(usize, usize),
{
    let total = chunks.len();
    let mut texts: Vec<String> = Vec::with_capacity(total);
    let mut segments = Vec::new();

    for chunk in chunks {
        tracing::info!("Processing chunk {}/{}", chunk.index + 1, total);
        on_chunk(chunk.index, total);

        let result = recognizer
            .transcribe(&chunk.path, options.language, options.word_timestamps)
            .map_err(|e| {
                ScrivenerError::Transcription(format!(
                    "chunk {}/{} ({}) failed: {}",
                    chunk.index + 1,
                    total,
                    chunk.path.display(),
                    e
                ))
            })?;

        let mut chunk_segments = result.segments;
        if chunk.index > 0 {
            for segment in &mut chunk_segments {
                segment.shift(chunk.start_offset);
            }
        }

        if !result.text.is_empty() {
            texts.push(result.text);
        }
        segments.extend(chunk_segments);
    }

    Ok(AggregateTranscript {
        text: texts.join(" "),
        segments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::ChunkTranscript;
    use std::collections::VecDeque;
    use std::path::{Path, PathBuf};

    struct ScriptedRecognizer {
        replies: VecDeque<Result<ChunkTranscript>>,
        seen: Vec<PathBuf>,
    }

    impl ScriptedRecognizer {
        fn new(replies: Vec<Result<ChunkTranscript>>) -> Self {
            Self {
                replies: replies.into(),
                seen: Vec::new(),
            }
        }
    }

    impl SpeechRecognizer for ScriptedRecognizer {
        fn transcribe(
            &mut self,
            chunk_path: &Path,
            _language: Option<&str>,
            _word_timestamps: bool,
        ) -> Result<ChunkTranscript> {
            self.seen.push(chunk_path.to_path_buf());
            self.replies
                .pop_front()
                .unwrap_or_else(|| Ok(ChunkTranscript::default()))
        }
    }

    fn chunks(count: usize, duration: f64) -> Vec<AudioChunk> {
        (0..count)
            .map(|index| AudioChunk {
                index,
                path: PathBuf::from(format!("chunk_{}.wav", index)),
                start_offset: index as f64 * duration,
                duration,
            })
            .collect()
    }

    fn reply(text: &str, spans: &[(f64, f64)]) -> Result<ChunkTranscript> {
        Ok(ChunkTranscript::new(
            text,
            spans
                .iter()
                .map(|&(s, e)| TranscriptSegment::new(s, e, text))
                .collect(),
        ))
    }

    #[test]
    fn test_offsets_applied_per_chunk() {
        let mut recognizer = ScriptedRecognizer::new(vec![
            reply("first", &[(0.5, 3.0), (4.0, 9.5)]),
            reply("second", &[(0.0, 2.0)]),
            reply("third", &[(1.0, 4.0)]),
        ]);

        let result = transcribe_chunks(
            &mut recognizer,
            &chunks(3, 10.0),
            ChunkOptions::default(),
            |_, _| {},
        )
        .unwrap();

        let starts: Vec<f64> = result.segments.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![0.5, 4.0, 10.0, 21.0]);
        assert_eq!(result.segments[3].end, 24.0);

        for pair in result.segments.windows(2) {
            assert!(pair[0].start <= pair[1].start);
        }
    }

    #[test]
    fn test_every_segment_starts_after_its_chunk() {
        let d = 30.0;
        let mut recognizer = ScriptedRecognizer::new(vec![
            reply("a", &[(0.0, 5.0)]),
            reply("b", &[(0.0, 1.0), (29.0, 30.0)]),
            reply("c", &[(0.2, 0.4)]),
            reply("d", &[(0.0, 12.0)]),
        ]);
        let result = transcribe_chunks(
            &mut recognizer,
            &chunks(4, d),
            ChunkOptions::default(),
            |_, _| {},
        )
        .unwrap();

        let owners = [0usize, 1, 1, 2, 3];
        for (segment, chunk) in result.segments.iter().zip(owners) {
            assert!(segment.start >= chunk as f64 * d);
        }
    }

    #[test]
    fn test_text_skips_empty_chunks() {
        let mut recognizer = ScriptedRecognizer::new(vec![
            reply("hello", &[]),
            reply("", &[]),
            reply("world", &[]),
        ]);
        let result = transcribe_chunks(
            &mut recognizer,
            &chunks(3, 5.0),
            ChunkOptions::default(),
            |_, _| {},
        )
        .unwrap();
        assert_eq!(result.text, "hello world");
    }

    #[test]
    fn test_chunks_visited_in_order() {
        let mut recognizer = ScriptedRecognizer::new(vec![]);
        let mut progress = Vec::new();
        transcribe_chunks(
            &mut recognizer,
            &chunks(3, 5.0),
            ChunkOptions::default(),
            |i, n| progress.push((i, n)),
        )
        .unwrap();

        assert_eq!(progress, vec![(0, 3), (1, 3), (2, 3)]);
        assert_eq!(
            recognizer.seen,
            vec![
                PathBuf::from("chunk_0.wav"),
                PathBuf::from("chunk_1.wav"),
                PathBuf::from("chunk_2.wav"),
            ]
        );
    }

    #[test]
    fn test_failure_aborts_remaining_chunks() {
        let mut recognizer = ScriptedRecognizer::new(vec![
            reply("ok", &[(0.0, 1.0)]),
            Err(ScrivenerError::Api("model crashed".to_string())),
            reply("never", &[(0.0, 1.0)]),
        ]);
        let result = transcribe_chunks(
            &mut recognizer,
            &chunks(3, 5.0),
            ChunkOptions::default(),
            |_, _| {},
        );

        match result {
            Err(ScrivenerError::Transcription(msg)) => {
                assert!(msg.contains("chunk 2/3"));
                assert!(msg.contains("model crashed"));
            }
            other => panic!("expected transcription error, got {:?}", other),
        }
        assert_eq!(recognizer.seen.len(), 2);
    }
}
