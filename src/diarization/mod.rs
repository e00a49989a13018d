use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub mod command;
pub mod labels;
pub mod merge;

pub use labels::apply_speaker_labels;
pub use merge::merge_speakers;

/// Label given to transcript segments that no diarization turn overlaps.
pub const UNKNOWN_SPEAKER: &str = "unknown";

/// A speaker turn in file-relative seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerSegment {
    pub start: f64,
    pub end: f64,
    pub speaker: String,
}

impl SpeakerSegment {
    pub fn new(start: f64, end: f64, speaker: impl Into<String>) -> Self {
        Self {
            start,
            end,
            speaker: speaker.into(),
        }
    }
}

/// Speaker turns sorted by start time, plus the number of distinct speakers
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiarizationResult {
    pub segments: Vec<SpeakerSegment>,
    pub num_speakers: usize,
}

impl DiarizationResult {
    /// Sorts by start (stable, so equal starts keep their input order) and
    /// counts distinct speaker labels.
    pub fn new(mut segments: Vec<SpeakerSegment>) -> Self {
        segments.sort_by(|a, b| a.start.total_cmp(&b.start));
        let num_speakers = segments
            .iter()
            .map(|s| s.speaker.as_str())
            .collect::<HashSet<_>>()
            .len();
        Self {
            segments,
            num_speakers,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Speaker diarization collaborator; times are relative to the whole file.
pub trait SpeakerDiarizer: Send {
    fn diarize(&mut self, audio_path: &Path, num_speakers: Option<usize>)
        -> Result<DiarizationResult>;
}

/// Bring backend labels into the `speaker_SPEAKER_<id>` form the label
/// formatter understands.
pub fn normalize_label(raw: &str) -> String {
    if raw.starts_with("speaker_") {
        raw.to_string()
    } else if raw.starts_with("SPEAKER_") {
        format!("speaker_{}", raw)
    } else {
        format!("speaker_SPEAKER_{}", raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sorts_stably_and_counts_speakers() {
        let result = DiarizationResult::new(vec![
            SpeakerSegment::new(5.0, 6.0, "b"),
            SpeakerSegment::new(1.0, 2.0, "a"),
            SpeakerSegment::new(5.0, 7.0, "a"),
            SpeakerSegment::new(3.0, 4.0, "b"),
        ]);

        let order: Vec<(f64, &str)> = result
            .segments
            .iter()
            .map(|s| (s.start, s.speaker.as_str()))
            .collect();
        assert_eq!(order, vec![(1.0, "a"), (3.0, "b"), (5.0, "b"), (5.0, "a")]);
        assert_eq!(result.num_speakers, 2);
    }

    #[test]
    fn test_speaker_count_ignores_segment_count() {
        let result = DiarizationResult::new(vec![
            SpeakerSegment::new(0.0, 1.0, "x"),
            SpeakerSegment::new(1.0, 2.0, "x"),
            SpeakerSegment::new(2.0, 3.0, "x"),
        ]);
        assert_eq!(result.num_speakers, 1);
        assert!(DiarizationResult::default().is_empty());
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("SPEAKER_01"), "speaker_SPEAKER_01");
        assert_eq!(normalize_label("2"), "speaker_SPEAKER_2");
        assert_eq!(normalize_label("speaker_SPEAKER_00"), "speaker_SPEAKER_00");
    }
}
