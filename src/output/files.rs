use crate::diarization::{apply_speaker_labels, merge_speakers, DiarizationResult, SpeakerSegment};
use crate::error::Result;
use crate::transcription::{join_segment_text, TranscriptSegment, TranscriptionResponse};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Segment files are either a bare array or wrapped in `{"segments": [...]}`
#[derive(Deserialize)]
#[serde(untagged)]
enum SegmentsFile {
    Bare(Vec<TranscriptSegment>),
    Wrapped { segments: Vec<TranscriptSegment> },
}

#[derive(Deserialize)]
struct DiarizationFile {
    #[serde(default)]
    segments: Vec<SpeakerSegment>,
    #[serde(default)]
    num_speakers: usize,
}

#[derive(Serialize)]
struct DiarizationOutput<'a> {
    audio_file: String,
    num_speakers: usize,
    segments: &'a [SpeakerSegment],
}

pub fn parse_transcript_segments(content: &str) -> Result<Vec<TranscriptSegment>> {
    let segments = match serde_json::from_str::<SegmentsFile>(content)? {
        SegmentsFile::Bare(segments) => segments,
        SegmentsFile::Wrapped { segments } => segments,
    };
    Ok(segments)
}

pub fn load_transcript_segments<P: AsRef<Path>>(path: P) -> Result<Vec<TranscriptSegment>> {
    parse_transcript_segments(&fs::read_to_string(path.as_ref())?)
}

/// Parse a diarization file. Turns are re-sorted and the speaker count is
/// recomputed from the labels.
pub fn parse_diarization(content: &str) -> Result<DiarizationResult> {
    let file: DiarizationFile = serde_json::from_str(content)?;
    let result = DiarizationResult::new(file.segments);
    if file.num_speakers != 0 && file.num_speakers != result.num_speakers {
        tracing::debug!(
            "Diarization file reports {} speakers, labels show {}",
            file.num_speakers,
            result.num_speakers
        );
    }
    Ok(result)
}

pub fn load_diarization<P: AsRef<Path>>(path: P) -> Result<DiarizationResult> {
    parse_diarization(&fs::read_to_string(path.as_ref())?)
}

pub fn write_diarization<P: AsRef<Path>>(
    path: P,
    audio_file: &Path,
    result: &DiarizationResult,
) -> Result<()> {
    let output = DiarizationOutput {
        audio_file: audio_file.display().to_string(),
        num_speakers: result.num_speakers,
        segments: &result.segments,
    };
    write_json(path, &output)
}

pub fn write_segments<P: AsRef<Path>>(path: P, segments: &[TranscriptSegment]) -> Result<()> {
    write_json(path, &segments)
}

pub fn write_response<P: AsRef<Path>>(path: P, response: &TranscriptionResponse) -> Result<()> {
    write_json(path, response)
}

/// Offline merge of a segments file with a diarization file.
///
/// `text` is only filled in when speaker labels are embedded; `language` and
/// `duration` are left unset.
pub fn merge_files(
    segments_path: &Path,
    speakers_path: &Path,
    include_labels: bool,
    model: &str,
) -> Result<TranscriptionResponse> {
    let segments = load_transcript_segments(segments_path)?;
    let diarization = load_diarization(speakers_path)?;
    tracing::info!(
        "Merging {} segments with {} speaker turns",
        segments.len(),
        diarization.segments.len()
    );

    let mut merged = merge_speakers(&diarization, segments);
    let text = if include_labels {
        apply_speaker_labels(&mut merged);
        join_segment_text(&merged)
    } else {
        String::new()
    };

    Ok(TranscriptionResponse {
        text,
        segments: Some(merged),
        language: None,
        duration: None,
        model: model.to_string(),
    })
}

fn write_json<P: AsRef<Path>, T: Serialize + ?Sized>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}
