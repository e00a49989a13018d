use crate::diarization::{DiarizationResult, SpeakerSegment, UNKNOWN_SPEAKER};
use crate::transcription::TranscriptSegment;

/// Length of the intersection of two time spans, never negative.
pub fn overlap(segment: &TranscriptSegment, turn: &SpeakerSegment) -> f64 {
    (segment.end.min(turn.end) - segment.start.max(turn.start)).max(0.0)
}

/// Speaker of the turn with the largest positive overlap. On ties the turn
/// that comes first in `turns` wins. Turns without a label are skipped.
pub fn best_speaker<'a>(segment: &TranscriptSegment, turns: &'a [SpeakerSegment]) -> Option<&'a str> {
    let mut best: Option<(&SpeakerSegment, f64)> = None;
    for turn in turns.iter().filter(|t| !t.speaker.trim().is_empty()) {
        let amount = overlap(segment, turn);
        if amount <= 0.0 {
            continue;
        }
        match best {
            Some((_, current)) if amount <= current => {}
            _ => best = Some((turn, amount)),
        }
    }
    best.map(|(turn, _)| turn.speaker.as_str())
}

/// Attribute each transcript segment to the speaker it overlaps most.
///
/// Segments that overlap no turn get [`UNKNOWN_SPEAKER`]. When either input
/// is empty the segments come back untouched.
pub fn merge_speakers(
    diarization: &DiarizationResult,
    mut segments: Vec<TranscriptSegment>,
) -> Vec<TranscriptSegment> {
    if diarization.segments.is_empty() || segments.is_empty() {
        return segments;
    }

    for segment in &mut segments {
        let speaker = best_speaker(segment, &diarization.segments).unwrap_or(UNKNOWN_SPEAKER);
        segment.set_speaker(speaker.to_string());
    }

    segments
}
