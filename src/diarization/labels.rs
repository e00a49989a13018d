use crate::transcription::TranscriptSegment;
use std::collections::HashSet;

const LABEL_PREFIX: &str = "speaker_";
const GENERIC_LABEL: &str = "Speaker";

/// 1-based display number from a `speaker_..._N` label.
pub fn speaker_number(label: &str) -> Option<u32> {
    label
        .rsplit('_')
        .next()
        .and_then(|n| n.parse::<u32>().ok())
        .and_then(|n| n.checked_add(1))
}

/// Prefix segment text with speaker tags for readability.
///
/// The first time a speaker talks the tag is spelled out (`Speaker 2: `);
/// when a known speaker comes back after someone else the short form
/// (`2: `) is used; consecutive segments from one speaker get no tag.
/// `speaker_` labels without a numeric suffix fall back to a bare
/// `Speaker: ` tag, which is not repeated while that fallback is current.
/// Labels outside the `speaker_` scheme (such as `unknown`) are left alone.
pub fn apply_speaker_labels(segments: &mut [TranscriptSegment]) {
    let mut previous: Option<String> = None;
    let mut seen: HashSet<String> = HashSet::new();

    for segment in segments.iter_mut() {
        let label = match segment.speaker.as_deref() {
            Some(label) if label.starts_with(LABEL_PREFIX) => label.to_string(),
            _ => continue,
        };

        match speaker_number(&label) {
            Some(number) => {
                if previous.as_deref() != Some(label.as_str()) {
                    let prefix = if seen.insert(label.clone()) {
                        format!("Speaker {}: ", number)
                    } else {
                        format!("{}: ", number)
                    };
                    segment.text.insert_str(0, &prefix);
                }
                previous = Some(label);
            }
            None => {
                if previous.as_deref() != Some(GENERIC_LABEL) {
                    segment.text.insert_str(0, &format!("{}: ", GENERIC_LABEL));
                    previous = Some(GENERIC_LABEL.to_string());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labelled(speakers: &[Option<&str>]) -> Vec<TranscriptSegment> {
        speakers
            .iter()
            .enumerate()
            .map(|(i, who)| {
                let mut segment = TranscriptSegment::new(i as f64, i as f64 + 1.0, "text");
                if let Some(who) = who {
                    segment.set_speaker(*who);
                }
                segment
            })
            .collect()
    }

    fn texts(segments: &[TranscriptSegment]) -> Vec<&str> {
        segments.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_speaker_number() {
        assert_eq!(speaker_number("speaker_SPEAKER_00"), Some(1));
        assert_eq!(speaker_number("speaker_SPEAKER_11"), Some(12));
        assert_eq!(speaker_number("speaker_3"), Some(4));
        assert_eq!(speaker_number("speaker_SPEAKER_ab"), None);
    }

    #[test]
    fn test_continuity_prefixes() {
        let x = "speaker_SPEAKER_00";
        let y = "speaker_SPEAKER_01";
        let mut segments = labelled(&[Some(x), Some(x), Some(y), Some(x)]);
        apply_speaker_labels(&mut segments);

        assert_eq!(
            texts(&segments),
            vec!["Speaker 1: text", "text", "Speaker 2: text", "1: text"]
        );
    }

    #[test]
    fn test_unlabelled_segments_are_skipped() {
        let x = "speaker_SPEAKER_00";
        let mut segments = labelled(&[Some(x), None, Some(x)]);
        apply_speaker_labels(&mut segments);
        assert_eq!(texts(&segments), vec!["Speaker 1: text", "text", "text"]);
    }

    #[test]
    fn test_unknown_sentinel_is_left_alone() {
        let x = "speaker_SPEAKER_00";
        let mut segments = labelled(&[Some(x), Some("unknown"), Some(x)]);
        apply_speaker_labels(&mut segments);
        assert_eq!(texts(&segments), vec!["Speaker 1: text", "text", "text"]);
    }

    #[test]
    fn test_unparseable_label_uses_generic_prefix_once() {
        let odd = "speaker_SPEAKER_alpha";
        let other = "speaker_SPEAKER_beta";
        let mut segments = labelled(&[Some(odd), Some(other), Some(odd)]);
        apply_speaker_labels(&mut segments);
        assert_eq!(texts(&segments), vec!["Speaker: text", "text", "text"]);
    }

    #[test]
    fn test_generic_prefix_returns_after_numbered_speaker() {
        let odd = "speaker_SPEAKER_alpha";
        let x = "speaker_SPEAKER_02";
        let mut segments = labelled(&[Some(odd), Some(x), Some(odd)]);
        apply_speaker_labels(&mut segments);
        assert_eq!(
            texts(&segments),
            vec!["Speaker: text", "Speaker 3: text", "Speaker: text"]
        );
    }

    #[test]
    fn test_three_speakers_rotation() {
        let a = "speaker_SPEAKER_00";
        let b = "speaker_SPEAKER_01";
        let c = "speaker_SPEAKER_02";
        let mut segments = labelled(&[Some(a), Some(b), Some(c), Some(b), Some(a)]);
        apply_speaker_labels(&mut segments);
        assert_eq!(
            texts(&segments),
            vec![
                "Speaker 1: text",
                "Speaker 2: text",
                "Speaker 3: text",
                "2: text",
                "1: text"
            ]
        );
    }
}
