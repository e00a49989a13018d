use crate::audio::artifacts::ArtifactScope;
use crate::diarization::{normalize_label, DiarizationResult, SpeakerDiarizer, SpeakerSegment};
use crate::error::{Result, ScrivenerError};
use crate::external::ExternalCommand;
use crate::output::files::parse_diarization;
use std::path::{Path, PathBuf};

/// Diarizer backed by an external pipeline (pyannote or similar) that writes
/// `{"segments": [{"speaker", "start", "end"}, ...]}` to its output path.
///
/// The access token is handed over as `HUGGINGFACE_ACCESS_TOKEN` and the
/// optional speaker hint as `SCRIVENER_NUM_SPEAKERS`.
pub struct CommandDiarizer {
    command: ExternalCommand,
    token: String,
    work_dir: PathBuf,
}

impl CommandDiarizer {
    pub fn new(command: ExternalCommand, token: impl Into<String>, work_dir: PathBuf) -> Self {
        Self {
            command,
            token: token.into(),
            work_dir,
        }
    }

    fn envs(&self, num_speakers: Option<usize>) -> Vec<(&'static str, String)> {
        let mut envs = vec![("HUGGINGFACE_ACCESS_TOKEN", self.token.clone())];
        if let Some(n) = num_speakers {
            envs.push(("SCRIVENER_NUM_SPEAKERS", n.to_string()));
        }
        envs
    }
}

impl SpeakerDiarizer for CommandDiarizer {
    fn diarize(
        &mut self,
        audio_path: &Path,
        num_speakers: Option<usize>,
    ) -> Result<DiarizationResult> {
        std::fs::create_dir_all(&self.work_dir)?;
        let mut scope = ArtifactScope::default();
        let output = self
            .work_dir
            .join(format!("{}_speakers.json", uuid::Uuid::new_v4()));
        scope.register(&output);

        tracing::info!("Diarizing {} with {}", audio_path.display(), self.command.program());
        let body = self
            .command
            .run(audio_path, &output, &self.envs(num_speakers))
            .map_err(|e| ScrivenerError::Diarization(format!("{:#}", e)))?;

        let raw = parse_diarization(&body)
            .map_err(|e| ScrivenerError::Diarization(format!("Unreadable diarizer output: {}", e)))?;

        let segments: Vec<SpeakerSegment> = raw
            .segments
            .into_iter()
            .map(|s| SpeakerSegment::new(s.start, s.end, normalize_label(&s.speaker)))
            .collect();
        let result = DiarizationResult::new(segments);
        tracing::info!(
            "Diarization found {} speakers in {} turns",
            result.num_speakers,
            result.segments.len()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_envs_include_token_and_hint() {
        let diarizer = CommandDiarizer::new(
            ExternalCommand::new("diarize", Vec::new()),
            "hf_abc",
            PathBuf::from("/tmp"),
        );
        let envs = diarizer.envs(Some(3));
        assert_eq!(envs[0], ("HUGGINGFACE_ACCESS_TOKEN", "hf_abc".to_string()));
        assert_eq!(envs[1], ("SCRIVENER_NUM_SPEAKERS", "3".to_string()));
        assert_eq!(diarizer.envs(None).len(), 1);
    }

    #[test]
    fn test_spawn_failure_is_diarization_error() {
        let dir = tempdir().unwrap();
        let mut diarizer = CommandDiarizer::new(
            ExternalCommand::new("scrivener-test-no-such-diarizer", Vec::new()),
            "hf_abc",
            dir.path().to_path_buf(),
        );
        let err = diarizer.diarize(Path::new("in.wav"), None).unwrap_err();
        assert!(matches!(err, ScrivenerError::Diarization(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_labels_are_normalized_and_output_removed() {
        let dir = tempdir().unwrap();
        let script = r#"printf '{"segments":[{"speaker":"SPEAKER_01","start":3.0,"end":5.0},{"speaker":"SPEAKER_00","start":0.0,"end":3.0}],"num_speakers":2}' > "$1""#;
        let mut diarizer = CommandDiarizer::new(
            ExternalCommand::new(
                "sh",
                vec![
                    "-c".to_string(),
                    script.to_string(),
                    "sh".to_string(),
                    "{output}".to_string(),
                ],
            ),
            "hf_abc",
            dir.path().to_path_buf(),
        );

        let result = diarizer.diarize(Path::new("in.wav"), Some(2)).unwrap();
        assert_eq!(result.num_speakers, 2);
        assert_eq!(result.segments[0].speaker, "speaker_SPEAKER_00");
        assert_eq!(result.segments[1].speaker, "speaker_SPEAKER_01");

        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_garbage_output_is_diarization_error() {
        let dir = tempdir().unwrap();
        let mut diarizer = CommandDiarizer::new(
            ExternalCommand::new(
                "sh",
                vec![
                    "-c".to_string(),
                    "echo nope > \"$1\"".to_string(),
                    "sh".to_string(),
                    "{output}".to_string(),
                ],
            ),
            "hf_abc",
            dir.path().to_path_buf(),
        );
        let err = diarizer.diarize(Path::new("in.wav"), None).unwrap_err();
        assert!(matches!(err, ScrivenerError::Diarization(_)));
    }
}
