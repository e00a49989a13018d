use crate::audio::convert::resample;
use crate::audio::read_wav_mono;
use crate::error::{Result, ScrivenerError};
use crate::transcription::{ChunkTranscript, SpeechRecognizer, TranscriptSegment};
use std::path::Path;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// whisper.cpp only accepts 16kHz mono input
const WHISPER_SAMPLE_RATE: u32 = 16000;

/// Local whisper.cpp recognizer
pub struct WhisperRecognizer {
    ctx: WhisperContext,
}

impl WhisperRecognizer {
    pub fn new<P: AsRef<Path>>(model_path: P, use_gpu: bool) -> Result<Self> {
        let model_path = model_path.as_ref();
        if !model_path.exists() {
            return Err(ScrivenerError::WhisperModelNotFound(model_path.to_path_buf()));
        }

        let mut params = WhisperContextParameters::default();
        params.use_gpu = use_gpu;

        let ctx = WhisperContext::new_with_params(&model_path.to_string_lossy(), params)
            .map_err(|e| ScrivenerError::Transcription(format!("Failed to load model: {}", e)))?;

        tracing::info!("Loaded whisper model {}", model_path.display());
        Ok(Self { ctx })
    }

    /// Transcribe 16kHz mono samples
    fn transcribe_samples(&self, samples: &[f32], language: Option<&str>) -> Result<ChunkTranscript> {
        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| ScrivenerError::Transcription(format!("Failed to create state: {}", e)))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(language);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        state
            .full(params, samples)
            .map_err(|e| ScrivenerError::Transcription(format!("Transcription failed: {}", e)))?;

        let mut segments = Vec::new();
        for i in 0..state.full_n_segments() {
            if let Some(segment) = state.get_segment(i) {
                let text = segment.to_str_lossy().map_err(|e| {
                    ScrivenerError::Transcription(format!("Failed to get text: {}", e))
                })?;
                // Timestamps are centiseconds
                segments.push(TranscriptSegment::new(
                    segment.start_timestamp() as f64 / 100.0,
                    segment.end_timestamp() as f64 / 100.0,
                    text.trim(),
                ));
            }
        }

        let text = segments
            .iter()
            .map(|s| s.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Ok(ChunkTranscript::new(text, segments))
    }
}

impl SpeechRecognizer for WhisperRecognizer {
    fn transcribe(
        &mut self,
        chunk_path: &Path,
        language: Option<&str>,
        word_timestamps: bool,
    ) -> Result<ChunkTranscript> {
        if word_timestamps {
            tracing::debug!("Word timestamps are not produced by the whisper engine");
        }

        let audio = read_wav_mono(chunk_path)?;
        let samples = resample(&audio.samples, audio.sample_rate, WHISPER_SAMPLE_RATE)?;
        self.transcribe_samples(&samples, language)
    }
}
