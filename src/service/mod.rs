use crate::audio::artifacts::ArtifactScope;
use crate::audio::chunker::split_into_chunks;
use crate::audio::convert::convert_to_wav;
use crate::config::ScrivenerConfig;
use crate::diarization::{
    apply_speaker_labels, merge_speakers, DiarizationResult, SpeakerDiarizer,
};
use crate::error::{Result, ScrivenerError};
use crate::transcription::aggregate::{transcribe_chunks, ChunkOptions};
use crate::transcription::models::{DefaultModelLoader, ModelLoader};
use crate::transcription::{
    estimate_duration, join_segment_text, SpeechRecognizer, TranscriptionResponse,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod observer;

pub use observer::{NoopObserver, PipelineObserver};

/// Where a request is in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    ModelReady,
    Chunked,
    Transcribed,
    DiarizationAttempted,
    Merged,
    Formatted,
    Done,
    Failed,
}

impl PipelineState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::ModelReady => "model_ready",
            Self::Chunked => "chunked",
            Self::Transcribed => "transcribed",
            Self::DiarizationAttempted => "diarization_attempted",
            Self::Merged => "merged",
            Self::Formatted => "formatted",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Per-request options. `None` toggles fall back to the config defaults.
#[derive(Debug, Clone, Default)]
pub struct TranscribeRequest {
    pub language: Option<String>,
    pub diarize: Option<bool>,
    pub include_speakers_in_text: Option<bool>,
    pub word_timestamps: bool,
    pub return_segments: bool,
    pub num_speakers: Option<usize>,
}

struct RunTracker {
    state: PipelineState,
    observer: Arc<dyn PipelineObserver>,
}

impl RunTracker {
    fn new(observer: Arc<dyn PipelineObserver>) -> Self {
        Self {
            state: PipelineState::Idle,
            observer,
        }
    }

    fn advance(&mut self, to: PipelineState) {
        tracing::debug!("Pipeline {} -> {}", self.state, to);
        self.observer.on_transition(self.state, to);
        self.state = to;
    }
}

/// Runs transcription requests one at a time.
///
/// The recognizer is loaded on first use and kept for the lifetime of the
/// service, as is the diarizer once it loads successfully. Neither is safe
/// to drive from two requests at once; callers that need concurrency should
/// run one service per worker or put it behind a mutex.
pub struct TranscriptionService {
    config: ScrivenerConfig,
    loader: Box<dyn ModelLoader>,
    recognizer: Option<Box<dyn SpeechRecognizer>>,
    diarizer: Option<Box<dyn SpeakerDiarizer>>,
    observer: Arc<dyn PipelineObserver>,
}

impl TranscriptionService {
    pub fn new(config: ScrivenerConfig, loader: Box<dyn ModelLoader>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            loader,
            recognizer: None,
            diarizer: None,
            observer: Arc::new(NoopObserver),
        })
    }

    pub fn with_default_loader(config: ScrivenerConfig) -> Result<Self> {
        Self::new(config, Box::new(DefaultModelLoader))
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn is_model_loaded(&self) -> bool {
        self.recognizer.is_some()
    }

    pub fn ensure_model_loaded(&mut self) -> Result<()> {
        if !self.is_model_loaded() {
            let recognizer = self.loader.load_recognizer(&self.config)?;
            self.recognizer = Some(recognizer);
        }
        Ok(())
    }

    /// Transcribe one audio file end to end.
    ///
    /// Intermediate audio is removed before this returns, whether or not the
    /// request succeeded.
    pub fn transcribe_file(
        &mut self,
        input: &Path,
        request: &TranscribeRequest,
    ) -> Result<TranscriptionResponse> {
        let mut tracker = RunTracker::new(Arc::clone(&self.observer));
        let mut scope = ArtifactScope::new();

        let result = self
            .run_pipeline(input, request, &mut tracker, &mut scope)
            .map(|(response, _)| response);
        finish(input, &result, &mut tracker, scope);
        result
    }

    /// Transcribe a file and diarize it separately, for callers that keep
    /// the plain transcript and the speaker turns as distinct outputs.
    ///
    /// The token is checked before any audio work starts, and the normalised
    /// audio is shared by both passes.
    pub fn transcribe_with_speakers(
        &mut self,
        input: &Path,
        request: &TranscribeRequest,
        num_speakers: Option<usize>,
    ) -> Result<(TranscriptionResponse, DiarizationResult)> {
        let token = required_token(&self.config)?.to_string();
        let num_speakers = num_speakers.or(self.config.diarization.num_speakers);
        let mut tracker = RunTracker::new(Arc::clone(&self.observer));
        let mut scope = ArtifactScope::new();

        let result = self
            .run_pipeline(input, request, &mut tracker, &mut scope)
            .and_then(|(response, wav)| {
                tracker.advance(PipelineState::DiarizationAttempted);
                let diarization = self.diarize_wav(&wav, &token, num_speakers)?;
                Ok((response, diarization))
            });
        finish(input, &result, &mut tracker, scope);
        result
    }

    /// Diarize a file on its own. Unlike during transcription, a missing
    /// token or a failing diarizer is an error here.
    pub fn diarize_file(
        &mut self,
        input: &Path,
        num_speakers: Option<usize>,
    ) -> Result<DiarizationResult> {
        let config = self.config.clone();
        let token = required_token(&config)?;

        let mut scope = ArtifactScope::new();
        let temp_dir = config.temp_dir();
        let wav = convert_to_wav(input, &temp_dir, &config.audio, &mut scope)?;

        self.diarize_wav(&wav, token, num_speakers.or(config.diarization.num_speakers))
    }

    fn diarize_wav(
        &mut self,
        wav: &Path,
        token: &str,
        num_speakers: Option<usize>,
    ) -> Result<DiarizationResult> {
        if self.diarizer.is_none() {
            self.diarizer = Some(self.loader.load_diarizer(&self.config, token)?);
        }
        let diarizer = self
            .diarizer
            .as_mut()
            .ok_or_else(|| ScrivenerError::Diarization("Diarizer not loaded".to_string()))?;

        diarizer.diarize(wav, num_speakers)
    }

    fn run_pipeline(
        &mut self,
        input: &Path,
        request: &TranscribeRequest,
        tracker: &mut RunTracker,
        scope: &mut ArtifactScope,
    ) -> Result<(TranscriptionResponse, PathBuf)> {
        let config = self.config.clone();

        self.ensure_model_loaded()?;
        tracker.advance(PipelineState::ModelReady);

        let temp_dir = config.temp_dir();
        let wav = convert_to_wav(input, &temp_dir, &config.audio, scope)?;
        let chunks = split_into_chunks(&wav, config.audio.chunk_duration, scope)?;
        tracing::info!("Transcribing {} in {} chunks", input.display(), chunks.len());
        tracker.advance(PipelineState::Chunked);

        let options = ChunkOptions {
            language: request.language.as_deref(),
            word_timestamps: request.word_timestamps,
        };
        let observer = Arc::clone(&self.observer);
        let recognizer = self
            .recognizer
            .as_mut()
            .ok_or_else(|| ScrivenerError::Transcription("Model not loaded".to_string()))?;
        let aggregate = transcribe_chunks(&mut **recognizer, &chunks, options, |index, total| {
            observer.on_chunk(index, total)
        })?;
        tracker.advance(PipelineState::Transcribed);

        let want_diarization = request.diarize.unwrap_or(config.diarization.enabled);
        let include_labels = request
            .include_speakers_in_text
            .unwrap_or(config.diarization.include_in_text);

        let diarization = if want_diarization {
            let num_speakers = request.num_speakers.or(config.diarization.num_speakers);
            self.try_diarize(&config, &wav, num_speakers, tracker)
        } else {
            tracing::debug!("Diarization disabled for this request");
            None
        };

        let mut text = aggregate.text;
        let mut segments = aggregate.segments;

        let applied = match diarization {
            Some(result) if !result.is_empty() => {
                segments = merge_speakers(&result, segments);
                true
            }
            _ => false,
        };
        if want_diarization && !applied {
            tracing::warn!("Diarization was requested but not applied");
        }
        tracker.advance(PipelineState::Merged);

        if applied && include_labels {
            apply_speaker_labels(&mut segments);
            text = join_segment_text(&segments);
        }
        tracker.advance(PipelineState::Formatted);

        let duration = estimate_duration(&segments);
        let response = TranscriptionResponse {
            text,
            segments: request.return_segments.then_some(segments),
            language: request.language.clone(),
            duration: Some(duration),
            model: config.transcription.model_id.clone(),
        };

        Ok((response, wav))
    }

    /// Every failure in here degrades to `None`.
    fn try_diarize(
        &mut self,
        config: &ScrivenerConfig,
        wav: &Path,
        num_speakers: Option<usize>,
        tracker: &mut RunTracker,
    ) -> Option<DiarizationResult> {
        let token = match config.hf_token() {
            Some(token) => token,
            None => {
                tracing::warn!("No Hugging Face token available, skipping diarization");
                return None;
            }
        };
        tracker.advance(PipelineState::DiarizationAttempted);

        if self.diarizer.is_none() {
            match self.loader.load_diarizer(config, token) {
                Ok(diarizer) => self.diarizer = Some(diarizer),
                Err(e) => {
                    tracing::warn!("Failed to load diarizer: {}", e);
                    return None;
                }
            }
        }
        let diarizer = self.diarizer.as_mut()?;

        match diarizer.diarize(wav, num_speakers) {
            Ok(result) => {
                tracing::info!(
                    "Diarization found {} speakers",
                    result.num_speakers
                );
                Some(result)
            }
            Err(e) => {
                tracing::warn!("Diarization failed, continuing without speakers: {}", e);
                None
            }
        }
    }
}

fn required_token(config: &ScrivenerConfig) -> Result<&str> {
    config.hf_token().ok_or_else(|| {
        ScrivenerError::Diarization(
            "Hugging Face token is required. Pass --hf-token or set HUGGINGFACE_ACCESS_TOKEN"
                .to_string(),
        )
    })
}

/// Record the outcome of a request and drop its intermediate audio.
fn finish<T>(
    input: &Path,
    result: &Result<T>,
    tracker: &mut RunTracker,
    mut scope: ArtifactScope,
) {
    match result {
        Ok(_) => tracker.advance(PipelineState::Done),
        Err(e) => {
            tracing::error!("Transcription of {} failed: {}", input.display(), e);
            tracker.advance(PipelineState::Failed);
        }
    }

    if !scope.is_empty() {
        tracing::debug!("Removing {} intermediate files", scope.len());
    }
    scope.cleanup();
}
