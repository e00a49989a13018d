use crate::config::loader::models_dir;
use crate::config::ScrivenerConfig;
use crate::diarization::command::CommandDiarizer;
use crate::diarization::SpeakerDiarizer;
use crate::error::{Result, ScrivenerError};
use crate::external::ExternalCommand;
use crate::transcription::command::CommandRecognizer;
use crate::transcription::openai::OpenAIRecognizer;
use crate::transcription::SpeechRecognizer;
use std::path::PathBuf;

/// Builds the heavyweight collaborators the service keeps loaded between
/// requests.
pub trait ModelLoader: Send {
    fn load_recognizer(&mut self, config: &ScrivenerConfig) -> Result<Box<dyn SpeechRecognizer>>;

    fn load_diarizer(
        &mut self,
        config: &ScrivenerConfig,
        token: &str,
    ) -> Result<Box<dyn SpeakerDiarizer>>;
}

/// Loader that picks backends from the `[transcription]` and
/// `[diarization]` config sections.
#[derive(Debug, Default)]
pub struct DefaultModelLoader;

impl ModelLoader for DefaultModelLoader {
    fn load_recognizer(&mut self, config: &ScrivenerConfig) -> Result<Box<dyn SpeechRecognizer>> {
        let transcription = &config.transcription;
        tracing::info!(
            "Loading {} recognizer (model {})",
            transcription.engine,
            transcription.model_id
        );

        match transcription.engine.as_str() {
            "openai" => {
                let api_key = transcription
                    .openai_api_key
                    .as_deref()
                    .filter(|k| !k.trim().is_empty())
                    .ok_or_else(|| {
                        ScrivenerError::Config(
                            "OpenAI API key not configured. Set OPENAI_API_KEY or transcription.openai_api_key"
                                .to_string(),
                        )
                    })?;
                Ok(Box::new(OpenAIRecognizer::new(
                    api_key,
                    transcription.model_id.clone(),
                )))
            }
            "command" => {
                let program = transcription.command.as_deref().ok_or_else(|| {
                    ScrivenerError::Config(
                        "transcription.command must be set for the command engine".to_string(),
                    )
                })?;
                Ok(Box::new(CommandRecognizer::new(
                    ExternalCommand::new(program, transcription.args.clone()),
                    config.temp_dir(),
                )))
            }
            "whisper" => load_whisper(config),
            other => Err(ScrivenerError::Config(format!(
                "Unknown transcription engine: {}",
                other
            ))),
        }
    }

    fn load_diarizer(
        &mut self,
        config: &ScrivenerConfig,
        token: &str,
    ) -> Result<Box<dyn SpeakerDiarizer>> {
        let diarization = &config.diarization;
        let program = diarization.command.as_deref().ok_or_else(|| {
            ScrivenerError::Config("diarization.command is not configured".to_string())
        })?;
        tracing::info!("Loading diarizer {}", program);
        Ok(Box::new(CommandDiarizer::new(
            ExternalCommand::new(program, diarization.args.clone()),
            token,
            config.temp_dir(),
        )))
    }
}

/// Explicit `whisper_model_path`, else `ggml-<model_id>.bin` in the models dir.
pub fn whisper_model_path(config: &ScrivenerConfig) -> Result<PathBuf> {
    match &config.transcription.whisper_model_path {
        Some(path) => Ok(path.clone()),
        None => Ok(models_dir()?.join(format!("ggml-{}.bin", config.transcription.model_id))),
    }
}

#[cfg(feature = "whisper")]
fn load_whisper(config: &ScrivenerConfig) -> Result<Box<dyn SpeechRecognizer>> {
    use crate::transcription::whisper::WhisperRecognizer;

    let path = whisper_model_path(config)?;
    Ok(Box::new(WhisperRecognizer::new(
        path,
        config.transcription.use_gpu,
    )?))
}

#[cfg(not(feature = "whisper"))]
fn load_whisper(_config: &ScrivenerConfig) -> Result<Box<dyn SpeechRecognizer>> {
    Err(ScrivenerError::Config(
        "Built without the whisper feature; rebuild with --features whisper or pick another engine"
            .to_string(),
    ))
}
