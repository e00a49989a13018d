use crate::config::settings::ScrivenerConfig;
use crate::error::{Result, ScrivenerError};
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

/// Get XDG-compliant config directory
pub fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", "scrivener")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| ScrivenerError::Config("Could not determine config directory".to_string()))
}

/// Get XDG-compliant data directory
pub fn data_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", "scrivener")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| ScrivenerError::Config("Could not determine data directory".to_string()))
}

/// Get config file path
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Get models directory
pub fn models_dir() -> Result<PathBuf> {
    Ok(data_dir()?.join("models"))
}

/// Load config from file, creating default if not exists
pub fn load_config() -> Result<ScrivenerConfig> {
    let path = config_path()?;

    if !path.exists() {
        let config = ScrivenerConfig::default();
        save_config(&config)?;
        return Ok(config);
    }

    let content = fs::read_to_string(&path)?;
    let config: ScrivenerConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save config to file
pub fn save_config(config: &ScrivenerConfig) -> Result<()> {
    let path = config_path()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(config)?;
    fs::write(&path, content)?;
    Ok(())
}

/// Ensure all data directories exist
pub fn ensure_directories() -> Result<()> {
    fs::create_dir_all(config_dir()?)?;
    fs::create_dir_all(data_dir()?)?;
    fs::create_dir_all(models_dir()?)?;
    Ok(())
}

/// Load the config file and layer environment overrides on top.
pub fn load_config_with_env() -> Result<ScrivenerConfig> {
    let mut config = load_config()?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

pub fn apply_env_overrides<F>(config: &mut ScrivenerConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(engine) = lookup("SCRIVENER_ENGINE") {
        config.transcription.engine = engine;
    }
    if let Some(model) = lookup("SCRIVENER_MODEL_ID") {
        config.transcription.model_id = model;
    }
    if let Some(raw) = lookup("SCRIVENER_CHUNK_DURATION") {
        config.audio.chunk_duration = raw.trim().parse().map_err(|_| {
            ScrivenerError::InvalidConfig(format!("SCRIVENER_CHUNK_DURATION is not a number: {}", raw))
        })?;
    }
    if let Some(dir) = lookup("SCRIVENER_TEMP_DIR") {
        config.audio.temp_dir = Some(PathBuf::from(dir));
    }
    if let Some(raw) = lookup("SCRIVENER_ENABLE_DIARIZATION") {
        config.diarization.enabled = parse_bool(&raw).ok_or_else(|| {
            ScrivenerError::InvalidConfig(format!(
                "SCRIVENER_ENABLE_DIARIZATION must be true/false, got {}",
                raw
            ))
        })?;
    }
    if let Some(key) = lookup("OPENAI_API_KEY") {
        config.transcription.openai_api_key = Some(key);
    }
    let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    if let Some(token) = non_blank("HUGGINGFACE_ACCESS_TOKEN").or_else(|| non_blank("HF_TOKEN")) {
        config.diarization.hf_token = Some(token);
    }

    Ok(())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
