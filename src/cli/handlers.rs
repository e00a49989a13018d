use crate::cli::commands::*;
use crate::config::{self, ScrivenerConfig};
use crate::error::{Result, ScrivenerError};
use crate::output::{self, files};
use crate::service::{TranscribeRequest, TranscriptionService};
use std::path::{Path, PathBuf};

pub async fn handle_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Transcribe(args) => handle_transcribe(args).await,
        Commands::Diarize {
            file,
            output,
            hf_token,
            num_speakers,
        } => handle_diarize(file, output, hf_token, num_speakers).await,
        Commands::Merge {
            segments,
            speakers,
            output,
            include_speakers_in_text,
        } => handle_merge(&segments, &speakers, &output, include_speakers_in_text),
        Commands::Run {
            file,
            output_dir,
            hf_token,
            num_speakers,
        } => handle_run(file, output_dir, hf_token, num_speakers).await,
        Commands::Config { action } => handle_config(action),
    }
}

fn load_config(hf_token: Option<String>) -> Result<ScrivenerConfig> {
    let mut cfg = config::loader::load_config_with_env()?;
    if let Some(token) = hf_token {
        cfg.update_hf_token(token);
    }
    Ok(cfg)
}

/// Run blocking pipeline work off the async runtime.
async fn run_blocking<T, F>(what: &str, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ScrivenerError::Transcription(format!("{} task failed: {}", what, e)))?
}

fn require_input(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(ScrivenerError::InvalidAudio(format!(
            "cannot read {}: file not found",
            path.display()
        )));
    }
    Ok(())
}

async fn handle_transcribe(args: TranscribeArgs) -> Result<()> {
    require_input(&args.file)?;

    let mut cfg = load_config(args.hf_token.clone())?;
    if let Some(dir) = &args.temp_dir {
        cfg.audio.temp_dir = Some(dir.clone());
    }
    if let Some(seconds) = args.chunk_duration {
        cfg.audio.chunk_duration = seconds;
    }

    let request = TranscribeRequest {
        language: args.language.clone(),
        diarize: args.diarize(),
        include_speakers_in_text: args.speakers_in_text(),
        word_timestamps: args.word_timestamps,
        return_segments: args.wants_segments(),
        num_speakers: args.num_speakers,
    };

    let file = args.file.clone();
    let response = run_blocking("Transcription", move || {
        let mut service = TranscriptionService::with_default_loader(cfg)?;
        service.transcribe_file(&file, &request)
    })
    .await?;

    let rendered = output::render(&response, args.format)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)?;
            eprintln!("Transcript written to: {}", path.display());
        }
        None => println!("{}", rendered),
    }

    if let Some(path) = &args.segments_output {
        match &response.segments {
            Some(segments) => {
                files::write_segments(path, segments)?;
                eprintln!("Segments written to: {}", path.display());
            }
            None => tracing::warn!("No segments to write; pass --timestamps to include them"),
        }
    }

    Ok(())
}

async fn handle_diarize(
    file: PathBuf,
    output: PathBuf,
    hf_token: Option<String>,
    num_speakers: Option<usize>,
) -> Result<()> {
    require_input(&file)?;
    let cfg = load_config(hf_token)?;

    let audio = file.clone();
    let result = run_blocking("Diarization", move || {
        let mut service = TranscriptionService::with_default_loader(cfg)?;
        service.diarize_file(&audio, num_speakers)
    })
    .await?;

    files::write_diarization(&output, &file, &result)?;
    println!(
        "Found {} speakers in {} turns",
        result.num_speakers,
        result.segments.len()
    );
    println!("Diarization written to: {}", output.display());
    Ok(())
}

fn handle_merge(
    segments: &Path,
    speakers: &Path,
    output: &Path,
    include_speakers_in_text: bool,
) -> Result<()> {
    let cfg = config::loader::load_config_with_env()?;
    let response = files::merge_files(
        segments,
        speakers,
        include_speakers_in_text,
        &cfg.transcription.model_id,
    )?;
    files::write_response(output, &response)?;
    println!("Merged transcript written to: {}", output.display());
    Ok(())
}

/// Paths written by `run` for one input file
struct RunOutputs {
    transcript: PathBuf,
    segments: PathBuf,
    speakers: PathBuf,
    verbose: PathBuf,
}

impl RunOutputs {
    fn new(output_dir: &Path, input: &Path) -> Self {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("audio");
        let dir = output_dir.join(stem);
        Self {
            transcript: dir.join("transcript.json"),
            segments: dir.join("segments.json"),
            speakers: dir.join("speakers.json"),
            verbose: dir.join("verbose.json"),
        }
    }
}

async fn handle_run(
    file: PathBuf,
    output_dir: PathBuf,
    hf_token: Option<String>,
    num_speakers: Option<usize>,
) -> Result<()> {
    let cfg = load_config(hf_token)?;
    run_pipeline(cfg, file, output_dir, num_speakers).await
}

async fn run_pipeline(
    cfg: ScrivenerConfig,
    file: PathBuf,
    output_dir: PathBuf,
    num_speakers: Option<usize>,
) -> Result<()> {
    require_input(&file)?;
    if cfg.hf_token().is_none() {
        return Err(ScrivenerError::Diarization(
            "Hugging Face token is required for run. Pass --hf-token or set HUGGINGFACE_ACCESS_TOKEN"
                .to_string(),
        ));
    }
    let model = cfg.transcription.model_id.clone();
    let outputs = RunOutputs::new(&output_dir, &file);

    println!("Processing: {}", file.display());

    let audio = file.clone();
    let (response, diarization) = run_blocking("Pipeline", move || {
        let mut service = TranscriptionService::with_default_loader(cfg)?;
        let request = TranscribeRequest {
            diarize: Some(false),
            include_speakers_in_text: Some(false),
            return_segments: true,
            ..Default::default()
        };
        service.transcribe_with_speakers(&audio, &request, num_speakers)
    })
    .await?;

    files::write_response(&outputs.transcript, &response)?;
    files::write_segments(&outputs.segments, response.segments.as_deref().unwrap_or(&[]))?;
    files::write_diarization(&outputs.speakers, &file, &diarization)?;

    let merged = files::merge_files(&outputs.segments, &outputs.speakers, true, &model)?;
    files::write_response(&outputs.verbose, &merged)?;

    println!("Found {} speakers", diarization.num_speakers);
    for path in [
        &outputs.transcript,
        &outputs.segments,
        &outputs.speakers,
        &outputs.verbose,
    ] {
        println!("  {}", path.display());
    }
    Ok(())
}

fn handle_config(action: ConfigCommands) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let cfg = config::loader::load_config()?;
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigCommands::Path => {
            println!("{}", config::loader::config_path()?.display());
        }
        ConfigCommands::Init => {
            config::loader::ensure_directories()?;
            let cfg = config::loader::load_config()?;
            println!(
                "Configuration initialized at: {}",
                config::loader::config_path()?.display()
            );
            println!("\nDefault settings:");
            println!("  Engine: {} (model {})", cfg.transcription.engine, cfg.transcription.model_id);
            println!("  Chunk duration: {}s", cfg.audio.chunk_duration);
            println!("  Sample rate: {} Hz", cfg.audio.sample_rate);
            println!("  Diarization: {}", if cfg.diarization.enabled { "on" } else { "off" });
        }
    }
    Ok(())
}
