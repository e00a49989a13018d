use crate::output::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scrivener")]
#[command(
    author,
    version = env!("SCRIVENER_VERSION_INFO"),
    about = "Speaker-attributed transcription for long recordings"
)]
#[command(
    long_about = "Transcribe long audio in fixed-length chunks, diarize it, and merge both into one speaker-labelled transcript"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Transcribe an audio file
    Transcribe(TranscribeArgs),

    /// Run speaker diarization only and write the speaker turns as JSON
    Diarize {
        /// Audio file to diarize
        #[arg(short, long)]
        file: PathBuf,
        /// Where to write the diarization JSON
        #[arg(short, long)]
        output: PathBuf,
        /// Hugging Face access token for the diarization pipeline
        #[arg(long)]
        hf_token: Option<String>,
        /// Expected number of speakers
        #[arg(long)]
        num_speakers: Option<usize>,
    },

    /// Merge a segments file with a diarization file
    Merge {
        /// Transcript segments JSON
        #[arg(long)]
        segments: PathBuf,
        /// Diarization JSON
        #[arg(long)]
        speakers: PathBuf,
        /// Where to write the merged transcript
        #[arg(short, long)]
        output: PathBuf,
        /// Prefix segment text with speaker labels
        #[arg(long)]
        include_speakers_in_text: bool,
    },

    /// Transcribe, diarize and merge a file, keeping every intermediate
    Run {
        /// Audio file to process
        file: PathBuf,
        /// Results go to <output-dir>/<file stem>/
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
        /// Hugging Face access token for the diarization pipeline
        #[arg(long)]
        hf_token: Option<String>,
        /// Expected number of speakers
        #[arg(long)]
        num_speakers: Option<usize>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Args)]
pub struct TranscribeArgs {
    /// Audio file to transcribe
    #[arg(short, long)]
    pub file: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Write the rendered transcript here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write the timed segments as JSON
    #[arg(long)]
    pub segments_output: Option<PathBuf>,

    /// Language hint passed to the recognizer (e.g. "en")
    #[arg(short, long)]
    pub language: Option<String>,

    /// Include timed segments in the response
    #[arg(long)]
    pub timestamps: bool,

    /// Ask the recognizer for word-level timings
    #[arg(long)]
    pub word_timestamps: bool,

    /// Hugging Face access token for the diarization pipeline
    #[arg(long)]
    pub hf_token: Option<String>,

    /// Directory for intermediate audio files
    #[arg(long)]
    pub temp_dir: Option<PathBuf>,

    /// Chunk length in seconds
    #[arg(long)]
    pub chunk_duration: Option<f64>,

    /// Diarize even if the config turns it off
    #[arg(long, conflicts_with = "disable_diarization")]
    pub enable_diarization: bool,

    /// Skip diarization for this request
    #[arg(long)]
    pub disable_diarization: bool,

    /// Prefix transcript text with speaker labels
    #[arg(long, conflicts_with = "exclude_speakers_from_text")]
    pub include_speakers_in_text: bool,

    /// Keep speaker labels out of the transcript text
    #[arg(long)]
    pub exclude_speakers_from_text: bool,

    /// Expected number of speakers
    #[arg(long)]
    pub num_speakers: Option<usize>,
}

impl TranscribeArgs {
    /// `None` when neither flag was given.
    pub fn diarize(&self) -> Option<bool> {
        toggle(self.enable_diarization, self.disable_diarization)
    }

    pub fn speakers_in_text(&self) -> Option<bool> {
        toggle(self.include_speakers_in_text, self.exclude_speakers_from_text)
    }

    pub fn wants_segments(&self) -> bool {
        self.timestamps || self.format.needs_segments()
    }
}

fn toggle(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Print config file path
    Path,
    /// Initialize default configuration
    Init,
}
