use crate::error::{Result, ScrivenerError};
use crate::transcription::{TranscriptSegment, TranscriptionResponse};
use clap::ValueEnum;

pub mod files;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
    Srt,
    Vtt,
    #[value(name = "verbose_json")]
    VerboseJson,
}

impl OutputFormat {
    /// Formats that cannot be rendered without timed segments
    pub fn needs_segments(self) -> bool {
        matches!(self, Self::Srt | Self::Vtt | Self::VerboseJson)
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Json => "json",
            Self::Text => "text",
            Self::Srt => "srt",
            Self::Vtt => "vtt",
            Self::VerboseJson => "verbose_json",
        };
        write!(f, "{}", name)
    }
}

pub fn render(response: &TranscriptionResponse, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json | OutputFormat::VerboseJson => {
            Ok(serde_json::to_string_pretty(response)?)
        }
        OutputFormat::Text => Ok(response.text.clone()),
        OutputFormat::Srt => Ok(format_srt(required_segments(response, format)?)),
        OutputFormat::Vtt => Ok(format_vtt(required_segments(response, format)?)),
    }
}

fn required_segments(
    response: &TranscriptionResponse,
    format: OutputFormat,
) -> Result<&[TranscriptSegment]> {
    match response.segments.as_deref() {
        Some(segments) if !segments.is_empty() => Ok(segments),
        _ => Err(ScrivenerError::Render(format!(
            "Segments not available for {} output",
            format
        ))),
    }
}

pub fn format_srt(segments: &[TranscriptSegment]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            format_clock(segment.start, ','),
            format_clock(segment.end, ','),
            segment.text.trim()
        ));
    }
    out
}

pub fn format_vtt(segments: &[TranscriptSegment]) -> String {
    let mut out = String::from("WEBVTT\n\n");
    for segment in segments {
        out.push_str(&format!(
            "{} --> {}\n{}\n\n",
            format_clock(segment.start, '.'),
            format_clock(segment.end, '.'),
            segment.text.trim()
        ));
    }
    out
}

/// `HH:MM:SS<sep>mmm`
fn format_clock(seconds: f64, millis_sep: char) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!(
        "{:02}:{:02}:{:02}{}{:03}",
        hours, minutes, secs, millis_sep, millis
    )
}
