use crate::audio::artifacts::ArtifactScope;
use crate::audio::{read_wav_mono, write_wav_mono};
use crate::config::settings::AudioConfig;
use crate::error::{Result, ScrivenerError};
use std::path::{Path, PathBuf};
use std::process::Command;
use uuid::Uuid;

/// Convert multi-channel audio to mono by averaging channels
pub fn to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }

    let channels = channels as usize;
    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Resample audio to target sample rate using rubato
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    use rubato::{
        Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
    };

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(
        to_rate as f64 / from_rate as f64,
        2.0,
        params,
        samples.len(),
        1, // mono
    )
    .map_err(|e| ScrivenerError::InvalidAudio(format!("Failed to create resampler: {}", e)))?;

    let input = vec![samples.to_vec()];
    let output = resampler
        .process(&input, None)
        .map_err(|e| ScrivenerError::InvalidAudio(format!("Resample failed: {}", e)))?;

    Ok(output.into_iter().next().unwrap_or_default())
}

/// Normalize samples to [-1.0, 1.0] range
pub fn normalize(samples: &mut [f32]) {
    let max_abs = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);
    if max_abs > 1.0 {
        for sample in samples.iter_mut() {
            *sample /= max_abs;
        }
    }
}

/// Produce a mono WAV at the configured sample rate inside `out_dir`.
///
/// The output path is registered with `scope` before anything is written so a
/// half-written file is still cleaned up.
pub fn convert_to_wav(
    input: &Path,
    out_dir: &Path,
    audio: &AudioConfig,
    scope: &mut ArtifactScope,
) -> Result<PathBuf> {
    if !input.exists() {
        return Err(ScrivenerError::InvalidAudio(format!(
            "cannot read {}: file not found",
            input.display()
        )));
    }

    std::fs::create_dir_all(out_dir)?;
    let output = out_dir.join(format!("{}.wav", Uuid::new_v4()));
    scope.register(&output);

    if is_wav(input) {
        match transcode_wav(input, &output, audio.sample_rate) {
            Ok(()) => return Ok(output),
            Err(e) => tracing::debug!(
                "Native WAV decode failed for {}, falling back to ffmpeg: {}",
                input.display(),
                e
            ),
        }
    }

    run_ffmpeg(&audio.ffmpeg_path, input, &output, audio.sample_rate)?;
    Ok(output)
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("wav"))
        .unwrap_or(false)
}

fn transcode_wav(input: &Path, output: &Path, sample_rate: u32) -> Result<()> {
    let decoded = read_wav_mono(input)?;
    let mut samples = resample(&decoded.samples, decoded.sample_rate, sample_rate)?;
    normalize(&mut samples);
    write_wav_mono(output, &samples, sample_rate)
}

fn run_ffmpeg(ffmpeg: &str, input: &Path, output: &Path, sample_rate: u32) -> Result<()> {
    tracing::debug!("Converting {} with {}", input.display(), ffmpeg);

    let result = Command::new(ffmpeg)
        .arg("-y")
        .args(["-loglevel", "error"])
        .arg("-i")
        .arg(input)
        .args(["-ac", "1", "-ar", &sample_rate.to_string(), "-f", "wav"])
        .arg(output)
        .output()
        .map_err(|e| ScrivenerError::InvalidAudio(format!("Failed to run {}: {}", ffmpeg, e)))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(ScrivenerError::InvalidAudio(format!(
            "{} could not decode {}: {}",
            ffmpeg,
            input.display(),
            stderr.trim()
        )));
    }

    Ok(())
}
