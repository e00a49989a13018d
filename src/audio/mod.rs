use crate::error::{Result, ScrivenerError};
use hound::{WavSpec, WavWriter};
use std::path::{Path, PathBuf};

pub mod artifacts;
pub mod chunker;
pub mod convert;

/// One fixed-duration slice of the normalized input, stored on disk
#[derive(Debug, Clone, PartialEq)]
pub struct AudioChunk {
    pub index: usize,
    pub path: PathBuf,
    /// Seconds from the start of the file (`index * chunk_duration`)
    pub start_offset: f64,
    /// Seconds of audio actually covered; the last chunk may be short
    pub duration: f64,
}

/// Mono f32 samples decoded from a WAV file
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Read a WAV file of any integer or float layout and down-mix it to mono.
pub fn read_wav_mono<P: AsRef<Path>>(path: P) -> Result<DecodedAudio> {
    let path = path.as_ref();
    let reader = hound::WavReader::open(path).map_err(|e| {
        ScrivenerError::InvalidAudio(format!("Failed to open WAV {}: {}", path.display(), e))
    })?;

    let spec = reader.spec();
    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<_, _>>()
        }
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>(),
    }
    .map_err(|e| {
        ScrivenerError::InvalidAudio(format!("Failed to decode {}: {}", path.display(), e))
    })?;

    Ok(DecodedAudio {
        samples: convert::to_mono(&samples, spec.channels),
        sample_rate: spec.sample_rate,
    })
}

/// Write mono f32 samples as a 32-bit float WAV.
pub fn write_wav_mono<P: AsRef<Path>>(path: P, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path.as_ref(), spec)
        .map_err(|e| ScrivenerError::InvalidAudio(format!("Failed to create WAV writer: {}", e)))?;

    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| ScrivenerError::InvalidAudio(format!("Failed to write sample: {}", e)))?;
    }

    writer
        .finalize()
        .map_err(|e| ScrivenerError::InvalidAudio(format!("Failed to finalize WAV: {}", e)))?;
    Ok(())
}
