use crate::audio::artifacts::ArtifactScope;
use crate::audio::{read_wav_mono, write_wav_mono, AudioChunk};
use crate::error::{Result, ScrivenerError};
use std::path::Path;

/// Sample ranges `[start, end)` for consecutive chunks of `chunk_duration`
/// seconds. Chunk `i` starts at `i * chunk_duration`; the last one may be short.
pub fn chunk_bounds(
    total_samples: usize,
    sample_rate: u32,
    chunk_duration: f64,
) -> Result<Vec<(usize, usize)>> {
    if !chunk_duration.is_finite() || chunk_duration <= 0.0 {
        return Err(ScrivenerError::InvalidConfig(format!(
            "chunk_duration must be positive, got {}",
            chunk_duration
        )));
    }

    let boundary = |index: usize| -> usize {
        (index as f64 * chunk_duration * sample_rate as f64).round() as usize
    };

    if boundary(1) == 0 {
        return Err(ScrivenerError::InvalidConfig(format!(
            "chunk_duration {}s is shorter than one sample at {} Hz",
            chunk_duration, sample_rate
        )));
    }

    let mut bounds = Vec::new();
    let mut index = 0;
    loop {
        let start = boundary(index);
        if start >= total_samples {
            break;
        }
        let end = boundary(index + 1).min(total_samples);
        bounds.push((start, end));
        index += 1;
    }

    Ok(bounds)
}

/// Split a normalized mono WAV into chunk files next to it.
///
/// Audio no longer than one chunk is returned as a single chunk pointing at
/// `wav_path` itself. Every chunk file written is registered with `scope`.
pub fn split_into_chunks(
    wav_path: &Path,
    chunk_duration: f64,
    scope: &mut ArtifactScope,
) -> Result<Vec<AudioChunk>> {
    let audio = read_wav_mono(wav_path)?;
    if audio.samples.is_empty() || audio.sample_rate == 0 {
        return Err(ScrivenerError::InvalidAudio(format!(
            "{} has zero duration",
            wav_path.display()
        )));
    }

    let bounds = chunk_bounds(audio.samples.len(), audio.sample_rate, chunk_duration)?;
    let rate = audio.sample_rate as f64;

    if bounds.len() == 1 {
        return Ok(vec![AudioChunk {
            index: 0,
            path: wav_path.to_path_buf(),
            start_offset: 0.0,
            duration: audio.duration_seconds(),
        }]);
    }

    let dir = wav_path.parent().unwrap_or_else(|| Path::new("."));
    let stem = wav_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");

    let mut chunks = Vec::with_capacity(bounds.len());
    for (index, (start, end)) in bounds.into_iter().enumerate() {
        let path = dir.join(format!("{}_chunk_{:04}.wav", stem, index));
        scope.register(&path);
        write_wav_mono(&path, &audio.samples[start..end], audio.sample_rate)?;

        chunks.push(AudioChunk {
            index,
            path,
            start_offset: index as f64 * chunk_duration,
            duration: (end - start) as f64 / rate,
        });
    }

    tracing::debug!(
        "Split {} into {} chunks of {}s",
        wav_path.display(),
        chunks.len(),
        chunk_duration
    );

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_bounds_cover_without_gaps() {
        let bounds = chunk_bounds(25, 1, 10.0).unwrap();
        assert_eq!(bounds, vec![(0, 10), (10, 20), (20, 25)]);
    }

    #[test]
    fn test_bounds_exact_multiple() {
        let bounds = chunk_bounds(16000 * 4, 16000, 2.0).unwrap();
        assert_eq!(bounds.len(), 2);
        assert_eq!(bounds[1], (32000, 64000));
    }

    #[test]
    fn test_bounds_fractional_duration() {
        let bounds = chunk_bounds(10, 4, 0.75).unwrap();
        assert_eq!(bounds, vec![(0, 3), (3, 6), (6, 9), (9, 10)]);
        for pair in bounds.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
        }
    }

    #[test]
    fn test_bounds_reject_bad_duration() {
        assert!(chunk_bounds(100, 16000, 0.0).is_err());
        assert!(chunk_bounds(100, 16000, -3.0).is_err());
        assert!(chunk_bounds(100, 16000, 1e-9).is_err());
    }

    #[test]
    fn test_split_writes_and_registers_chunks() {
        let dir = tempdir().unwrap();
        let wav = dir.path().join("norm.wav");
        // 5 seconds at 1 kHz keeps the fixture small
        write_wav_mono(&wav, &vec![0.1; 5000], 1000).unwrap();

        let mut scope = ArtifactScope::new();
        let chunks = split_into_chunks(&wav, 2.0, &mut scope).unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(scope.len(), 3);

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert_eq!(chunk.start_offset, i as f64 * 2.0);
            assert!(chunk.path.exists());
        }
        assert!((chunks[2].duration - 1.0).abs() < 1e-9);

        let last = read_wav_mono(&chunks[2].path).unwrap();
        assert_eq!(last.samples.len(), 1000);

        drop(scope);
        assert!(chunks.iter().all(|c| !c.path.exists()));
        assert!(wav.exists());
    }

    #[test]
    fn test_short_audio_is_single_chunk_of_source() {
        let dir = tempdir().unwrap();
        let wav = dir.path().join("short.wav");
        write_wav_mono(&wav, &vec![0.1; 1500], 1000).unwrap();

        let mut scope = ArtifactScope::new();
        let chunks = split_into_chunks(&wav, 2.0, &mut scope).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].path, wav);
        assert!(scope.is_empty());
    }

    #[test]
    fn test_zero_duration_is_invalid_audio() {
        let dir = tempdir().unwrap();
        let wav = dir.path().join("empty.wav");
        write_wav_mono(&wav, &[], 16000).unwrap();

        let mut scope = ArtifactScope::new();
        let result = split_into_chunks(&wav, 10.0, &mut scope);
        assert!(matches!(result, Err(ScrivenerError::InvalidAudio(_))));
    }
}
