//! Conversion of captured audio to the 16 kHz mono `f32` Whisper expects.

/// Sample rate Whisper is trained on.
pub const WHISPER_RATE: u32 = 16_000;

/// Average interleaved channels down to mono.
///
/// ```rust
/// use desi_scribe::dictation::resample::downmix;
///
/// let stereo = vec![0.5_f32, -0.5, 0.2, 0.4]; // L R L R
/// let mono = downmix(&stereo, 2);
/// assert_eq!(mono.len(), 2);
/// assert!((mono[1] - 0.3).abs() < 1e-6);
/// ```
pub fn downmix(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

/// Linear-interpolation resampler to [`WHISPER_RATE`].
pub fn to_whisper_rate(samples: &[f32], source_rate: u32) -> Vec<f32> {
    if source_rate == WHISPER_RATE || samples.is_empty() || source_rate == 0 {
        return samples.to_vec();
    }

    let ratio = WHISPER_RATE as f64 / source_rate as f64;
    let output_len = (samples.len() as f64 * ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let pos = i as f64 / ratio;
            let idx = pos as usize;
            let frac = (pos - idx as f64) as f32;
            match (samples.get(idx), samples.get(idx + 1)) {
                (Some(a), Some(b)) => a * (1.0 - frac) + b * frac,
                (Some(a), None) => *a,
                _ => 0.0,
            }
        })
        .collect()
}
