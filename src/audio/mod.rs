//! Audio capture and playback via cpal.

pub mod capture;
pub mod playback;

pub use capture::MicCapture;
pub use playback::PlaybackSink;

/// Convert interleaved multi-channel audio to mono by averaging channels.
#[must_use]
pub fn to_mono(data: &[f32], channels: u16) -> Vec<f32> {
    let ch = channels as usize;
    data.chunks_exact(ch)
        .map(|frame| frame.iter().sum::<f32>() / ch as f32)
        .collect()
}

/// Simple linear-interpolation downsampler.
///
/// For speech (48kHz -> 16kHz) this is sufficient quality; speech energy
/// sits below 8kHz so no anti-alias filter is needed.
#[must_use]
pub fn downsample(samples: &[f32], src_rate: u32, dst_rate: u32) -> Vec<f32> {
    if src_rate == dst_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = src_rate as f64 / dst_rate as f64;
    let out_len = (samples.len() as f64 / ratio) as usize;
    let mut output = Vec::with_capacity(out_len);

    for i in 0..out_len {
        let src_pos = i as f64 * ratio;
        let idx = src_pos as usize;
        let frac = src_pos - idx as f64;

        let sample = if idx + 1 < samples.len() {
            samples[idx] as f64 * (1.0 - frac) + samples[idx + 1] as f64 * frac
        } else {
            samples[idx.min(samples.len() - 1)] as f64
        };

        output.push(sample as f32);
    }

    output
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn to_mono_averages_stereo_frames() {
        let stereo = [1.0, 0.0, 0.5, 0.5, 0.0, 1.0];
        let mono = to_mono(&stereo, 2);
        assert_eq!(mono, vec![0.5, 0.5, 0.5]);
    }

    #[test]
    fn to_mono_passes_single_channel_through() {
        let data = [0.1, 0.2, 0.3];
        assert_eq!(to_mono(&data, 1), data.to_vec());
    }

    #[test]
    fn downsample_halves_sample_count() {
        let samples: Vec<f32> = (0..480).map(|i| i as f32 / 480.0).collect();
        let out = downsample(&samples, 48_000, 16_000);
        assert_eq!(out.len(), 160);
    }

    #[test]
    fn downsample_same_rate_is_identity() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(downsample(&samples, 16_000, 16_000), samples);
    }

    #[test]
    fn downsample_empty_is_empty() {
        assert!(downsample(&[], 48_000, 16_000).is_empty());
    }
}
