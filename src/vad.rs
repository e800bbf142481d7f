//! Energy-based voice activity detection with per-call ambient calibration.
//!
//! The microphone adapter measures ambient RMS for a short window at the
//! start of every listen call and derives the speech threshold from it, so
//! the detector tracks room noise instead of using a fixed level.

use crate::config::VadConfig;

/// Root mean square energy of a sample chunk.
#[must_use]
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Endpointing detector for one utterance.
///
/// Feed chunks with [`EnergyVad::push_chunk`]; it returns the captured
/// utterance once enough trailing silence has accumulated.
#[derive(Debug)]
pub struct EnergyVad {
    threshold: f32,
    min_silence_samples: usize,
    min_speech_samples: usize,
    buffer: Vec<f32>,
    speech_samples: usize,
    trailing_silence: usize,
    in_speech: bool,
}

impl EnergyVad {
    /// Creates a detector calibrated against the measured ambient RMS.
    #[must_use]
    pub fn calibrated(config: &VadConfig, ambient_rms: f32, sample_rate: u32) -> Self {
        let threshold = (ambient_rms * config.ambient_multiplier).max(config.min_threshold);
        let per_ms = sample_rate as usize / 1000;
        Self {
            threshold,
            min_silence_samples: config.min_silence_duration_ms as usize * per_ms,
            min_speech_samples: config.min_speech_duration_ms as usize * per_ms,
            buffer: Vec::new(),
            speech_samples: 0,
            trailing_silence: 0,
            in_speech: false,
        }
    }

    /// Returns the active speech threshold.
    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Feeds one chunk of mono samples.
    ///
    /// Returns `Some(utterance)` when speech has been heard for at least the
    /// minimum speech duration and has been followed by the minimum silence
    /// duration. Audio before the first speech chunk is discarded.
    pub fn push_chunk(&mut self, chunk: &[f32]) -> Option<Vec<f32>> {
        let energy = rms(chunk);
        let is_speech = energy >= self.threshold;

        if !self.in_speech {
            if !is_speech {
                return None;
            }
            self.in_speech = true;
        }

        self.buffer.extend_from_slice(chunk);
        if is_speech {
            self.speech_samples += chunk.len();
            self.trailing_silence = 0;
        } else {
            self.trailing_silence += chunk.len();
        }

        if self.trailing_silence >= self.min_silence_samples {
            if self.speech_samples >= self.min_speech_samples {
                return Some(std::mem::take(&mut self.buffer));
            }
            // Too short to be an utterance, likely a noise burst.
            self.reset();
        }
        None
    }

    /// Clears all accumulated state, keeping the calibration.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.speech_samples = 0;
        self.trailing_silence = 0;
        self.in_speech = false;
    }
}
