//! Microphone capture for one utterance at a time.
//!
//! The device is opened per call and released when the call returns, so the
//! microphone is never held between conversation turns. Capture runs at the
//! device's native rate and is downsampled in software to the configured
//! input rate.
//!
//! cpal streams are not `Send`, so callers drive this from
//! `tokio::task::spawn_blocking` with the configs cloned in.

use cpal::StreamConfig;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::audio::{downsample, to_mono};
use crate::config::{AudioConfig, VadConfig};
use crate::error::{AssistantError, Result};
use crate::vad::{EnergyVad, rms};

/// Seconds without any audio callback before capture gives up.
const CHUNK_RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Microphone capture via cpal.
pub struct MicCapture {
    device: cpal::Device,
    stream_config: StreamConfig,
    target_sample_rate: u32,
}

impl MicCapture {
    /// Opens the configured input device (or the system default).
    ///
    /// Uses the device's default configuration for compatibility and
    /// downsamples to the target rate in software.
    ///
    /// # Errors
    ///
    /// Returns an error if no suitable input device is available.
    pub fn open(config: &AudioConfig) -> Result<Self> {
        let host = cpal::default_host();

        let device = if let Some(ref name) = config.input_device {
            host.input_devices()
                .map_err(|e| AssistantError::Audio(format!("cannot enumerate devices: {e}")))?
                .find(|d| {
                    d.description()
                        .ok()
                        .map(|desc| desc.name() == name)
                        .unwrap_or(false)
                })
                .ok_or_else(|| AssistantError::Audio(format!("input device '{name}' not found")))?
        } else {
            host.default_input_device()
                .ok_or_else(|| AssistantError::Audio("no default input device".into()))?
        };

        let device_name = device
            .description()
            .map(|d| d.name().to_owned())
            .unwrap_or_else(|_| "<unknown>".into());
        info!("using input device: {device_name}");

        let default_config = device
            .default_input_config()
            .map_err(|e| AssistantError::Audio(format!("no default input config: {e}")))?;

        let stream_config = StreamConfig {
            channels: default_config.channels(),
            sample_rate: default_config.sample_rate(),
            buffer_size: cpal::BufferSize::Default,
        };

        Ok(Self {
            device,
            stream_config,
            target_sample_rate: config.input_sample_rate,
        })
    }

    /// Captures one utterance, blocking until endpointing completes.
    ///
    /// The first `calibration_ms` of audio measure the ambient noise floor;
    /// the detector threshold is derived from it. The stream is dropped on
    /// every return path.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream cannot be built or the device stops
    /// delivering audio.
    pub fn capture_utterance(&self, vad_config: &VadConfig) -> Result<Vec<f32>> {
        let native_rate = self.stream_config.sample_rate;
        let native_channels = self.stream_config.channels;
        let target_rate = self.target_sample_rate;

        let (tx, rx) = std::sync::mpsc::sync_channel::<Vec<f32>>(64);

        let stream = self
            .device
            .build_input_stream(
                &self.stream_config,
                move |data: &[f32], _info: &cpal::InputCallbackInfo| {
                    let mono = if native_channels > 1 {
                        to_mono(data, native_channels)
                    } else {
                        data.to_vec()
                    };
                    let samples = if native_rate != target_rate {
                        downsample(&mono, native_rate, target_rate)
                    } else {
                        mono
                    };
                    // try_send keeps the audio thread from ever blocking.
                    if tx.try_send(samples).is_err() {
                        debug!("capture channel full, dropping chunk");
                    }
                },
                move |err| {
                    error!("audio input stream error: {err}");
                },
                None,
            )
            .map_err(|e| AssistantError::Audio(format!("failed to build input stream: {e}")))?;

        stream
            .play()
            .map_err(|e| AssistantError::Audio(format!("failed to start input stream: {e}")))?;

        // Ambient calibration phase.
        let calibration_samples =
            target_rate as usize * vad_config.calibration_ms as usize / 1000;
        let mut ambient = Vec::with_capacity(calibration_samples);
        while ambient.len() < calibration_samples {
            let chunk = rx
                .recv_timeout(CHUNK_RECV_TIMEOUT)
                .map_err(|_| AssistantError::Audio("microphone stopped delivering audio".into()))?;
            ambient.extend_from_slice(&chunk);
        }
        let ambient_rms = rms(&ambient);
        let mut vad = EnergyVad::calibrated(vad_config, ambient_rms, target_rate);
        debug!(
            ambient_rms,
            threshold = vad.threshold(),
            "ambient calibration complete"
        );

        // Endpointing phase.
        loop {
            let chunk = rx
                .recv_timeout(CHUNK_RECV_TIMEOUT)
                .map_err(|_| AssistantError::Audio("microphone stopped delivering audio".into()))?;
            if let Some(utterance) = vad.push_chunk(&chunk) {
                drop(stream);
                debug!(samples = utterance.len(), "utterance captured");
                return Ok(utterance);
            }
        }
    }
}
