//! Speech input: capture one utterance and turn it into text.
//!
//! Recognition failures never escape this module. They become sentinel
//! [`Utterance`] values and fixed placeholder strings in the shared heard
//! slot, and the conversation loop just listens again.

pub mod cloud;

pub use cloud::CloudRecognizer;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::audio::MicCapture;
use crate::config::{AudioConfig, VadConfig};
use crate::error::{AssistantError, Result};
use crate::state::SharedState;

/// Placeholder shown when the service returned an empty transcription.
pub const UNINTELLIGIBLE_PLACEHOLDER: &str = "[Could not understand you]";

/// Placeholder shown when the recognition request itself failed.
pub const SERVICE_ERROR_PLACEHOLDER: &str = "[Speech recognition error]";

/// Outcome of one recognition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Utterance {
    /// Speech was recognized as this text.
    Heard(String),
    /// Audio was captured but the service could not make out any words.
    Unintelligible,
    /// The recognition service could not be reached or errored.
    ServiceError,
}

/// Source of one endpointed utterance of audio.
#[async_trait]
pub trait AudioSource: Send + Sync {
    /// Captures one utterance. Returns mono samples and their sample rate.
    async fn capture_utterance(&self) -> Result<(Vec<f32>, u32)>;
}

/// Speech-to-text transcription service.
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Transcribes mono samples at the given rate.
    async fn transcribe(&self, samples: &[f32], sample_rate: u32) -> Result<String>;
}

/// One listen-and-recognize cycle.
#[async_trait]
pub trait Listener: Send + Sync {
    /// Captures one utterance from the microphone and recognizes it.
    async fn listen_once(&self) -> Utterance;
}

/// Maps a transcription result onto an [`Utterance`].
#[must_use]
pub fn classify_transcription(result: Result<String>) -> Utterance {
    match result {
        Ok(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Utterance::Unintelligible
            } else {
                Utterance::Heard(trimmed.to_owned())
            }
        }
        Err(e) => {
            warn!(error = %e, "speech recognition failed");
            Utterance::ServiceError
        }
    }
}

/// Microphone-backed audio source.
///
/// Opens the device per call and releases it before returning. cpal streams
/// are not `Send`, so the whole capture runs inside `spawn_blocking`.
pub struct MicSource {
    audio_config: AudioConfig,
    vad_config: VadConfig,
}

impl MicSource {
    /// Creates a microphone source.
    #[must_use]
    pub fn new(audio_config: AudioConfig, vad_config: VadConfig) -> Self {
        Self {
            audio_config,
            vad_config,
        }
    }
}

#[async_trait]
impl AudioSource for MicSource {
    async fn capture_utterance(&self) -> Result<(Vec<f32>, u32)> {
        let audio_config = self.audio_config.clone();
        let vad_config = self.vad_config.clone();
        let sample_rate = audio_config.input_sample_rate;
        let samples = tokio::task::spawn_blocking(move || {
            let mic = MicCapture::open(&audio_config)?;
            mic.capture_utterance(&vad_config)
        })
        .await
        .map_err(|e| AssistantError::Audio(format!("capture task panicked: {e}")))??;
        Ok((samples, sample_rate))
    }
}

/// Speech input adapter.
///
/// Raises the listening indicator while capturing, mirrors every outcome
/// into the shared heard slot, and never propagates errors to the caller.
pub struct SpeechInput {
    source: Arc<dyn AudioSource>,
    recognizer: Arc<dyn Recognizer>,
    state: Arc<SharedState>,
}

impl SpeechInput {
    /// Creates a speech input adapter.
    #[must_use]
    pub fn new(
        source: Arc<dyn AudioSource>,
        recognizer: Arc<dyn Recognizer>,
        state: Arc<SharedState>,
    ) -> Self {
        Self {
            source,
            recognizer,
            state,
        }
    }
}

#[async_trait]
impl Listener for SpeechInput {
    async fn listen_once(&self) -> Utterance {
        self.state.set_listening(true);
        let captured = self.source.capture_utterance().await;
        self.state.set_listening(false);

        let (samples, sample_rate) = match captured {
            Ok(captured) => captured,
            Err(e) => {
                warn!(error = %e, "audio capture failed");
                self.state.set_heard(SERVICE_ERROR_PLACEHOLDER);
                return Utterance::ServiceError;
            }
        };

        let result = self.recognizer.transcribe(&samples, sample_rate).await;
        let utterance = classify_transcription(result);

        match &utterance {
            Utterance::Heard(text) => {
                debug!(text = %text, "recognized");
                self.state.set_heard(text.clone());
            }
            Utterance::Unintelligible => self.state.set_heard(UNINTELLIGIBLE_PLACEHOLDER),
            Utterance::ServiceError => self.state.set_heard(SERVICE_ERROR_PLACEHOLDER),
        }
        utterance
    }
}
