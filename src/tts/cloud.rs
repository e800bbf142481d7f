//! Synthesis via an OpenAI-compatible speech endpoint.
//!
//! Requests raw PCM so the response bytes decode directly to samples with
//! no container parsing.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::config::TtsConfig;
use crate::error::{AssistantError, Result};
use crate::tts::{Synthesizer, VoiceInfo};

/// HTTP client for an OpenAI-compatible speech service.
pub struct CloudSynthesizer {
    endpoint: String,
    api_key: String,
    model: String,
    speed: f32,
    sample_rate: u32,
    client: reqwest::Client,
}

impl CloudSynthesizer {
    /// Creates a synthesizer from config.
    #[must_use]
    pub fn new(config: &TtsConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            speed: config.speed,
            sample_rate: config.sample_rate,
            client: reqwest::Client::new(),
        }
    }
}

/// Decodes little-endian 16-bit PCM bytes into f32 samples.
pub(crate) fn decode_pcm16(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect()
}

#[async_trait]
impl Synthesizer for CloudSynthesizer {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<(Vec<f32>, u32)> {
        let body = json!({
            "model": self.model,
            "input": text,
            "voice": voice,
            "response_format": "pcm",
            "speed": self.speed,
        });

        let mut request = self.client.post(&self.endpoint).json(&body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AssistantError::Tts(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::Tts(format!(
                "speech service returned {status}: {body}"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AssistantError::Tts(format!("failed to read audio body: {e}")))?;

        let samples = decode_pcm16(&bytes);
        if samples.is_empty() {
            return Err(AssistantError::Tts("service returned no audio".to_owned()));
        }
        debug!(samples = samples.len(), "synthesized speech");
        Ok((samples, self.sample_rate))
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        // The OpenAI speech API has a fixed voice roster.
        ["alloy", "echo", "fable", "onyx", "nova", "shimmer"]
            .iter()
            .map(|name| VoiceInfo {
                id: (*name).to_owned(),
                name: (*name).to_owned(),
            })
            .collect()
    }

    fn default_voice(&self) -> String {
        "alloy".to_owned()
    }
}
