//! Recognition via an OpenAI-compatible transcription endpoint.
//!
//! Captured samples are encoded as a 16-bit PCM WAV and posted as a
//! multipart form to `/v1/audio/transcriptions`. Works with OpenAI itself
//! or any local whisper server speaking the same protocol.

use async_trait::async_trait;
use tracing::debug;

use crate::config::RecognizerConfig;
use crate::error::{AssistantError, Result};
use crate::stt::Recognizer;

/// HTTP client for an OpenAI-compatible transcription service.
pub struct CloudRecognizer {
    endpoint: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl CloudRecognizer {
    /// Creates a recognizer from config. An empty API key means no auth
    /// header is sent, which suits local servers.
    #[must_use]
    pub fn new(config: &RecognizerConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            client: reqwest::Client::new(),
        }
    }
}

/// Encodes mono f32 samples as a 16-bit PCM WAV byte buffer.
pub(crate) fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| AssistantError::Stt(format!("WAV encode failed: {e}")))?;
        for &sample in samples {
            let clamped = sample.clamp(-1.0, 1.0);
            writer
                .write_sample((clamped * i16::MAX as f32) as i16)
                .map_err(|e| AssistantError::Stt(format!("WAV encode failed: {e}")))?;
        }
        writer
            .finalize()
            .map_err(|e| AssistantError::Stt(format!("WAV encode failed: {e}")))?;
    }
    Ok(cursor.into_inner())
}

#[async_trait]
impl Recognizer for CloudRecognizer {
    async fn transcribe(&self, samples: &[f32], sample_rate: u32) -> Result<String> {
        let wav = encode_wav(samples, sample_rate)?;
        debug!(bytes = wav.len(), "uploading audio for transcription");

        let part = reqwest::multipart::Part::bytes(wav)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| AssistantError::Stt(format!("invalid mime type: {e}")))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone());

        let mut request = self.client.post(&self.endpoint).multipart(form);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AssistantError::Stt(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::Stt(format!(
                "transcription service returned {status}: {body}"
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AssistantError::Stt(format!("invalid response body: {e}")))?;

        let text = json["text"]
            .as_str()
            .ok_or_else(|| AssistantError::Stt("response missing 'text' field".to_owned()))?;
        Ok(text.to_owned())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn encode_wav_produces_riff_header() {
        let samples = vec![0.0_f32; 160];
        let wav = encode_wav(&samples, 16_000).expect("encode failed");
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        // 44-byte header plus two bytes per sample.
        assert_eq!(wav.len(), 44 + samples.len() * 2);
    }

    #[test]
    fn encode_wav_clamps_out_of_range_samples() {
        let wav = encode_wav(&[2.0, -2.0], 16_000).expect("encode failed");
        let first = i16::from_le_bytes([wav[44], wav[45]]);
        let second = i16::from_le_bytes([wav[46], wav[47]]);
        assert_eq!(first, i16::MAX);
        assert_eq!(second, -i16::MAX);
    }
}
