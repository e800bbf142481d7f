//! Speech output: synthesize a reply and play it aloud.
//!
//! Speaking is deliberately blocking from the conversation loop's point of
//! view; the loop does not listen while the companion talks. The speaking
//! flag is raised for the whole synthesize-and-play span so the avatar shows
//! the talking frame.

pub mod cloud;

pub use cloud::CloudSynthesizer;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::audio::PlaybackSink;
use crate::config::{AudioConfig, TtsConfig};
use crate::error::Result;
use crate::state::SharedState;

/// Voice-name fragments that select a feminine-sounding voice.
pub const FEMININE_VOICE_HINTS: &[&str] = &["female", "zira", "aria", "jenny", "nova", "shimmer"];

/// One available synthesis voice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceInfo {
    /// Identifier sent to the service.
    pub id: String,
    /// Human-readable name used for hint matching.
    pub name: String,
}

/// Picks the first voice whose name contains any hint, case-insensitively.
#[must_use]
pub fn select_voice(voices: &[VoiceInfo], hints: &[&str]) -> Option<String> {
    voices
        .iter()
        .find(|voice| {
            let name = voice.name.to_lowercase();
            hints.iter().any(|hint| name.contains(&hint.to_lowercase()))
        })
        .map(|voice| voice.id.clone())
}

/// Text-to-speech synthesis service.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Synthesizes text with the given voice. Returns mono samples and
    /// their sample rate.
    async fn synthesize(&self, text: &str, voice: &str) -> Result<(Vec<f32>, u32)>;

    /// Lists the voices the service offers.
    fn voices(&self) -> Vec<VoiceInfo>;

    /// The service's fallback voice id.
    fn default_voice(&self) -> String;
}

/// Speaks text aloud. Failures are logged, never propagated; a reply that
/// cannot be spoken is dropped and the conversation continues.
#[async_trait]
pub trait Voice: Send + Sync {
    /// Speaks the text to completion.
    async fn speak(&self, text: &str);
}

/// Synthesizer-backed speech output adapter.
pub struct SpeechOutput {
    synthesizer: Arc<dyn Synthesizer>,
    voice: String,
    audio_config: AudioConfig,
    state: Arc<SharedState>,
}

impl SpeechOutput {
    /// Creates a speech output adapter, choosing the voice once.
    ///
    /// An explicitly configured voice wins; otherwise the first voice
    /// matching a feminine-name hint; otherwise the engine default.
    #[must_use]
    pub fn new(
        synthesizer: Arc<dyn Synthesizer>,
        tts_config: &TtsConfig,
        audio_config: AudioConfig,
        state: Arc<SharedState>,
    ) -> Self {
        let voice = if tts_config.voice.is_empty() {
            let voices = synthesizer.voices();
            select_voice(&voices, FEMININE_VOICE_HINTS)
                .unwrap_or_else(|| synthesizer.default_voice())
        } else {
            tts_config.voice.clone()
        };
        info!(voice = %voice, "speech output voice selected");
        Self {
            synthesizer,
            voice,
            audio_config,
            state,
        }
    }

    /// Returns the selected voice id.
    #[must_use]
    pub fn voice(&self) -> &str {
        &self.voice
    }
}

#[async_trait]
impl Voice for SpeechOutput {
    async fn speak(&self, text: &str) {
        self.state.set_speaking(true);

        let synthesized = self.synthesizer.synthesize(text, &self.voice).await;
        match synthesized {
            Ok((samples, sample_rate)) => {
                let audio_config = self.audio_config.clone();
                let played = tokio::task::spawn_blocking(move || {
                    let mut sink = PlaybackSink::open(&audio_config)?;
                    sink.play(&samples, sample_rate)
                })
                .await;
                match played {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!(error = %e, "audio playback failed"),
                    Err(e) => warn!(error = %e, "playback task panicked"),
                }
            }
            Err(e) => warn!(error = %e, "speech synthesis failed"),
        }

        self.state.set_speaking(false);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    fn voice(id: &str, name: &str) -> VoiceInfo {
        VoiceInfo {
            id: id.to_owned(),
            name: name.to_owned(),
        }
    }

    #[test]
    fn select_voice_matches_case_insensitive_substring() {
        let voices = vec![
            voice("v1", "Microsoft David Desktop"),
            voice("v2", "Microsoft Zira Desktop"),
        ];
        assert_eq!(
            select_voice(&voices, FEMININE_VOICE_HINTS),
            Some("v2".to_owned())
        );
    }

    #[test]
    fn select_voice_first_match_wins() {
        let voices = vec![voice("nova", "Nova"), voice("shimmer", "Shimmer")];
        assert_eq!(
            select_voice(&voices, FEMININE_VOICE_HINTS),
            Some("nova".to_owned())
        );
    }

    #[test]
    fn select_voice_none_when_no_hint_matches() {
        let voices = vec![voice("v1", "Baritone"), voice("v2", "Bass")];
        assert_eq!(select_voice(&voices, FEMININE_VOICE_HINTS), None);
    }

    #[test]
    fn select_voice_empty_list_is_none() {
        assert_eq!(select_voice(&[], FEMININE_VOICE_HINTS), None);
    }

    struct FixedRoster {
        roster: Vec<VoiceInfo>,
    }

    #[async_trait]
    impl Synthesizer for FixedRoster {
        async fn synthesize(&self, _text: &str, _voice: &str) -> Result<(Vec<f32>, u32)> {
            Ok((vec![0.0], 24_000))
        }

        fn voices(&self) -> Vec<VoiceInfo> {
            self.roster.clone()
        }

        fn default_voice(&self) -> String {
            "engine-default".to_owned()
        }
    }

    fn output_with(roster: Vec<VoiceInfo>, configured: &str) -> SpeechOutput {
        let tts_config = TtsConfig {
            voice: configured.to_owned(),
            ..TtsConfig::default()
        };
        SpeechOutput::new(
            Arc::new(FixedRoster { roster }),
            &tts_config,
            AudioConfig::default(),
            Arc::new(SharedState::new()),
        )
    }

    #[test]
    fn configured_voice_wins_over_hints() {
        let output = output_with(vec![voice("v2", "Microsoft Zira Desktop")], "onyx");
        assert_eq!(output.voice(), "onyx");
    }

    #[test]
    fn hint_match_is_chosen_when_unconfigured() {
        let output = output_with(
            vec![
                voice("v1", "Microsoft David Desktop"),
                voice("v2", "Microsoft Zira Desktop"),
            ],
            "",
        );
        assert_eq!(output.voice(), "v2");
    }

    #[test]
    fn engine_default_is_the_fallback() {
        let output = output_with(vec![voice("v1", "Baritone")], "");
        assert_eq!(output.voice(), "engine-default");
    }
}
