//! Conversation loop: the wake/converse state machine.
//!
//! Two states, alternating forever. `AwaitingWake` listens until the wake
//! phrase is heard as a whole utterance; `Conversing` relays utterances to
//! the model and speaks replies until the exit phrase. The loop never
//! terminates the process; "goodbye" only drops back to wake listening.

use std::sync::Arc;

use tracing::{debug, info};

use crate::llm::Brain;
use crate::state::SharedState;
use crate::stt::{Listener, Utterance};
use crate::tts::Voice;

/// Whole-utterance, case-insensitive phrase comparison.
///
/// "hello there" does not match "hello"; embedded wake words do not wake.
/// Lowercasing is Unicode-aware so configured non-ASCII phrases match.
#[must_use]
pub fn phrase_matches(heard: &str, phrase: &str) -> bool {
    heard.trim().to_lowercase() == phrase.trim().to_lowercase()
}

/// The wake/converse loop.
pub struct ConversationLoop<L, B, V> {
    listener: L,
    brain: B,
    voice: V,
    state: Arc<SharedState>,
    wake_phrase: String,
    exit_phrase: String,
    farewell: String,
}

impl<L: Listener, B: Brain, V: Voice> ConversationLoop<L, B, V> {
    /// Creates the loop.
    #[must_use]
    pub fn new(
        listener: L,
        brain: B,
        voice: V,
        state: Arc<SharedState>,
        wake_phrase: impl Into<String>,
        exit_phrase: impl Into<String>,
        farewell: impl Into<String>,
    ) -> Self {
        Self {
            listener,
            brain,
            voice,
            state,
            wake_phrase: wake_phrase.into(),
            exit_phrase: exit_phrase.into(),
            farewell: farewell.into(),
        }
    }

    /// Runs forever: waits for readiness once, then alternates between the
    /// two states.
    pub async fn run(&self) {
        self.state.wait_ready().await;
        info!(wake = %self.wake_phrase, "conversation loop started");
        loop {
            self.await_wake().await;
            self.converse().await;
        }
    }

    /// Listens until the wake phrase is heard as a whole utterance.
    ///
    /// Sentinel utterances and non-matching speech are ignored.
    pub async fn await_wake(&self) {
        loop {
            if let Utterance::Heard(text) = self.listener.listen_once().await {
                if phrase_matches(&text, &self.wake_phrase) {
                    info!("wake phrase heard");
                    return;
                }
                debug!(text = %text, "ignored while awaiting wake");
            }
        }
    }

    /// Relays utterances until the exit phrase, then speaks the farewell.
    pub async fn converse(&self) {
        loop {
            match self.listener.listen_once().await {
                Utterance::Heard(text) => {
                    if phrase_matches(&text, &self.exit_phrase) {
                        info!("exit phrase heard");
                        self.voice.speak(&self.farewell).await;
                        return;
                    }
                    match self.brain.ask(text.trim()).await {
                        Some(reply) => self.voice.speak(&reply).await,
                        None => debug!("no reply to speak"),
                    }
                }
                Utterance::Unintelligible | Utterance::ServiceError => {
                    // Placeholder already shown by the input adapter.
                }
            }
        }
    }
}
