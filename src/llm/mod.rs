//! Language-model bridge.
//!
//! Turns one user utterance into one reply. The prompt is the persona
//! instruction, the entire conversation history, and the new input; nothing
//! is truncated, so prompts grow with the history file.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::history::HistoryStore;
use crate::runtime::RuntimeControl;

/// Assembles the full prompt for one generation.
#[must_use]
pub fn build_prompt(instruction: &str, history: &str, user_text: &str) -> String {
    format!("{instruction}{history}User: {user_text}\nAssistant:")
}

/// One question-and-answer exchange with the model.
#[async_trait]
pub trait Brain: Send + Sync {
    /// Asks the model. `None` means no usable reply; the caller simply
    /// skips its speak step.
    async fn ask(&self, user_text: &str) -> Option<String>;
}

/// Bridge from utterance text to an ollama generation.
pub struct OllamaBridge {
    runtime: Arc<dyn RuntimeControl>,
    model: String,
    instruction: String,
    history: HistoryStore,
}

impl OllamaBridge {
    /// Creates a bridge.
    #[must_use]
    pub fn new(
        runtime: Arc<dyn RuntimeControl>,
        model: impl Into<String>,
        instruction: impl Into<String>,
        history: HistoryStore,
    ) -> Self {
        Self {
            runtime,
            model: model.into(),
            instruction: instruction.into(),
            history,
        }
    }
}

#[async_trait]
impl Brain for OllamaBridge {
    async fn ask(&self, user_text: &str) -> Option<String> {
        let history = self.history.load();
        let prompt = build_prompt(&self.instruction, &history, user_text);

        let reply = match self.runtime.run(&self.model, &prompt).await {
            Ok(output) => output,
            Err(e) => {
                warn!(error = %e, "generation failed");
                return None;
            }
        };

        let reply = reply.trim();
        if reply.is_empty() {
            debug!("model returned empty reply");
            return None;
        }

        // A reply that cannot be persisted is still worth speaking.
        if let Err(e) = self.history.append(user_text, reply) {
            warn!(error = %e, "failed to append history");
        }
        Some(reply.to_owned())
    }
}
