//! mira - a desktop voice companion.
//!
//! Listens for a wake phrase, captures spoken requests, answers them with a
//! locally-running Ollama model and speaks the reply aloud, while a small
//! animated avatar mirrors what is happening.
//!
//! # Pipeline
//!
//! ```text
//! microphone -> vad -> recognition service -> conversation loop
//!                                                   |
//!                              ollama run <- prompt (persona + history)
//!                                                   |
//!                          speakers <- synthesis service <- reply
//! ```
//!
//! Three long-running tasks share one [`state::SharedState`]:
//!
//! - the startup sequencer probes and prepares the Ollama runtime, then
//!   opens the readiness gate exactly once;
//! - the conversation loop alternates between awaiting the wake phrase and
//!   conversing until the exit phrase;
//! - the presentation loop samples the shared state on a fixed tick and
//!   feeds a render sink.

#![warn(clippy::unwrap_used, clippy::expect_used)]

pub mod audio;
pub mod config;
pub mod conversation;
pub mod error;
pub mod history;
pub mod llm;
pub mod personality;
pub mod presentation;
pub mod runtime;
pub mod startup;
pub mod state;
pub mod stt;
pub mod tts;
pub mod vad;

pub use config::AssistantConfig;
pub use conversation::ConversationLoop;
pub use error::{AssistantError, Result};
pub use history::HistoryStore;
pub use llm::{Brain, OllamaBridge};
pub use presentation::{AvatarFrame, AvatarView, PresentationLoop, RenderSink};
pub use runtime::{OllamaRuntime, RuntimeControl};
pub use startup::StartupSequencer;
pub use state::SharedState;
pub use stt::{AudioSource, Listener, MicSource, SpeechInput, Utterance};
pub use tts::{SpeechOutput, Voice};
