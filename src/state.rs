//! Shared pipeline state.
//!
//! One `SharedState` is created at startup and passed by `Arc` to the three
//! long-running tasks. Every slot has exactly one writer: the startup
//! sequencer owns readiness and status, the speech input adapter owns the
//! heard text and listening indicator, the speech output adapter owns the
//! speaking flag. The presentation loop only reads.

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

/// Shared flags and status slots for the pipeline tasks.
#[derive(Debug)]
pub struct SharedState {
    ready: watch::Sender<bool>,
    speaking: AtomicBool,
    status: watch::Sender<String>,
    heard: watch::Sender<String>,
    listening: watch::Sender<bool>,
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedState {
    /// Creates a fresh state: not ready, not speaking, empty status slots.
    #[must_use]
    pub fn new() -> Self {
        let (ready, _) = watch::channel(false);
        let (status, _) = watch::channel(String::new());
        let (heard, _) = watch::channel(String::new());
        let (listening, _) = watch::channel(false);
        Self {
            ready,
            speaking: AtomicBool::new(false),
            status,
            heard,
            listening,
        }
    }

    /// Marks the runtime as ready. Called once by the startup sequencer.
    pub fn mark_ready(&self) {
        self.ready.send_replace(true);
    }

    /// Returns whether the runtime is ready.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// Waits until the readiness flag becomes true.
    ///
    /// Returns immediately if already ready. If the startup sequencer never
    /// sets readiness (runtime missing, pull failed) this pends forever,
    /// which keeps the conversation gate closed for the session.
    pub async fn wait_ready(&self) {
        let mut rx = self.ready.subscribe();
        // wait_for errors only when the sender is dropped, and SharedState
        // owns the sender for its whole lifetime.
        let _ = rx.wait_for(|ready| *ready).await;
    }

    /// Sets the speaking flag. Written only by the speech output adapter.
    pub fn set_speaking(&self, speaking: bool) {
        self.speaking.store(speaking, Ordering::Release);
    }

    /// Returns whether speech playback is in progress.
    #[must_use]
    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::Acquire)
    }

    /// Replaces the status line.
    pub fn set_status(&self, text: impl Into<String>) {
        self.status.send_replace(text.into());
    }

    /// Returns the current status line.
    #[must_use]
    pub fn status(&self) -> String {
        self.status.borrow().clone()
    }

    /// Replaces the last-heard text.
    pub fn set_heard(&self, text: impl Into<String>) {
        self.heard.send_replace(text.into());
    }

    /// Returns the last-heard text.
    #[must_use]
    pub fn heard(&self) -> String {
        self.heard.borrow().clone()
    }

    /// Sets the listening indicator.
    pub fn set_listening(&self, listening: bool) {
        self.listening.send_replace(listening);
    }

    /// Returns whether the microphone is currently capturing.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        *self.listening.borrow()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use std::sync::Arc;

    #[test]
    fn starts_not_ready_not_speaking() {
        let state = SharedState::new();
        assert!(!state.is_ready());
        assert!(!state.is_speaking());
        assert!(!state.is_listening());
        assert!(state.status().is_empty());
        assert!(state.heard().is_empty());
    }

    #[test]
    fn speaking_flag_round_trip() {
        let state = SharedState::new();
        state.set_speaking(true);
        assert!(state.is_speaking());
        state.set_speaking(false);
        assert!(!state.is_speaking());
    }

    #[test]
    fn status_slots_last_write_wins() {
        let state = SharedState::new();
        state.set_status("Checking Ollama installation...");
        state.set_status("Pulling wizardlm2 model...");
        assert_eq!(state.status(), "Pulling wizardlm2 model...");

        state.set_heard("hello");
        assert_eq!(state.heard(), "hello");

        state.set_listening(true);
        assert!(state.is_listening());
    }

    #[tokio::test]
    async fn wait_ready_returns_when_marked() {
        let state = Arc::new(SharedState::new());
        let waiter = {
            let state = Arc::clone(&state);
            tokio::spawn(async move {
                state.wait_ready().await;
            })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        state.mark_ready();
        waiter.await.expect("waiter task panicked");
        assert!(state.is_ready());
    }

    #[tokio::test]
    async fn wait_ready_returns_immediately_if_already_ready() {
        let state = SharedState::new();
        state.mark_ready();
        state.wait_ready().await;
    }

    #[test]
    fn mark_ready_is_idempotent() {
        let state = SharedState::new();
        state.mark_ready();
        state.mark_ready();
        assert!(state.is_ready());
    }
}
