//! Presentation loop: avatar frame selection on a fixed tick.
//!
//! Every 100 ms the loop samples the shared state and emits an
//! [`AvatarView`] to a render sink. While the companion speaks, the talking
//! frame is shown and the idle cycle is paused; otherwise the idle frames
//! advance one per tick, wrapping. The loop only reads state and never
//! blocks the conversation or startup tasks.
//!
//! Asset decoding and widget layout stay on the sink side; a frame is just
//! an index for the sink to map to an image.

use std::sync::Arc;

use tokio::time::{Duration, MissedTickBehavior, interval};

use crate::config::PresentationConfig;
use crate::state::SharedState;

/// Which avatar frame to show this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarFrame {
    /// Idle animation frame at this index.
    Idle(usize),
    /// Mouth-open talking frame.
    Talking,
}

/// Snapshot handed to the render sink each tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarView {
    /// Frame to display.
    pub frame: AvatarFrame,
    /// Current status line (startup progress, readiness).
    pub status: String,
    /// Last-heard display text, already formatted. Empty until something
    /// was heard.
    pub heard: String,
    /// Whether the microphone is capturing.
    pub listening: bool,
}

/// Consumer of avatar views, one per tick.
pub trait RenderSink: Send {
    /// Renders one view.
    fn render(&mut self, view: &AvatarView);
}

/// Fixed-rate avatar state sampler.
pub struct PresentationLoop {
    state: Arc<SharedState>,
    tick: Duration,
    idle_frames: usize,
    frame_index: usize,
}

impl PresentationLoop {
    /// Creates the loop.
    #[must_use]
    pub fn new(state: Arc<SharedState>, config: &PresentationConfig) -> Self {
        Self {
            state,
            tick: Duration::from_millis(config.tick_ms),
            idle_frames: config.idle_frame_count.max(1),
            frame_index: 0,
        }
    }

    /// Computes the view for one tick and advances the idle cycle.
    ///
    /// The idle index does not advance while speaking, so the animation
    /// resumes where it paused.
    pub fn next_view(&mut self) -> AvatarView {
        let frame = if self.state.is_speaking() {
            AvatarFrame::Talking
        } else {
            let frame = AvatarFrame::Idle(self.frame_index);
            self.frame_index = (self.frame_index + 1) % self.idle_frames;
            frame
        };

        let heard_text = self.state.heard();
        let heard = if heard_text.is_empty() {
            String::new()
        } else {
            format!("Heard: {heard_text}")
        };

        AvatarView {
            frame,
            status: self.state.status(),
            heard,
            listening: self.state.is_listening(),
        }
    }

    /// Runs forever at the configured tick rate.
    pub async fn run(mut self, mut sink: impl RenderSink) {
        let mut ticker = interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let view = self.next_view();
            sink.render(&view);
        }
    }
}

/// Sink that logs view changes, used by the headless binary.
#[derive(Debug, Default)]
pub struct LogSink {
    last: Option<AvatarView>,
}

impl RenderSink for LogSink {
    fn render(&mut self, view: &AvatarView) {
        let talking = view.frame == AvatarFrame::Talking;
        // Idle-frame churn is uninteresting; log only status-level changes.
        let changed = match &self.last {
            Some(last) => {
                last.status != view.status
                    || last.heard != view.heard
                    || last.listening != view.listening
                    || (last.frame == AvatarFrame::Talking) != talking
            }
            None => true,
        };
        if changed {
            tracing::info!(
                status = %view.status,
                heard = %view.heard,
                listening = view.listening,
                talking,
                "avatar"
            );
        }
        self.last = Some(view.clone());
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    fn config(frames: usize) -> PresentationConfig {
        PresentationConfig {
            tick_ms: 100,
            idle_frame_count: frames,
        }
    }

    #[test]
    fn idle_frames_cycle_and_wrap() {
        let state = Arc::new(SharedState::new());
        let mut lp = PresentationLoop::new(Arc::clone(&state), &config(3));
        assert_eq!(lp.next_view().frame, AvatarFrame::Idle(0));
        assert_eq!(lp.next_view().frame, AvatarFrame::Idle(1));
        assert_eq!(lp.next_view().frame, AvatarFrame::Idle(2));
        assert_eq!(lp.next_view().frame, AvatarFrame::Idle(0));
    }

    #[test]
    fn speaking_shows_talking_and_pauses_the_cycle() {
        let state = Arc::new(SharedState::new());
        let mut lp = PresentationLoop::new(Arc::clone(&state), &config(4));
        assert_eq!(lp.next_view().frame, AvatarFrame::Idle(0));

        state.set_speaking(true);
        assert_eq!(lp.next_view().frame, AvatarFrame::Talking);
        assert_eq!(lp.next_view().frame, AvatarFrame::Talking);

        state.set_speaking(false);
        // Resumes where it paused.
        assert_eq!(lp.next_view().frame, AvatarFrame::Idle(1));
    }

    #[test]
    fn heard_text_is_formatted_only_when_present() {
        let state = Arc::new(SharedState::new());
        let mut lp = PresentationLoop::new(Arc::clone(&state), &config(2));
        assert_eq!(lp.next_view().heard, "");

        state.set_heard("hello");
        assert_eq!(lp.next_view().heard, "Heard: hello");

        state.set_heard("[Could not understand you]");
        assert_eq!(lp.next_view().heard, "Heard: [Could not understand you]");
    }

    #[test]
    fn view_mirrors_status_and_listening() {
        let state = Arc::new(SharedState::new());
        let mut lp = PresentationLoop::new(Arc::clone(&state), &config(2));

        state.set_status("Pulling wizardlm2 model...");
        state.set_listening(true);
        let view = lp.next_view();
        assert_eq!(view.status, "Pulling wizardlm2 model...");
        assert!(view.listening);
    }

    #[test]
    fn zero_frame_config_is_clamped() {
        let state = Arc::new(SharedState::new());
        let mut lp = PresentationLoop::new(state, &config(0));
        assert_eq!(lp.next_view().frame, AvatarFrame::Idle(0));
        assert_eq!(lp.next_view().frame, AvatarFrame::Idle(0));
    }
}
