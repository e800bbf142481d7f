//! Startup sequencer: prepare the model runtime, then open the gate.
//!
//! Runs exactly once per process. Readiness is set only after a successful
//! probe and pull; on any failure it stays false for the whole session and
//! the conversation loop never starts listening. There is no retry.

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info, warn};

use crate::runtime::RuntimeControl;
use crate::state::SharedState;

/// One-shot runtime preparation.
pub struct StartupSequencer {
    runtime: Arc<dyn RuntimeControl>,
    model: String,
    state: Arc<SharedState>,
}

impl StartupSequencer {
    /// Creates the sequencer.
    #[must_use]
    pub fn new(runtime: Arc<dyn RuntimeControl>, model: impl Into<String>, state: Arc<SharedState>) -> Self {
        Self {
            runtime,
            model: model.into(),
            state,
        }
    }

    /// Runs the sequence: probe, pull, mark ready.
    pub async fn run(&self) {
        self.state.set_status("Checking Ollama installation...");

        if !self.runtime.probe().await {
            error!("ollama not found");
            self.state.set_status("Ollama not found. Opening download page...");
            self.runtime.open_download_page();
            self.state
                .set_status("Please install Ollama and restart the app.");
            return;
        }

        self.state
            .set_status(format!("Pulling {} model...", self.model));
        let spinner = pull_spinner(&self.model);

        match self.runtime.pull(&self.model).await {
            Ok(()) => {
                spinner.finish_and_clear();
                self.state.mark_ready();
                self.state.set_status("Mira is ready! Starting talking...");
                info!(model = %self.model, "startup complete");
            }
            Err(e) => {
                spinner.finish_and_clear();
                warn!(error = %e, "model pull failed");
                self.state
                    .set_status("Failed to prepare model. Check your Ollama setup.");
            }
        }
    }
}

fn pull_spinner(model: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Pulling {model} model..."));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}
