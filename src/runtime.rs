//! Ollama CLI wrapper.
//!
//! Probe, pull and run are child-process invocations of the `ollama` binary;
//! there is no HTTP API usage here. All calls are behind [`RuntimeControl`]
//! so the startup sequencer and the bridge are testable without ollama
//! installed.

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::RuntimeConfig;
use crate::error::{AssistantError, Result};

/// Control surface over the local model runtime.
#[async_trait]
pub trait RuntimeControl: Send + Sync {
    /// Returns true when the runtime binary exists and answers a health
    /// invocation.
    async fn probe(&self) -> bool;

    /// Fetches the model, blocking until the pull completes.
    async fn pull(&self, model: &str) -> Result<()>;

    /// Runs one generation: prompt on stdin, full stdout as the reply.
    async fn run(&self, model: &str, prompt: &str) -> Result<String>;

    /// Opens the runtime download page in the default browser.
    fn open_download_page(&self);
}

/// The real ollama CLI.
pub struct OllamaRuntime {
    binary: String,
    download_url: String,
}

impl OllamaRuntime {
    /// Creates a wrapper from config.
    #[must_use]
    pub fn new(config: &RuntimeConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            download_url: config.download_url.clone(),
        }
    }
}

#[async_trait]
impl RuntimeControl for OllamaRuntime {
    async fn probe(&self) -> bool {
        let path = match which::which(&self.binary) {
            Ok(path) => path,
            Err(_) => {
                debug!(binary = %self.binary, "runtime binary not on PATH");
                return false;
            }
        };

        match Command::new(&path).arg("--version").output().await {
            Ok(output) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout);
                info!(path = %path.display(), version = %version.trim(), "runtime found");
                true
            }
            Ok(output) => {
                warn!(status = %output.status, "runtime version check failed");
                false
            }
            Err(e) => {
                warn!(error = %e, "runtime version check could not launch");
                false
            }
        }
    }

    async fn pull(&self, model: &str) -> Result<()> {
        info!(model = %model, "pulling model");
        let output = Command::new(&self.binary)
            .args(["pull", model])
            .output()
            .await
            .map_err(|e| AssistantError::Runtime(format!("failed to launch pull: {e}")))?;

        if output.status.success() {
            info!(model = %model, "model pull complete");
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(AssistantError::Runtime(format!(
                "pull of '{model}' failed ({}): {}",
                output.status,
                stderr.trim()
            )))
        }
    }

    async fn run(&self, model: &str, prompt: &str) -> Result<String> {
        debug!(model = %model, prompt_len = prompt.len(), "running generation");
        let mut child = Command::new(&self.binary)
            .args(["run", model])
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .spawn()
            .map_err(|e| AssistantError::Runtime(format!("failed to launch run: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .await
                .map_err(|e| AssistantError::Runtime(format!("failed to write prompt: {e}")))?;
            // Dropping stdin closes the pipe so the generation starts.
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| AssistantError::Runtime(format!("failed to read reply: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AssistantError::Runtime(format!(
                "generation failed ({}): {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn open_download_page(&self) {
        info!(url = %self.download_url, "opening download page");
        let result = if cfg!(target_os = "macos") {
            std::process::Command::new("open")
                .arg(&self.download_url)
                .spawn()
        } else if cfg!(target_os = "windows") {
            std::process::Command::new("cmd")
                .args(["/C", "start", "", &self.download_url])
                .spawn()
        } else {
            std::process::Command::new("xdg-open")
                .arg(&self.download_url)
                .spawn()
        };
        if let Err(e) = result {
            warn!(error = %e, url = %self.download_url, "could not open browser");
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[tokio::test]
    async fn probe_missing_binary_is_false() {
        let runtime = OllamaRuntime::new(&RuntimeConfig {
            binary: "definitely-not-a-real-binary-mira".to_owned(),
            model: "wizardlm2".to_owned(),
            download_url: "https://ollama.com/download/".to_owned(),
        });
        assert!(!runtime.probe().await);
    }

    #[tokio::test]
    async fn pull_with_missing_binary_errors() {
        let runtime = OllamaRuntime::new(&RuntimeConfig {
            binary: "definitely-not-a-real-binary-mira".to_owned(),
            model: "wizardlm2".to_owned(),
            download_url: "https://ollama.com/download/".to_owned(),
        });
        assert!(runtime.pull("wizardlm2").await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn run_reports_child_failure_as_error() {
        // `false run <model>` exits nonzero, standing in for a broken runtime.
        let runtime = OllamaRuntime::new(&RuntimeConfig {
            binary: "false".to_owned(),
            model: "wizardlm2".to_owned(),
            download_url: "https://ollama.com/download/".to_owned(),
        });
        assert!(runtime.run("wizardlm2", "hello").await.is_err());
    }

}
