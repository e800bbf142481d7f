//! Append-only conversation history.
//!
//! Plain UTF-8 text, alternating `User:` and `Assistant:` lines. The file is
//! the literal prefix of every prompt, so the format never changes shape.
//! Growth is unbounded; prompts get longer as the history does.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{AssistantError, Result};

/// File-backed conversation history store.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// Creates a store backed by the given file. The file is created lazily
    /// on first append.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the full history text, or an empty string when the file does
    /// not exist yet. Other read failures are logged and also yield an empty
    /// string so a damaged history never blocks a conversation.
    #[must_use]
    pub fn load(&self) -> String {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read history, starting empty");
                String::new()
            }
        }
    }

    /// Appends one exchange as a two-line record and syncs it to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or written.
    pub fn append(&self, user: &str, assistant: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(format!("User: {user}\nAssistant: {assistant}\n").as_bytes())?;
        file.sync_all()
            .map_err(|e| AssistantError::History(format!("sync failed: {e}")))?;
        Ok(())
    }
}
