//! Error types for the mira pipeline.

/// Top-level error type for the voice companion.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    /// Audio device or stream error.
    #[error("audio error: {0}")]
    Audio(String),

    /// Speech recognition service error.
    #[error("recognition error: {0}")]
    Stt(String),

    /// Speech synthesis error.
    #[error("synthesis error: {0}")]
    Tts(String),

    /// Model runtime invocation error (probe, pull, run).
    #[error("runtime error: {0}")]
    Runtime(String),

    /// Conversation history storage error.
    #[error("history error: {0}")]
    History(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AssistantError>;
