//! Configuration types for the voice companion.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Audio capture/playback settings.
    pub audio: AudioConfig,
    /// Utterance endpointing settings.
    pub vad: VadConfig,
    /// Speech recognition service settings.
    pub recognizer: RecognizerConfig,
    /// Speech synthesis settings.
    pub tts: TtsConfig,
    /// External model runtime settings.
    pub runtime: RuntimeConfig,
    /// Wake/exit phrase settings.
    pub conversation: ConversationConfig,
    /// Conversation history settings.
    pub history: HistoryConfig,
    /// Avatar presentation settings.
    pub presentation: PresentationConfig,
}

/// Audio I/O configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Input sample rate in Hz.
    pub input_sample_rate: u32,
    /// Output sample rate in Hz.
    pub output_sample_rate: u32,
    /// Input device name (None = system default).
    pub input_device: Option<String>,
    /// Output device name (None = system default).
    pub output_device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            input_sample_rate: 16_000,
            output_sample_rate: 24_000,
            input_device: None,
            output_device: None,
        }
    }
}

/// Utterance endpointing configuration.
///
/// The detection threshold is not fixed: it is derived from a short
/// ambient-noise measurement at the start of every listen call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VadConfig {
    /// Multiplier applied to the measured ambient RMS to obtain the
    /// speech threshold.
    pub ambient_multiplier: f32,
    /// Lower bound for the speech threshold, for very quiet rooms.
    pub min_threshold: f32,
    /// Duration of the ambient-noise measurement in ms.
    pub calibration_ms: u32,
    /// Minimum silence duration in ms to end an utterance.
    pub min_silence_duration_ms: u32,
    /// Minimum speech duration in ms to consider an utterance valid.
    pub min_speech_duration_ms: u32,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            ambient_multiplier: 3.0,
            min_threshold: 0.01,
            calibration_ms: 500,
            min_silence_duration_ms: 1200,
            min_speech_duration_ms: 300,
        }
    }
}

/// Speech recognition service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// OpenAI-compatible transcription endpoint.
    pub endpoint: String,
    /// API key (empty = no auth header, e.g. a local whisper server).
    pub api_key: String,
    /// Model name sent with each request.
    pub model: String,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/audio/transcriptions".to_owned(),
            api_key: String::new(),
            model: "whisper-1".to_owned(),
        }
    }
}

/// Speech synthesis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// OpenAI-compatible speech endpoint.
    pub endpoint: String,
    /// API key (empty = no auth header).
    pub api_key: String,
    /// Synthesis model name.
    pub model: String,
    /// Voice id. Empty = pick automatically by voice-name hint.
    pub voice: String,
    /// Speech speed multiplier (0.5–2.0).
    pub speed: f32,
    /// PCM sample rate returned by the endpoint, in Hz.
    pub sample_rate: u32,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/audio/speech".to_owned(),
            api_key: String::new(),
            model: "tts-1".to_owned(),
            voice: String::new(),
            speed: 1.0,
            sample_rate: 24_000,
        }
    }
}

/// External model runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Runtime binary name or path.
    pub binary: String,
    /// Model identifier to pull at startup and run per turn.
    pub model: String,
    /// Page opened in the default browser when the runtime is missing.
    pub download_url: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            binary: "ollama".to_owned(),
            model: "wizardlm2".to_owned(),
            download_url: "https://ollama.com/download/".to_owned(),
        }
    }
}

/// Wake/exit phrase configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Phrase that activates the companion (case-insensitive, exact).
    pub wake_phrase: String,
    /// Phrase that ends a conversation and returns to wake listening.
    pub exit_phrase: String,
    /// Line spoken when the exit phrase is heard.
    pub farewell: String,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            wake_phrase: "hello".to_owned(),
            exit_phrase: "goodbye".to_owned(),
            farewell: "Goodbye! I'm here when you need me.".to_owned(),
        }
    }
}

/// Conversation history configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// History file path. None = `<data root>/chathistory.txt`.
    pub path: Option<PathBuf>,
}

impl HistoryConfig {
    /// Resolve the history file path against the data root.
    #[must_use]
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| data_root().join("chathistory.txt"))
    }
}

/// Avatar presentation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    /// Refresh tick in ms.
    pub tick_ms: u64,
    /// Number of frames in the idle animation cycle.
    pub idle_frame_count: usize,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            idle_frame_count: 8,
        }
    }
}

/// Returns the data root directory: `~/.mira`.
#[must_use]
pub fn data_root() -> PathBuf {
    if let Some(home) = dirs::home_dir() {
        home.join(".mira")
    } else {
        PathBuf::from("/tmp").join(".mira")
    }
}

impl AssistantConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::error::AssistantError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::AssistantError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/mira/config.toml`.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("mira").join("config.toml")
        } else if let Some(home) = dirs::home_dir() {
            home.join(".config").join("mira").join("config.toml")
        } else {
            PathBuf::from("/tmp/mira-config/config.toml")
        }
    }
}
