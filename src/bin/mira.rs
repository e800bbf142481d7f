//! Headless mira binary: wires the pipeline together and runs it.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use mira::config::{AssistantConfig, data_root};
use mira::conversation::ConversationLoop;
use mira::history::HistoryStore;
use mira::llm::OllamaBridge;
use mira::personality::load_persona;
use mira::presentation::{LogSink, PresentationLoop};
use mira::runtime::{OllamaRuntime, RuntimeControl};
use mira::startup::StartupSequencer;
use mira::state::SharedState;
use mira::stt::{AudioSource, CloudRecognizer, MicSource, Recognizer, SpeechInput};
use mira::tts::{CloudSynthesizer, SpeechOutput, Synthesizer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_dir = data_root().join("logs");
    std::fs::create_dir_all(&log_dir).context("creating log directory")?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, "mira.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();

    let config_path = AssistantConfig::default_config_path();
    let config = if config_path.exists() {
        info!(path = %config_path.display(), "loading config");
        AssistantConfig::from_file(&config_path).context("loading config")?
    } else {
        info!("no config file, using defaults");
        AssistantConfig::default()
    };

    let state = Arc::new(SharedState::new());
    let history = HistoryStore::new(config.history.resolved_path());
    let runtime: Arc<dyn RuntimeControl> = Arc::new(OllamaRuntime::new(&config.runtime));

    let source: Arc<dyn AudioSource> =
        Arc::new(MicSource::new(config.audio.clone(), config.vad.clone()));
    let recognizer: Arc<dyn Recognizer> = Arc::new(CloudRecognizer::new(&config.recognizer));
    let listener = SpeechInput::new(source, recognizer, Arc::clone(&state));

    let synthesizer: Arc<dyn Synthesizer> = Arc::new(CloudSynthesizer::new(&config.tts));
    let voice = SpeechOutput::new(
        synthesizer,
        &config.tts,
        config.audio.clone(),
        Arc::clone(&state),
    );

    let brain = OllamaBridge::new(
        Arc::clone(&runtime),
        config.runtime.model.clone(),
        load_persona(),
        history,
    );

    let startup = StartupSequencer::new(
        Arc::clone(&runtime),
        config.runtime.model.clone(),
        Arc::clone(&state),
    );
    tokio::spawn(async move {
        startup.run().await;
    });

    let conversation = ConversationLoop::new(
        listener,
        brain,
        voice,
        Arc::clone(&state),
        config.conversation.wake_phrase.clone(),
        config.conversation.exit_phrase.clone(),
        config.conversation.farewell.clone(),
    );
    tokio::spawn(async move {
        conversation.run().await;
    });

    info!("mira starting");
    PresentationLoop::new(state, &config.presentation)
        .run(LogSink::default())
        .await;
    Ok(())
}
