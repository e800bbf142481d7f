//! End-to-end conversation scenarios with scripted speech adapters and a
//! mocked model runtime. Only the microphone and the HTTP services are
//! faked; history, prompt assembly and the loop itself are the real code.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use mira::conversation::ConversationLoop;
use mira::error::Result;
use mira::history::HistoryStore;
use mira::llm::OllamaBridge;
use mira::runtime::RuntimeControl;
use mira::state::SharedState;
use mira::stt::{Listener, Utterance};
use mira::tts::Voice;

struct ScriptedListener {
    utterances: Mutex<std::vec::IntoIter<Utterance>>,
}

impl ScriptedListener {
    fn new(utterances: Vec<Utterance>) -> Self {
        Self {
            utterances: Mutex::new(utterances.into_iter()),
        }
    }
}

#[async_trait]
impl Listener for ScriptedListener {
    async fn listen_once(&self) -> Utterance {
        self.utterances
            .lock()
            .expect("lock")
            .next()
            .expect("listener script exhausted")
    }
}

#[derive(Default)]
struct RecordingVoice {
    spoken: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Voice for RecordingVoice {
    async fn speak(&self, text: &str) {
        self.spoken.lock().expect("lock").push(text.to_owned());
    }
}

struct MockRuntime {
    reply: String,
    prompts: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl RuntimeControl for MockRuntime {
    async fn probe(&self) -> bool {
        true
    }

    async fn pull(&self, _model: &str) -> Result<()> {
        Ok(())
    }

    async fn run(&self, _model: &str, prompt: &str) -> Result<String> {
        self.prompts.lock().expect("lock").push(prompt.to_owned());
        Ok(self.reply.clone())
    }

    fn open_download_page(&self) {}
}

const PERSONA: &str = "You are a friendly companion.\n\n";
const FAREWELL: &str = "Goodbye! I'm here when you need me.";

fn heard(text: &str) -> Utterance {
    Utterance::Heard(text.to_owned())
}

struct Scenario {
    lp: ConversationLoop<ScriptedListener, OllamaBridge, RecordingVoice>,
    history: HistoryStore,
    prompts: Arc<Mutex<Vec<String>>>,
    spoken: Arc<Mutex<Vec<String>>>,
    _dir: tempfile::TempDir,
}

fn scenario(reply: &str, script: Vec<Utterance>) -> Scenario {
    let dir = tempfile::tempdir().expect("tempdir");
    let history = HistoryStore::new(dir.path().join("chathistory.txt"));

    let prompts = Arc::new(Mutex::new(Vec::new()));
    let runtime = Arc::new(MockRuntime {
        reply: reply.to_owned(),
        prompts: Arc::clone(&prompts),
    });
    let brain = OllamaBridge::new(
        runtime as Arc<dyn RuntimeControl>,
        "wizardlm2",
        PERSONA,
        history.clone(),
    );

    let voice = RecordingVoice::default();
    let spoken = Arc::clone(&voice.spoken);

    let state = Arc::new(SharedState::new());
    state.mark_ready();

    let lp = ConversationLoop::new(
        ScriptedListener::new(script),
        brain,
        voice,
        state,
        "hello",
        "goodbye",
        FAREWELL,
    );
    Scenario {
        lp,
        history,
        prompts,
        spoken,
        _dir: dir,
    }
}

#[tokio::test]
async fn first_exchange_with_empty_history() {
    let s = scenario(
        "Doing great!",
        vec![
            heard("hello there"),
            heard("hello"),
            heard("How are you?"),
            heard("goodbye"),
        ],
    );

    s.lp.await_wake().await;
    s.lp.converse().await;

    // Prompt was persona plus the new input, nothing else.
    let prompts = s.prompts.lock().expect("lock");
    assert_eq!(
        prompts.as_slice(),
        ["You are a friendly companion.\n\nUser: How are you?\nAssistant:"]
    );

    // History holds exactly the one exchange.
    assert_eq!(
        s.history.load(),
        "User: How are you?\nAssistant: Doing great!\n"
    );

    // Both the reply and the farewell were spoken, in order.
    assert_eq!(
        s.spoken.lock().expect("lock").as_slice(),
        ["Doing great!", FAREWELL]
    );
}

#[tokio::test]
async fn sentinel_utterances_never_reach_the_model() {
    let s = scenario(
        "unused",
        vec![
            Utterance::Unintelligible,
            Utterance::ServiceError,
            heard("goodbye"),
        ],
    );

    s.lp.converse().await;

    assert!(s.prompts.lock().expect("lock").is_empty());
    assert_eq!(s.history.load(), "");
    assert_eq!(s.spoken.lock().expect("lock").as_slice(), [FAREWELL]);
}

#[tokio::test]
async fn history_grows_across_turns_and_feeds_later_prompts() {
    let s = scenario(
        "Sure.",
        vec![heard("first question"), heard("second question"), heard("goodbye")],
    );

    s.lp.converse().await;

    let prompts = s.prompts.lock().expect("lock");
    assert_eq!(
        prompts[0],
        "You are a friendly companion.\n\nUser: first question\nAssistant:"
    );
    assert_eq!(
        prompts[1],
        "You are a friendly companion.\n\nUser: first question\nAssistant: Sure.\nUser: second question\nAssistant:"
    );
    assert_eq!(
        s.history.load(),
        "User: first question\nAssistant: Sure.\nUser: second question\nAssistant: Sure.\n"
    );
}

#[tokio::test]
async fn exit_phrase_is_case_insensitive_and_exact() {
    let s = scenario("Answering.", vec![heard("say goodbye please"), heard("GOODBYE")]);

    s.lp.converse().await;

    // "say goodbye please" is a normal question, not an exit.
    assert_eq!(s.prompts.lock().expect("lock").len(), 1);
    assert_eq!(
        s.spoken.lock().expect("lock").as_slice(),
        ["Answering.", FAREWELL]
    );
}

#[tokio::test]
async fn empty_model_reply_speaks_nothing_and_appends_nothing() {
    let s = scenario("   \n", vec![heard("anything"), heard("goodbye")]);

    s.lp.converse().await;

    assert_eq!(s.history.load(), "");
    assert_eq!(s.spoken.lock().expect("lock").as_slice(), [FAREWELL]);
}
