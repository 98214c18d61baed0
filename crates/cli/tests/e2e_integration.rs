//! End-to-end integration tests for FileChat.
//!
//! These tests exercise the full pipeline from a user turn to the provider
//! request: project scan, file selection, continuity across turns, budget
//! packing, history bookkeeping and the retry wrapper.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use filechat_agent::context::packer::{BUDGET_NOTICE, FRAMING_OVERHEAD, UNREADABLE_PLACEHOLDER};
use filechat_agent::{ChatSession, ContextBuilder, ContextLimits, ProjectIndex, ScanOptions};
use filechat_config::{AppConfig, ContextConfig};
use filechat_core::error::ProviderError;
use filechat_core::message::{Message, Role};
use filechat_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use filechat_providers::{RetryPolicy, RetryProvider};

// ── Mock Provider ────────────────────────────────────────────────────────

/// A mock provider that returns scripted outcomes in sequence and records
/// every request it receives.
struct ScriptedProvider {
    outcomes: std::sync::Mutex<Vec<Result<String, ProviderError>>>,
    requests: std::sync::Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    fn new(outcomes: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            outcomes: std::sync::Mutex::new(outcomes),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    fn replies(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn request(&self, n: usize) -> ProviderRequest {
        self.requests.lock().unwrap()[n].clone()
    }

    /// Content of the final (current) user message of request `n`.
    fn sent_text(&self, n: usize) -> String {
        let request = self.request(n);
        let last = request.messages.last().unwrap();
        assert_eq!(last.role, Role::User);
        last.content.clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let mut outcomes = self.outcomes.lock().unwrap();
        if outcomes.is_empty() {
            panic!("ScriptedProvider exhausted after {} calls", self.calls());
        }
        let text = outcomes.remove(0)?;
        Ok(ProviderResponse {
            message: Message::assistant(text),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: "mock".into(),
        })
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn sample_project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "src/parser.ts",
        "export function parse(input: string) { return input.split(' '); }",
    );
    write(
        dir.path(),
        "src/parser.test.ts",
        "it('splits words', () => expect(parse('a b')).toEqual(['a', 'b']));",
    );
    write(dir.path(), "README.md", "# Sample\nA tiny parser project.");
    write(dir.path(), "node_modules/lib/index.js", "module.exports = {};");
    write(dir.path(), "package-lock.json", "{}");
    dir
}

fn session_for(root: &Path, provider: Arc<dyn Provider>) -> ChatSession {
    let context = ContextBuilder::scan(root, &ContextConfig::default()).unwrap();
    ChatSession::new(provider, "mock-model", context).with_system_prompt("You are FileChat.")
}

// ── E2E: Context selection across turns ──────────────────────────────────

#[tokio::test]
async fn e2e_named_file_is_attached_ahead_of_message() {
    let dir = sample_project();
    let provider = Arc::new(ScriptedProvider::replies(&["It splits on spaces."]));
    let mut session = session_for(dir.path(), provider.clone());

    let outcome = session.send("Explain parser.ts").await.unwrap();
    assert_eq!(outcome.reply, "It splits on spaces.");
    assert_eq!(outcome.context_files, vec!["src/parser.ts"]);

    let request = provider.request(0);
    assert_eq!(request.model, "mock-model");
    assert_eq!(request.messages[0].role, Role::System);
    assert_eq!(request.messages[0].content, "You are FileChat.");

    let sent = provider.sent_text(0);
    assert!(sent.contains("=== PROJECT CONTEXT ==="));
    assert!(sent.contains("FILE: src/parser.ts"));
    assert!(sent.contains("export function parse"));
    assert!(sent.ends_with("Explain parser.ts"));
}

#[tokio::test]
async fn e2e_follow_up_keeps_earlier_file_in_context() {
    let dir = sample_project();
    let provider = Arc::new(ScriptedProvider::replies(&["It parses.", "There is one test."]));
    let mut session = session_for(dir.path(), provider.clone());

    session.send("Explain parser.ts").await.unwrap();
    let outcome = session.send("what about tests?").await.unwrap();

    // current-message candidates first, then the file carried from turn one
    assert_eq!(
        outcome.context_files,
        vec!["src/parser.test.ts", "src/parser.ts"]
    );
    let sent = provider.sent_text(1);
    let test_pos = sent.find("FILE: src/parser.test.ts").unwrap();
    let src_pos = sent.find("FILE: src/parser.ts").unwrap();
    assert!(test_pos < src_pos);
}

#[tokio::test]
async fn e2e_history_holds_unprefixed_messages() {
    let dir = sample_project();
    let provider = Arc::new(ScriptedProvider::replies(&["one", "two"]));
    let mut session = session_for(dir.path(), provider.clone());

    session.send("Explain parser.ts").await.unwrap();
    session.send("Summarise the readme").await.unwrap();

    // second request: system, user#1 (plain), assistant#1, user#2 (prefixed)
    let request = provider.request(1);
    assert_eq!(request.messages.len(), 4);
    assert_eq!(request.messages[1].content, "Explain parser.ts");
    assert_eq!(request.messages[2].content, "one");
    assert!(request.messages[3].content.contains("FILE: README.md"));

    let history = session.history();
    assert_eq!(history.len(), 4);
    assert!(history.iter().all(|m| !m.content.contains("PROJECT CONTEXT")));
}

#[tokio::test]
async fn e2e_unrelated_message_is_sent_verbatim() {
    let dir = sample_project();
    let provider = Arc::new(ScriptedProvider::replies(&["Hi!"]));
    let mut session = session_for(dir.path(), provider.clone());

    let outcome = session.send("hello there").await.unwrap();
    assert!(outcome.context_files.is_empty());
    assert_eq!(provider.sent_text(0), "hello there");
}

#[tokio::test]
async fn e2e_ignored_paths_never_reach_the_model() {
    let dir = sample_project();
    let provider = Arc::new(ScriptedProvider::replies(&["ok"]));
    let mut session = session_for(dir.path(), provider.clone());

    // "index." would match node_modules/lib/index.js if it were indexed
    session.send("where is the main entry point, index.js?").await.unwrap();
    let sent = provider.sent_text(0);
    assert!(!sent.contains("node_modules"));
    assert!(!sent.contains("package-lock.json"));
}

// ── E2E: Budget and read failures ────────────────────────────────────────

#[tokio::test]
async fn e2e_budget_is_enforced_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let body = "let value = 42;\n".repeat(120);
    for name in ["alpha.rs", "beta.rs", "gamma.rs", "delta.rs", "omega.rs"] {
        write(dir.path(), name, &body);
    }

    let index = ProjectIndex::scan(dir.path(), &ScanOptions::default()).unwrap();
    let limits = ContextLimits {
        budget_chars: 5000,
        ..ContextLimits::default()
    };
    let provider = Arc::new(ScriptedProvider::replies(&["ok"]));
    let mut session = ChatSession::new(provider.clone(), "m", ContextBuilder::new(index, limits));

    let text = "compare alpha.rs beta.rs gamma.rs delta.rs omega.rs";
    session.send(text).await.unwrap();

    let sent = provider.sent_text(0);
    assert!(sent.contains(BUDGET_NOTICE));
    assert!(sent.contains("FILE: alpha.rs"));
    assert!(!sent.contains("FILE: omega.rs"));
    let context_len = sent.chars().count() - text.chars().count();
    assert!(context_len <= 5000 + FRAMING_OVERHEAD);
}

#[tokio::test]
async fn e2e_file_deleted_after_scan_gets_placeholder() {
    let dir = sample_project();
    let provider = Arc::new(ScriptedProvider::replies(&["ok"]));
    let mut session = session_for(dir.path(), provider.clone());

    std::fs::remove_file(dir.path().join("src/parser.ts")).unwrap();
    session.send("Explain parser.ts").await.unwrap();

    let sent = provider.sent_text(0);
    assert!(sent.contains("FILE: src/parser.ts"));
    assert!(sent.contains(UNREADABLE_PLACEHOLDER));
}

#[tokio::test]
async fn e2e_context_settings_come_from_config_file() {
    let project = sample_project();
    let config_dir = tempfile::tempdir().unwrap();
    let config_path = config_dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        "default_model = \"test-model\"\n\n[context]\nenabled = false\nhistory_limit = 2\n",
    )
    .unwrap();

    let config = AppConfig::load_from(&config_path).unwrap();
    let context = ContextBuilder::scan(project.path(), &config.context).unwrap();
    let provider = Arc::new(ScriptedProvider::replies(&["a", "b"]));
    let mut session = ChatSession::from_config(provider.clone(), &config, context);

    session.send("Explain parser.ts").await.unwrap();
    session.send("and again").await.unwrap();

    assert_eq!(provider.request(0).model, "test-model");
    assert!(!provider.sent_text(0).contains("FILE:"));
    assert_eq!(session.history().len(), 2);
    assert_eq!(session.history()[0].content, "and again");
}

// ── E2E: Failures and retries ────────────────────────────────────────────

#[tokio::test]
async fn e2e_failed_turn_can_be_retried() {
    let dir = sample_project();
    let provider = Arc::new(ScriptedProvider::new(vec![
        Err(ProviderError::AuthenticationFailed("bad key".into())),
        Ok("Recovered.".into()),
    ]));
    let mut session = session_for(dir.path(), provider.clone());

    assert!(session.send("Explain parser.ts").await.is_err());
    assert!(session.history().is_empty());

    let outcome = session.send("Explain parser.ts").await.unwrap();
    assert_eq!(outcome.reply, "Recovered.");
    assert_eq!(session.history().len(), 2);
    // the retried request carries no trace of the failed attempt
    assert_eq!(provider.request(1).messages.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn e2e_rate_limit_is_retried_transparently() {
    let dir = sample_project();
    let scripted = Arc::new(ScriptedProvider::new(vec![
        Err(ProviderError::RateLimited { retry_after_secs: 2 }),
        Err(ProviderError::Network("reset".into())),
        Ok("Third time lucky.".into()),
    ]));
    let policy = RetryPolicy {
        max_retries: 3,
        base_delay: Duration::from_millis(500),
        timeout: Duration::from_secs(30),
    };
    let provider = Arc::new(RetryProvider::new(scripted.clone(), policy));
    let mut session = session_for(dir.path(), provider);

    let outcome = session.send("Explain parser.ts").await.unwrap();
    assert_eq!(outcome.reply, "Third time lucky.");
    assert_eq!(scripted.calls(), 3);
    // every attempt sent the same prefixed message
    assert_eq!(scripted.sent_text(0), scripted.sent_text(2));
    assert_eq!(session.history().len(), 2);
}
