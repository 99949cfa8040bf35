use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dostu_cli::Repl;
use dostu_client::{ExchangeClient, ExchangeError, ExchangeReply, ExchangeRequest};
use dostu_persist::MemoryStore;
use dostu_session::SessionCoordinator;
use dostu_types::ChatConfig;

/// Fails the first `failures` calls, then echoes
#[derive(Default)]
struct FlakyEcho {
    failures: usize,
    calls: AtomicUsize,
}

#[async_trait]
impl ExchangeClient for FlakyEcho {
    async fn exchange(&self, request: ExchangeRequest) -> Result<ExchangeReply, ExchangeError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
            return Err(ExchangeError::EmptyReply);
        }
        Ok(ExchangeReply {
            text: format!("echo: {}", request.message),
            raw: serde_json::Value::Null,
        })
    }
}

async fn run_script(client: FlakyEcho, script: &str) -> (SessionCoordinator, String) {
    let coordinator = SessionCoordinator::builder()
        .store(Arc::new(MemoryStore::new()))
        .client(Arc::new(client))
        .config(
            ChatConfig::new()
                .with_default_title("New chat")
                .with_welcome_message("Welcome!")
                .with_error_message("Sorry!"),
        )
        .build()
        .unwrap();

    let mut repl = Repl::new(coordinator, script.as_bytes(), Vec::new());
    repl.run().await.unwrap();

    let (coordinator, output) = repl.into_parts();
    (coordinator, String::from_utf8(output).unwrap())
}

#[tokio::test]
async fn test_conversation_and_quit() {
    let (coordinator, output) = run_script(FlakyEcho::default(), "Salam\n\n/quit\nignored\n").await;

    assert!(output.starts_with("== New chat ==\ndostu> Welcome!"));
    assert!(output.contains("dostu> echo: Salam"));
    assert!(!output.contains("ignored"));

    let session = coordinator.active_session().unwrap();
    assert_eq!(session.title, "Salam");
    assert_eq!(session.messages.len(), 3);
}

#[tokio::test]
async fn test_failure_hint_and_retry() {
    let client = FlakyEcho {
        failures: 1,
        ..FlakyEcho::default()
    };
    let (coordinator, output) = run_script(client, "x\n/retry\n").await;

    assert!(output.contains("dostu (error)> Sorry!"));
    assert!(output.contains("Type /retry to try again (attempt 2/3)"));
    assert!(output.contains("dostu> echo: x"));

    let messages = coordinator.messages();
    assert_eq!(messages.len(), 3);
    assert!(!messages[2].is_error);
}

#[tokio::test]
async fn test_retry_with_nothing_to_retry() {
    let (_, output) = run_script(FlakyEcho::default(), "/retry\n").await;
    assert!(output.contains("Nothing to retry"));
}

#[tokio::test]
async fn test_history_open_by_position() {
    let script = "first topic\n/new\nsecond topic\n/history\n/open 2\n";
    let (coordinator, output) = run_script(FlakyEcho::default(), script).await;

    assert!(output.contains(" 1. second topic (1 messages, today)"));
    assert!(output.contains(" 2. first topic (1 messages, today)"));
    assert!(output.contains("== first topic =="));
    assert_eq!(coordinator.active_session().unwrap().title, "first topic");
}

#[tokio::test]
async fn test_search_and_delete() {
    let script = "parking fine\n/new\nspeed limit\n/search PARK\n/delete 1\n/history\n";
    let (coordinator, output) = run_script(FlakyEcho::default(), script).await;

    assert!(output.contains(" 1. parking fine"));
    assert!(output.contains("Chat deleted"));

    let history = coordinator.list_history().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].title, "speed limit");
}

#[tokio::test]
async fn test_deleting_active_chat_opens_fresh_one() {
    let script = "hello\n/history\n/delete 1\n";
    let (coordinator, output) = run_script(FlakyEcho::default(), script).await;

    assert!(output.contains("Chat deleted"));
    // The refresh after deletion creates and shows a new chat
    assert_eq!(output.matches("== New chat ==").count(), 2);

    let session = coordinator.active_session().unwrap();
    assert_eq!(session.messages.len(), 1);
    assert_eq!(coordinator.list_history().await.len(), 1);
}

#[tokio::test]
async fn test_unknown_command_and_missing_chat() {
    let (_, output) = run_script(FlakyEcho::default(), "/dance\n/open nope\n").await;
    assert!(output.contains("Unknown command: /dance"));
    assert!(output.contains("Chat not found: nope"));
}
