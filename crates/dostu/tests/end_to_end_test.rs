use std::sync::Arc;

use dostu::prelude::*;
use dostu::DEFAULT_ERROR_MESSAGE;

async fn coordinator(data_dir: &std::path::Path, base_url: String) -> SessionCoordinator {
    let store = Arc::new(FileStore::open(data_dir).await.unwrap());
    let client = Arc::new(HttpExchangeClient::new(&EndpointConfig::new(base_url, "e2e-token")).unwrap());

    SessionCoordinator::builder()
        .store(store)
        .client(client)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_conversation_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/yoldostu/chat")
        .match_header("authorization", "Bearer e2e-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status":"success","data":{"response":"Sürət həddi 60 km/saatdır."}}"#)
        .create_async()
        .await;

    let session_id = {
        let mut first = coordinator(dir.path(), server.url()).await;
        let session = first.initialize().await;
        assert_eq!(session.title, dostu::DEFAULT_SESSION_TITLE);

        assert_eq!(first.send_message("Şəhərdə sürət həddi nədir?").await, SendOutcome::Succeeded);
        first.active_session_id().unwrap().to_string()
    };
    mock.assert_async().await;

    let mut second = coordinator(dir.path(), server.url()).await;
    let restored = second.initialize().await;

    assert_eq!(restored.id, session_id);
    assert_eq!(restored.messages.len(), 3);
    assert_eq!(restored.title, "Şəhərdə sürət həddi nədir?");
    assert_eq!(restored.messages[2].content, "Sürət həddi 60 km/saatdır.");
}

#[tokio::test]
async fn test_server_error_then_retry() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new_async().await;
    let failing = server
        .mock("POST", "/yoldostu/chat")
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let mut coordinator = coordinator(dir.path(), server.url()).await;
    coordinator.initialize().await;

    assert_eq!(coordinator.send_message("Cərimə").await, SendOutcome::Failed);
    assert_eq!(coordinator.messages()[2].content, DEFAULT_ERROR_MESSAGE);
    assert!(coordinator.messages()[2].is_error);
    failing.assert_async().await;
    failing.remove_async().await;

    server
        .mock("POST", "/yoldostu/chat")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status":"success","data":{"response":"Cərimə 40 manatdır."}}"#)
        .create_async()
        .await;

    assert_eq!(coordinator.retry_last().await, SendOutcome::Succeeded);
    assert_eq!(coordinator.messages().len(), 3);
    assert_eq!(coordinator.messages()[2].content, "Cərimə 40 manatdır.");
    assert!(!coordinator.messages()[2].is_error);
}
