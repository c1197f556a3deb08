//! End-to-end chat tests against a mock chat function.

use calmroom_core::chat::{RejectReason, DEFAULT_APOLOGY, DEFAULT_GREETING};
use calmroom_core::{BackendConfig, ChatMessage, ChatSession, HttpChatService, Role, SendOutcome};
use mockito::Matcher;

fn frame(content: &str) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({ "choices": [{ "delta": { "content": content } }] })
    )
}

fn service(server: &mockito::Server) -> HttpChatService {
    let backend = BackendConfig::new(server.url(), "publishable-key");
    HttpChatService::new(backend.function_url("wellness-chat"), backend.anon_key)
}

#[tokio::test]
async fn streamed_fragments_become_one_reply() {
    let mut server = mockito::Server::new_async().await;
    let body = format!("{}{}data: {{broken\n\n{}data: [DONE]\n\n", frame("Hel"), frame("lo"), frame(""));
    let mock = server
        .mock("POST", "/functions/v1/wellness-chat")
        .match_header("authorization", "Bearer publishable-key")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "messages": [
                { "role": "assistant", "content": DEFAULT_GREETING },
                { "role": "user", "content": "I had a long day" }
            ]
        })))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(body)
        .create_async()
        .await;

    let session = ChatSession::new(service(&server));
    let mut live = String::new();
    let outcome = session
        .send_with("I had a long day", |delta| live.push_str(delta))
        .await;

    assert_eq!(outcome, SendOutcome::Replied("Hello".into()));
    assert_eq!(live, "Hello");
    let transcript = session.transcript();
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript.last().unwrap(), &ChatMessage::assistant("Hello"));
    assert!(!session.is_in_flight());
    mock.assert_async().await;
}

#[tokio::test]
async fn empty_send_makes_no_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let session = ChatSession::new(service(&server));
    assert_eq!(
        session.send("  ").await,
        SendOutcome::Rejected(RejectReason::EmptyMessage)
    );
    assert_eq!(session.transcript().len(), 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn server_error_appends_user_message_and_apology() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/functions/v1/wellness-chat")
        .with_status(502)
        .create_async()
        .await;

    let session = ChatSession::new(service(&server));
    let before = session.transcript().len();
    assert_eq!(session.send("are you there?").await, SendOutcome::Failed);

    let transcript = session.transcript();
    assert_eq!(transcript.len(), before + 2);
    let roles: Vec<Role> = transcript.messages().iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::Assistant, Role::User, Role::Assistant]);
    assert_eq!(transcript.last().unwrap().content, DEFAULT_APOLOGY);
    assert!(!session.is_in_flight());
}

#[tokio::test]
async fn unreachable_service_appends_apology() {
    // Nothing listens on port 9 locally.
    let session = ChatSession::new(HttpChatService::new("http://127.0.0.1:9/functions/v1/chat", "k"));
    assert_eq!(session.send("hello").await, SendOutcome::Failed);
    assert_eq!(session.transcript().len(), 3);
    assert!(!session.is_in_flight());
}
