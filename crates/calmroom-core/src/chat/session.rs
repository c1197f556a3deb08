//! Chat view state: the transcript plus the one-slot send lock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::StreamExt;

use super::service::ChatService;
use super::transcript::{ChatMessage, ChatTranscript};

/// Greeting the transcript is seeded with.
pub const DEFAULT_GREETING: &str = "Hi there! I'm your wellness companion. How are you feeling today? I'm here to listen and support you. 💚";

/// Reply substituted when the chat service cannot be reached.
pub const DEFAULT_APOLOGY: &str =
    "I'm having trouble connecting right now. Please try again in a moment. 💙";

/// Why a send was not attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptyMessage,
    SendInFlight,
}

/// Result of [`ChatSession::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing was appended and no request was made.
    Rejected(RejectReason),
    /// The reply streamed in completely.
    Replied(String),
    /// The service failed; the apology was appended instead.
    Failed,
}

/// Clears the in-flight flag when the send finishes, however it finishes.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One chat conversation against a [`ChatService`].
pub struct ChatSession<S> {
    service: S,
    transcript: Mutex<ChatTranscript>,
    in_flight: AtomicBool,
    apology: String,
}

impl<S: ChatService> ChatSession<S> {
    pub fn new(service: S) -> Self {
        Self::with_messages(service, DEFAULT_GREETING, DEFAULT_APOLOGY)
    }

    pub fn with_messages(
        service: S,
        greeting: impl Into<String>,
        apology: impl Into<String>,
    ) -> Self {
        Self {
            service,
            transcript: Mutex::new(ChatTranscript::seeded(greeting)),
            in_flight: AtomicBool::new(false),
            apology: apology.into(),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Copy of the conversation so far.
    pub fn transcript(&self) -> ChatTranscript {
        self.lock().clone()
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub async fn send(&self, text: &str) -> SendOutcome {
        self.send_with(text, |_| {}).await
    }

    /// Send `text` and stream the reply into the transcript.
    ///
    /// `on_delta` is called with each fragment as it arrives.
    pub async fn send_with<F>(&self, text: &str, mut on_delta: F) -> SendOutcome
    where
        F: FnMut(&str),
    {
        if text.trim().is_empty() {
            return SendOutcome::Rejected(RejectReason::EmptyMessage);
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("chat send rejected: reply still streaming");
            return SendOutcome::Rejected(RejectReason::SendInFlight);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let request = {
            let mut transcript = self.lock();
            transcript.push(ChatMessage::user(text));
            transcript.messages().to_vec()
        };

        let mut deltas = match self.service.stream_reply(&request).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!(error = %e, "chat request failed");
                self.lock().push(ChatMessage::assistant(self.apology.clone()));
                return SendOutcome::Failed;
            }
        };

        let handle = self.lock().begin_reply();
        while let Some(delta) = deltas.next().await {
            match delta {
                Ok(fragment) => {
                    self.lock().append_delta(&handle, &fragment);
                    on_delta(&fragment);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "chat stream interrupted");
                    let mut transcript = self.lock();
                    transcript.finish_reply(handle);
                    transcript.push(ChatMessage::assistant(self.apology.clone()));
                    return SendOutcome::Failed;
                }
            }
        }

        let reply = self.lock().finish_reply(handle).content.clone();
        SendOutcome::Replied(reply)
    }

    fn lock(&self) -> MutexGuard<'_, ChatTranscript> {
        self.transcript.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::service::DeltaStream;
    use crate::chat::transcript::Role;
    use crate::error::ChatError;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    enum Script {
        Fragments(Vec<&'static str>),
        RefuseConnection,
        CutOffAfter(Vec<&'static str>),
        WaitFor(Arc<tokio::sync::Notify>),
    }

    struct FakeService {
        script: Script,
        calls: AtomicUsize,
        last_request: Mutex<Vec<ChatMessage>>,
    }

    impl FakeService {
        fn new(script: Script) -> Self {
            Self {
                script,
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatService for FakeService {
        async fn stream_reply(&self, messages: &[ChatMessage]) -> Result<DeltaStream, ChatError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = messages.to_vec();
            match &self.script {
                Script::Fragments(parts) => {
                    let items: Vec<Result<String, ChatError>> =
                        parts.iter().map(|p| Ok(p.to_string())).collect();
                    Ok(Box::pin(futures::stream::iter(items)))
                }
                Script::RefuseConnection => Err(ChatError::Status { status: 503 }),
                Script::CutOffAfter(parts) => {
                    let mut items: Vec<Result<String, ChatError>> =
                        parts.iter().map(|p| Ok(p.to_string())).collect();
                    items.push(Err(ChatError::Stream("connection reset".into())));
                    Ok(Box::pin(futures::stream::iter(items)))
                }
                Script::WaitFor(notify) => {
                    notify.notified().await;
                    Ok(Box::pin(futures::stream::iter(vec![Ok("done".to_string())])))
                }
            }
        }
    }

    #[tokio::test]
    async fn empty_message_is_rejected_without_request() {
        let session = ChatSession::new(FakeService::new(Script::Fragments(vec!["x"])));
        assert_eq!(
            session.send("   \n").await,
            SendOutcome::Rejected(RejectReason::EmptyMessage)
        );
        assert_eq!(session.send("").await, SendOutcome::Rejected(RejectReason::EmptyMessage));
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.service().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fragments_build_the_reply() {
        let session = ChatSession::new(FakeService::new(Script::Fragments(vec!["Hel", "lo"])));
        let mut seen = Vec::new();
        let outcome = session
            .send_with("I feel okay", |d| seen.push(d.to_string()))
            .await;

        assert_eq!(outcome, SendOutcome::Replied("Hello".into()));
        assert_eq!(seen, vec!["Hel", "lo"]);
        let transcript = session.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.messages()[1], ChatMessage::user("I feel okay"));
        assert_eq!(transcript.last().unwrap(), &ChatMessage::assistant("Hello"));
        assert!(!session.is_in_flight());
    }

    #[tokio::test]
    async fn request_carries_full_transcript() {
        let session = ChatSession::new(FakeService::new(Script::Fragments(vec!["ok"])));
        session.send("first").await;
        session.send("second").await;

        let request = session.service().last_request.lock().unwrap().clone();
        let roles: Vec<Role> = request.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::Assistant, Role::User, Role::Assistant, Role::User]
        );
        assert_eq!(request[0].content, DEFAULT_GREETING);
        assert_eq!(request[3].content, "second");
    }

    #[tokio::test]
    async fn transport_failure_appends_apology() {
        let session = ChatSession::new(FakeService::new(Script::RefuseConnection));
        let before = session.transcript().len();

        assert_eq!(session.send("hello?").await, SendOutcome::Failed);

        let transcript = session.transcript();
        assert_eq!(transcript.len(), before + 2);
        assert_eq!(transcript.last().unwrap(), &ChatMessage::assistant(DEFAULT_APOLOGY));
        assert!(!session.is_in_flight());
    }

    #[tokio::test]
    async fn interrupted_stream_keeps_partial_reply_then_apologises() {
        let session = ChatSession::with_messages(
            FakeService::new(Script::CutOffAfter(vec!["I hear"])),
            "hi",
            "sorry",
        );
        assert_eq!(session.send("talk").await, SendOutcome::Failed);

        let transcript = session.transcript();
        let contents: Vec<&str> = transcript.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["hi", "talk", "I hear", "sorry"]);
        assert!(!transcript.has_open_reply());
        assert!(!session.is_in_flight());
    }

    #[tokio::test]
    async fn second_send_while_streaming_is_rejected() {
        let notify = Arc::new(tokio::sync::Notify::new());
        let session = ChatSession::new(FakeService::new(Script::WaitFor(notify.clone())));

        let first = session.send("one");
        let second = async {
            tokio::task::yield_now().await;
            assert!(session.is_in_flight());
            let outcome = session.send("two").await;
            notify.notify_one();
            outcome
        };
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first, SendOutcome::Replied("done".into()));
        assert_eq!(second, SendOutcome::Rejected(RejectReason::SendInFlight));
        assert_eq!(session.service().calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.transcript().len(), 3);
        assert!(!session.is_in_flight());
    }
}
