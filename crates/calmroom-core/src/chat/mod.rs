//! Wellness chat: transcript, streaming decoder and the remote service.

mod service;
mod session;
pub mod sse;
mod transcript;

pub use service::{ChatService, DeltaStream, HttpChatService};
pub use session::{ChatSession, RejectReason, SendOutcome, DEFAULT_APOLOGY, DEFAULT_GREETING};
pub use transcript::{ChatMessage, ChatTranscript, ReplyHandle, Role};
