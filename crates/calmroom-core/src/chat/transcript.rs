use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Write access to the assistant reply that is currently streaming in.
///
/// Only [`ChatTranscript::begin_reply`] creates one, and the transcript
/// refuses to append anything else while it is outstanding, so the entry
/// it points at is always the last message.
#[derive(Debug)]
pub struct ReplyHandle {
    index: usize,
}

impl ReplyHandle {
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Append-only conversation log for one chat view.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
    #[serde(skip)]
    open_reply: bool,
}

impl ChatTranscript {
    /// A transcript that starts with one assistant greeting.
    pub fn seeded(greeting: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::assistant(greeting)],
            open_reply: false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn has_open_reply(&self) -> bool {
        self.open_reply
    }

    /// Append a finished message. Closes any open reply first.
    pub fn push(&mut self, message: ChatMessage) {
        self.open_reply = false;
        self.messages.push(message);
    }

    /// Append an empty assistant placeholder and return the handle that
    /// fills it.
    pub fn begin_reply(&mut self) -> ReplyHandle {
        self.push(ChatMessage::assistant(String::new()));
        self.open_reply = true;
        ReplyHandle {
            index: self.messages.len() - 1,
        }
    }

    /// Append a streamed fragment to the open reply.
    ///
    /// Returns the reply text so far, or `None` if `handle` no longer
    /// refers to the open reply.
    pub fn append_delta(&mut self, handle: &ReplyHandle, delta: &str) -> Option<&str> {
        if !self.open_reply || handle.index + 1 != self.messages.len() {
            return None;
        }
        let message = &mut self.messages[handle.index];
        message.content.push_str(delta);
        Some(&message.content)
    }

    /// Freeze the reply; it can no longer be modified.
    pub fn finish_reply(&mut self, handle: ReplyHandle) -> &ChatMessage {
        if handle.index + 1 == self.messages.len() {
            self.open_reply = false;
        }
        &self.messages[handle.index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_transcript_starts_with_greeting() {
        let transcript = ChatTranscript::seeded("hello");
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.last().unwrap(), &ChatMessage::assistant("hello"));
    }

    #[test]
    fn deltas_accumulate_in_open_reply() {
        let mut transcript = ChatTranscript::seeded("hi");
        transcript.push(ChatMessage::user("how are you"));
        let handle = transcript.begin_reply();
        assert_eq!(transcript.append_delta(&handle, "Hel"), Some("Hel"));
        assert_eq!(transcript.append_delta(&handle, "lo"), Some("Hello"));
        let reply = transcript.finish_reply(handle);
        assert_eq!(reply.content, "Hello");
        assert_eq!(transcript.len(), 3);
        assert!(!transcript.has_open_reply());
    }

    #[test]
    fn push_closes_open_reply() {
        let mut transcript = ChatTranscript::seeded("hi");
        let handle = transcript.begin_reply();
        transcript.append_delta(&handle, "partial");
        transcript.push(ChatMessage::assistant("sorry"));
        assert_eq!(transcript.append_delta(&handle, " more"), None);
        assert_eq!(transcript.messages()[1].content, "partial");
    }

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_string(&ChatMessage::user("x")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"x"}"#);
    }
}
