use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::Serialize;

use super::sse::{Frame, SseDecoder};
use super::transcript::ChatMessage;
use crate::error::ChatError;

/// Incremental text deltas of one assistant reply.
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<String, ChatError>> + Send>>;

/// Remote chat endpoint.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Submit the whole conversation and stream back the reply.
    ///
    /// An `Err` means the request was never accepted; errors inside the
    /// stream mean the reply was cut off part way.
    async fn stream_reply(&self, messages: &[ChatMessage]) -> Result<DeltaStream, ChatError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: &'a [ChatMessage],
}

/// Chat service hosted as a backend edge function.
pub struct HttpChatService {
    http_client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpChatService {
    /// `endpoint` is the full function URL; `api_key` is sent as the
    /// bearer credential.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatService for HttpChatService {
    async fn stream_reply(&self, messages: &[ChatMessage]) -> Result<DeltaStream, ChatError> {
        tracing::debug!(endpoint = %self.endpoint, messages = messages.len(), "opening chat stream");
        let resp = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&ChatRequest { messages })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ChatError::Status {
                status: resp.status().as_u16(),
            });
        }

        let mut bytes = resp.bytes_stream();
        let stream = async_stream::stream! {
            let mut decoder = SseDecoder::new();
            while let Some(chunk) = bytes.next().await {
                match chunk {
                    Ok(chunk) => {
                        for frame in decoder.push(&chunk) {
                            match frame {
                                Frame::Delta(text) => yield Ok(text),
                                Frame::Done => return,
                            }
                        }
                    }
                    Err(e) => {
                        yield Err(ChatError::Stream(e.to_string()));
                        return;
                    }
                }
            }
            if let Some(Frame::Delta(text)) = decoder.finish() {
                yield Ok(text);
            }
        };

        Ok(Box::pin(stream))
    }
}
