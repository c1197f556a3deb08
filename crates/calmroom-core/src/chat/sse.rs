//! Decoder for the chat service's newline-delimited event stream.
//!
//! Each `data: {json}` line may carry a text delta at
//! `choices[0].delta.content`; `data: [DONE]` ends the stream. Everything
//! else (comments, `event:` lines, blank separators, unparsable payloads)
//! is ignored.

use serde::Deserialize;

const DATA_PREFIX: &str = "data:";
const DONE_SENTINEL: &str = "[DONE]";

/// One meaningful frame from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Delta(String),
    Done,
}

#[derive(Deserialize)]
struct Payload {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    delta: Option<Delta>,
}

#[derive(Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

/// Longest line kept while waiting for its newline. Anything longer is
/// dropped up to the next newline.
pub const MAX_LINE_BYTES: usize = 1 << 20;

/// Incremental line decoder.
///
/// Transport chunks can split a line, or a multi-byte character, at any
/// byte; incomplete lines are buffered until their newline arrives. Only
/// the bytes of each new chunk are scanned.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    overflowed: bool,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the `[DONE]` sentinel has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed one transport chunk; returns the frames it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Frame> {
        let mut frames = Vec::new();
        if self.done {
            return frames;
        }

        let mut rest = chunk;
        while let Some(pos) = rest.iter().position(|b| *b == b'\n') {
            let (head, tail) = rest.split_at(pos + 1);
            rest = tail;
            if self.overflowed {
                self.overflowed = false;
                continue;
            }

            self.buffer.extend_from_slice(head);
            let line = std::mem::take(&mut self.buffer);
            if let Some(frame) = self.decode_line(&line) {
                frames.push(frame);
                if self.done {
                    return frames;
                }
            }
        }

        if !self.overflowed {
            self.buffer.extend_from_slice(rest);
            if self.buffer.len() > MAX_LINE_BYTES {
                tracing::debug!(len = self.buffer.len(), "dropping oversized stream line");
                self.buffer = Vec::new();
                self.overflowed = true;
            }
        }
        frames
    }

    /// Flush a trailing line that had no newline before the stream closed.
    pub fn finish(mut self) -> Option<Frame> {
        if self.done || self.overflowed || self.buffer.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.buffer);
        self.decode_line(&line)
    }

    fn decode_line(&mut self, raw: &[u8]) -> Option<Frame> {
        let line = String::from_utf8_lossy(raw);
        let line = line.trim_end_matches(['\n', '\r']);
        let data = line.strip_prefix(DATA_PREFIX)?.trim_start();

        if data == DONE_SENTINEL {
            self.done = true;
            return Some(Frame::Done);
        }

        match serde_json::from_str::<Payload>(data) {
            Ok(payload) => payload
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.delta)
                .and_then(|d| d.content)
                .filter(|content| !content.is_empty())
                .map(Frame::Delta),
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed stream frame");
                None
            }
        }
    }
}
