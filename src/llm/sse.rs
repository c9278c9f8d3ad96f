//! Server-sent event decoding for streamed completions
//!
//! Completion bodies arrive as SSE: `data: {json}` lines separated by
//! blank lines, closed by a `data: [DONE]` sentinel. Network chunks can
//! split lines anywhere, so [`SseBuffer`] reassembles complete lines
//! before [`parse_line`] interprets them.

use serde::Deserialize;

use super::StreamFragment;
use crate::errors::RaglineError;
use crate::errors::Result;

/// Accumulates raw body bytes and yields complete lines
#[derive(Debug, Default)]
pub struct SseBuffer {
    buffer: Vec<u8>,
}

impl SseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a chunk of body bytes, returning the lines completed by it
    ///
    /// A partial trailing line stays buffered until a later chunk
    /// completes it. Bytes stay raw until a line is complete, so a
    /// multi-byte character split across chunks is reassembled before
    /// decoding. Splitting on `b'\n'` is safe: UTF-8 continuation bytes
    /// never equal 0x0A.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            lines.push(
                String::from_utf8_lossy(&line)
                    .trim_end_matches(['\r', '\n'])
                    .to_string(),
            );
        }
        lines
    }
}

/// Outcome of interpreting one SSE line
#[derive(Debug, PartialEq, Eq)]
pub enum SseLine {
    /// A data payload carrying a completion fragment
    Fragment(StreamFragment),
    /// The end-of-stream sentinel
    Done,
    /// Blank line, comment, non-data field, or data payload with no
    /// choices
    Ignore,
}

#[derive(Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    delta: Delta,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Default)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

/// Interpret a single complete SSE line
///
/// # Errors
/// - Malformed JSON in a data payload
pub fn parse_line(line: &str) -> Result<SseLine> {
    let line = line.trim();
    let Some(payload) = line.strip_prefix("data:") else {
        return Ok(SseLine::Ignore);
    };

    let payload = payload.trim_start();
    if payload == "[DONE]" {
        return Ok(SseLine::Done);
    }

    let chunk: CompletionChunk = serde_json::from_str(payload)
        .map_err(|e| RaglineError::Llm(format!("Malformed stream chunk: {e}")))?;

    // A payload without choices carries nothing to relay
    let Some(choice) = chunk.choices.into_iter().next() else {
        return Ok(SseLine::Ignore);
    };

    Ok(SseLine::Fragment(StreamFragment {
        content: choice.delta.content,
        finish_reason: choice.finish_reason,
    }))
}
