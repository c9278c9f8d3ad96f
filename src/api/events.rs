//! WebSocket wire protocol
//!
//! Events travel as JSON text frames with an `event` tag and a `data`
//! payload. Inbound: `sendPrompt`. Outbound: `responseChunk` (zero or
//! more per request, the terminal one carrying a finish reason) or
//! `error` (emitted in place of the response stream).

use serde::Deserialize;
use serde::Serialize;

use crate::llm::StreamFragment;

/// Inbound events sent by the client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "sendPrompt")]
    SendPrompt(PromptRequest),
}

/// Payload of a `sendPrompt` event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub developer_output: bool,
    #[serde(default)]
    pub namespace: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    5
}

/// Outbound events sent to the client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "responseChunk")]
    ResponseChunk(ResponseChunk),
    #[serde(rename = "error")]
    Error(String),
}

/// One streamed piece of the model's answer
///
/// `content` is omitted from the frame when absent; `finish_reason` is
/// kept as an explicit null on non-terminal chunks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl From<StreamFragment> for ResponseChunk {
    fn from(fragment: StreamFragment) -> Self {
        Self {
            content: fragment.content,
            finish_reason: fragment.finish_reason,
        }
    }
}
