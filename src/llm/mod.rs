//! Language model client module
//!
//! Opens streaming chat completions against an OpenAI-compatible endpoint
//! and exposes them as a lazy pull-based fragment stream. Fragments are
//! forwarded as they arrive; nothing buffers the full completion. The
//! [`ChatModel`] trait is the seam the chat pipeline depends on.

pub mod client;
pub mod sse;
pub mod streaming;

pub use client::LlmClient;
pub use streaming::CompletionStream;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::errors::Result;

/// Role tag for a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A single role-tagged message sent to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// One incremental piece of a streamed completion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamFragment {
    pub content: Option<String>,
    pub finish_reason: Option<String>,
}

impl StreamFragment {
    /// Whether this fragment ends the completion
    ///
    /// Providers send `finish_reason` as null on every chunk except the
    /// last; an empty string does not count as a termination reason.
    pub fn is_terminal(&self) -> bool {
        self.finish_reason.as_deref().is_some_and(|r| !r.is_empty())
    }
}

/// Streaming chat completion provider
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Open a streaming completion for the given messages
    async fn stream(&self, messages: Vec<ChatMessage>) -> Result<CompletionStream>;
}
