//! Streaming chat completion client for an OpenAI-compatible provider

use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::Stream;
use futures::StreamExt;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use super::sse;
use super::sse::SseBuffer;
use super::sse::SseLine;
use super::streaming::CompletionStream;
use super::ChatMessage;
use super::ChatModel;
use super::StreamFragment;
use crate::config::AppConfig;
use crate::errors::RaglineError;
use crate::errors::Result;

type ByteStream =
    Pin<Box<dyn Stream<Item = std::result::Result<Vec<u8>, reqwest::Error>> + Send>>;

/// Client for opening streamed completions over HTTP
pub struct LlmClient {
    model: String,
    endpoint: String,
    api_key: String,
    client: Client,
}

impl LlmClient {
    /// Create a new LLM client
    ///
    /// Only a connect timeout is applied. A total request timeout would
    /// cut long generations off mid-stream.
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    pub fn new(
        endpoint: String,
        api_key: String,
        model: String,
        connect_timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .build()?;

        Ok(Self {
            model,
            endpoint,
            api_key,
            client,
        })
    }

    /// Create an LLM client from application configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            config.llm_endpoint().to_string(),
            config.llm_key().to_string(),
            config.llm_model().to_string(),
            config.llm_connect_timeout_secs(),
        )
    }

    /// Open a streaming completion for the given messages
    ///
    /// # Errors
    /// - API request failures (network errors, authentication failures)
    /// - Non-success response status
    async fn open_stream(&self, messages: Vec<ChatMessage>) -> Result<CompletionStream> {
        let url = format!("{}/chat/completions", self.endpoint);
        debug!("Opening streaming completion: {} (model={})", url, self.model);

        let body = json!({
            "model": self.model,
            "messages": messages,
            "stream": true,
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RaglineError::Llm(format!(
                "Chat completions API error ({status}): {error_text}"
            )));
        }

        let bytes: ByteStream = Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map(|bytes| bytes.to_vec())),
        );

        Ok(decode_stream(bytes))
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn stream(&self, messages: Vec<ChatMessage>) -> Result<CompletionStream> {
        self.open_stream(messages).await
    }
}

struct DecodeState {
    bytes: ByteStream,
    buffer: SseBuffer,
    pending: VecDeque<StreamFragment>,
    done: bool,
}

/// Decode a raw SSE body into a completion fragment stream
fn decode_stream(bytes: ByteStream) -> CompletionStream {
    let state = DecodeState {
        bytes,
        buffer: SseBuffer::new(),
        pending: VecDeque::new(),
        done: false,
    };

    let stream = futures::stream::try_unfold(state, |mut state| async move {
        loop {
            if let Some(fragment) = state.pending.pop_front() {
                return Ok(Some((fragment, state)));
            }
            if state.done {
                return Ok(None);
            }

            match state.bytes.next().await {
                Some(chunk) => {
                    let chunk = chunk?;
                    for line in state.buffer.push(&chunk) {
                        match sse::parse_line(&line)? {
                            SseLine::Fragment(fragment) => state.pending.push_back(fragment),
                            SseLine::Done => state.done = true,
                            SseLine::Ignore => {}
                        }
                    }
                }
                None => state.done = true,
            }
        }
    });

    CompletionStream::new(Box::pin(stream))
}
