//! Embedding API client for an OpenAI-compatible provider

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::Embedder;
use crate::config::AppConfig;
use crate::errors::RaglineError;
use crate::errors::Result;

/// Client for generating embeddings over HTTP
pub struct EmbeddingClient {
    model: String,
    endpoint: String,
    api_key: String,
    client: Client,
}

impl EmbeddingClient {
    /// Create a new embedding client
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    pub fn new(
        endpoint: String,
        api_key: String,
        model: String,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            model,
            endpoint,
            api_key,
            client,
        })
    }

    /// Create an embedding client from application configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            config.embeddings_endpoint().to_string(),
            config.embeddings_api_key().to_string(),
            config.embedding_model().to_string(),
            config.embeddings_timeout_secs(),
        )
    }

    /// Generate embedding for a single text
    ///
    /// # Errors
    /// - Empty input text
    /// - API request failures (network errors, timeouts, authentication failures)
    /// - Invalid API responses (malformed JSON, missing embedding data)
    pub async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(RaglineError::Embedding("Cannot embed empty text".to_string()));
        }

        #[derive(Serialize)]
        struct EmbeddingRequest<'a> {
            input: &'a str,
            model: &'a str,
        }

        #[derive(Deserialize)]
        struct EmbeddingResponse {
            data: Vec<EmbeddingData>,
        }

        #[derive(Deserialize)]
        struct EmbeddingData {
            embedding: Vec<f32>,
        }

        let url = format!("{}/embeddings", self.endpoint);
        debug!("Calling embeddings API: {}", url);

        let request = EmbeddingRequest {
            input: text,
            model: &self.model,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RaglineError::Embedding(format!(
                "Embeddings API error ({status}): {error_text}"
            )));
        }

        let result: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| RaglineError::Embedding(format!("Failed to parse response: {e}")))?;

        result
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| RaglineError::Embedding("No embedding in response".to_string()))
    }
}

#[async_trait]
impl Embedder for EmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.generate(text).await
    }
}
