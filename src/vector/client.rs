//! HTTP client for a Pinecone-compatible similarity index

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::RetrievedRecord;
use super::VectorIndex;
use crate::config::AppConfig;
use crate::errors::RaglineError;
use crate::errors::Result;

/// Client for querying a remote vector index
pub struct VectorIndexClient {
    endpoint: String,
    api_key: String,
    client: Client,
}

impl VectorIndexClient {
    /// Create a new vector index client
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    pub fn new(endpoint: String, api_key: String, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            endpoint,
            api_key,
            client,
        })
    }

    /// Create a vector index client from application configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            config.vector_store_endpoint().to_string(),
            config.vector_store_api_key().to_string(),
            config.vector_store_timeout_secs(),
        )
    }

    /// Query the index for the nearest neighbors of a vector
    ///
    /// # Errors
    /// - API request failures (network errors, timeouts, authentication failures)
    /// - Invalid API responses (malformed JSON)
    async fn query_index(
        &self,
        vector: &[f32],
        top_k: usize,
        namespace: &str,
    ) -> Result<Vec<RetrievedRecord>> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct QueryRequest<'a> {
            vector: &'a [f32],
            top_k: usize,
            include_metadata: bool,
            namespace: &'a str,
        }

        #[derive(Deserialize)]
        struct QueryResponse {
            #[serde(default)]
            matches: Vec<RetrievedRecord>,
        }

        let url = format!("{}/query", self.endpoint);
        debug!(
            "Querying vector index: {} (top_k={}, namespace={:?})",
            url, top_k, namespace
        );

        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            namespace,
        };

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
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
            return Err(RaglineError::VectorStore(format!(
                "Vector index error ({status}): {error_text}"
            )));
        }

        let result: QueryResponse = response
            .json()
            .await
            .map_err(|e| RaglineError::VectorStore(format!("Failed to parse response: {e}")))?;

        debug!("Vector index returned {} matches", result.matches.len());

        Ok(result.matches)
    }
}

#[async_trait]
impl VectorIndex for VectorIndexClient {
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        namespace: &str,
    ) -> Result<Vec<RetrievedRecord>> {
        self.query_index(vector, top_k, namespace).await
    }
}
