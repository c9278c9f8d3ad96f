//! Vector index retrieval module
//!
//! Queries a remote similarity index for the records nearest a query
//! vector. Matches come back with their stored metadata attached, which
//! the RAG layer assembles into model context. The [`VectorIndex`] trait
//! is the seam the chat pipeline depends on.

pub mod client;

pub use client::VectorIndexClient;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::errors::Result;

/// A single match returned from the similarity index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedRecord {
    pub id: String,
    pub score: f32,
    #[serde(default)]
    pub metadata: serde_json::Map<String, Value>,
}

/// Nearest-neighbor lookup over stored records
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Return up to `top_k` records nearest to `vector` within `namespace`
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        namespace: &str,
    ) -> Result<Vec<RetrievedRecord>>;
}
