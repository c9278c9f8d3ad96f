//! Embeddings generation module
//!
//! Turns prompt text into dense query vectors via an OpenAI-compatible
//! embeddings endpoint. The [`Embedder`] trait is the seam the chat
//! pipeline depends on, so tests can substitute a double for the remote
//! provider.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ragline::config::AppConfig;
//! use ragline::embeddings::EmbeddingClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let client = EmbeddingClient::from_config(&config)?;
//!
//!     let embedding = client.generate("Hello, world!").await?;
//!     println!("Generated embedding with {} dimensions", embedding.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;

pub use client::EmbeddingClient;

use async_trait::async_trait;

use crate::errors::Result;

/// Maps a text to a dense vector in the similarity space
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding vector for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
