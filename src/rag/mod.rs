//! RAG (Retrieval-Augmented Generation) module
//!
//! End-to-end pipeline for answering chat prompts with retrieved context:
//! - Prompt embedding via the configured provider
//! - Nearest-neighbor retrieval from the vector index
//! - Context assembly from record metadata
//! - Streaming answer generation
//!
//! # Examples
//!
//! ```rust,no_run
//! use ragline::config::AppConfig;
//! use ragline::rag::ChatPipeline;
//! use ragline::rag::PromptQuery;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let pipeline = ChatPipeline::from_config(&config)?;
//!
//!     let mut stream = pipeline
//!         .execute(PromptQuery {
//!             prompt: "What was discussed about launch timing?".to_string(),
//!             namespace: String::new(),
//!             top_k: 5,
//!             verbose: false,
//!         })
//!         .await?;
//!
//!     while let Some(fragment) = stream.next().await {
//!         let fragment = fragment?;
//!         if let Some(content) = &fragment.content {
//!             print!("{content}");
//!         }
//!         if fragment.is_terminal() {
//!             break;
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod pipeline;

pub use context::AssembledContext;
pub use context::ContextAssembler;
pub use pipeline::ChatPipeline;
pub use pipeline::PromptQuery;
