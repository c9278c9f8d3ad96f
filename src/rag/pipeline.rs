//! Complete chat pipeline: Embed -> Retrieve -> Assemble -> Generate

use std::sync::Arc;

use tracing::debug;
use tracing::info;

use crate::config::AppConfig;
use crate::embeddings::Embedder;
use crate::embeddings::EmbeddingClient;
use crate::errors::RaglineError;
use crate::errors::Result;
use crate::llm::ChatMessage;
use crate::llm::ChatModel;
use crate::llm::CompletionStream;
use crate::llm::LlmClient;
use crate::rag::context::AssembledContext;
use crate::rag::ContextAssembler;
use crate::vector::VectorIndex;
use crate::vector::VectorIndexClient;

/// A single prompt request flowing through the pipeline
#[derive(Debug, Clone)]
pub struct PromptQuery {
    pub prompt: String,
    pub namespace: String,
    pub top_k: usize,
    pub verbose: bool,
}

/// Complete retrieval-augmented chat pipeline
///
/// Collaborators are injected, so tests can substitute doubles for the
/// remote providers.
pub struct ChatPipeline {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    model: Arc<dyn ChatModel>,
    context_assembler: ContextAssembler,
}

impl ChatPipeline {
    /// Create a pipeline with all collaborators built from configuration
    ///
    /// # Errors
    /// - Client configuration errors (invalid endpoints, HTTP client build)
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(
            Arc::new(EmbeddingClient::from_config(config)?),
            Arc::new(VectorIndexClient::from_config(config)?),
            Arc::new(LlmClient::from_config(config)?),
        ))
    }

    /// Create a pipeline from existing collaborators
    #[must_use]
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        model: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            embedder,
            index,
            model,
            context_assembler: ContextAssembler::default(),
        }
    }

    /// Run the full pipeline for one prompt, returning the completion
    /// stream for the caller to relay
    ///
    /// # Errors
    /// - `InvalidPrompt` when the prompt is empty; no collaborator is
    ///   contacted in that case
    /// - `NoMatches` when retrieval yields an empty batch
    /// - Embedding, retrieval, or generation failures from the
    ///   collaborators
    pub async fn execute(&self, query: PromptQuery) -> Result<CompletionStream> {
        if query.prompt.trim().is_empty() {
            return Err(RaglineError::InvalidPrompt);
        }

        info!(
            "Processing prompt (namespace={:?}, top_k={})",
            query.namespace, query.top_k
        );

        // Step 1: Embed the prompt
        debug!("Step 1: Generating prompt embedding");
        let vector = self.embedder.embed(&query.prompt).await?;

        // Step 2: Retrieve nearest records
        debug!("Step 2: Querying vector index");
        let records = self
            .index
            .query(&vector, query.top_k, &query.namespace)
            .await?;
        if records.is_empty() {
            return Err(RaglineError::NoMatches);
        }
        debug!("Retrieved {} records", records.len());

        // Step 3: Assemble context
        debug!("Step 3: Assembling context");
        let context = self.context_assembler.assemble(&records);

        // Step 4: Open the streaming completion
        debug!("Step 4: Opening streaming completion");
        let messages = build_messages(&context, &query.prompt);
        if query.verbose {
            debug!(
                "Messages sent to model: {}",
                serde_json::to_string_pretty(&messages)?
            );
        }

        self.model.stream(messages).await
    }
}

/// Build the fixed message sequence sent to the model
///
/// The order is part of the contract: field summary as system context,
/// then the combined record blocks, then the user's prompt.
fn build_messages(context: &AssembledContext, prompt: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(context.summary.clone()),
        ChatMessage::user(context.combined.clone()),
        ChatMessage::user(prompt),
    ]
}
