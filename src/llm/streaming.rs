//! Streaming response handling

use std::pin::Pin;

use futures::Stream;
use futures::StreamExt;

use super::StreamFragment;
use crate::errors::Result;

/// Streaming completion from the language model
///
/// The sequence is finite and not restartable. Consumers pull fragments
/// one at a time and must stop at the first terminal fragment.
pub struct CompletionStream {
    stream: Pin<Box<dyn Stream<Item = Result<StreamFragment>> + Send>>,
}

impl CompletionStream {
    pub fn new(stream: Pin<Box<dyn Stream<Item = Result<StreamFragment>> + Send>>) -> Self {
        Self { stream }
    }

    /// Wrap an already-materialized fragment sequence
    pub fn from_fragments(fragments: Vec<StreamFragment>) -> Self {
        Self::new(Box::pin(futures::stream::iter(
            fragments.into_iter().map(Ok),
        )))
    }

    /// Pull the next fragment, or `None` once the provider closes the stream
    pub async fn next(&mut self) -> Option<Result<StreamFragment>> {
        self.stream.next().await
    }

    /// Collect fragment content into a single string, stopping at the
    /// first terminal fragment
    pub async fn collect_content(mut self) -> Result<String> {
        let mut result = String::new();
        while let Some(fragment) = self.next().await {
            let fragment = fragment?;
            if let Some(content) = &fragment.content {
                result.push_str(content);
            }
            if fragment.is_terminal() {
                break;
            }
        }
        Ok(result)
    }
}
