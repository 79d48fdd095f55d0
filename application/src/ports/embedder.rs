//! Embedder port
//!
//! Turns text into fixed-dimension vectors for the vector index.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while embedding text
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmbeddingError {
    #[error("Cannot embed empty text")]
    EmptyInput,

    #[error("Embedding backend unavailable: {0}")]
    Unavailable(String),

    #[error("Embedding backend returned {actual} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid embedding response: {0}")]
    InvalidResponse(String),
}

/// Text embedding backend
///
/// Implementations are stateless apart from a read-only model or client
/// handle, so one instance is shared across every session.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Dimension of every vector this embedder produces
    fn dimension(&self) -> usize;

    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| EmbeddingError::InvalidResponse("empty batch result".to_string()))
    }

    /// Embed many texts; the output is in input order.
    ///
    /// Fails with [`EmbeddingError::EmptyInput`] if any text is blank.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// Reject blank inputs before they reach a backend
pub fn ensure_non_blank(texts: &[String]) -> Result<(), EmbeddingError> {
    if texts.is_empty() || texts.iter().any(|t| t.trim().is_empty()) {
        return Err(EmbeddingError::EmptyInput);
    }
    Ok(())
}
