//! Generation backend port
//!
//! The text-generation model is an opaque service: a prompt plus context
//! items (and, for chat, prior turns) in, text out.

use async_trait::async_trait;
use rag_domain::{RetrievalResult, Turn};
use thiserror::Error;

/// Errors that can occur during generation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Empty response from generation backend")]
    EmptyResponse,

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
}

/// Request sent to the generation backend
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Rendered system prompt of the agent's domain
    pub prompt: String,
    /// The user's question
    pub question: String,
    /// Merged retrieval results, in rank order
    pub context_items: Vec<RetrievalResult>,
    /// Prior turns, oldest first; empty for single-shot agents
    pub history: Vec<Turn>,
}

/// Generated answer
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResponse {
    pub text: String,
}

/// Port for the text-generation backend
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, request: &GenerationRequest)
    -> Result<GenerationResponse, GenerationError>;
}
