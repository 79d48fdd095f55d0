//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Query text cannot be empty")]
    EmptyQuery,

    #[error("Unknown domain: {0}")]
    UnknownDomain(String),

    #[error("Invalid threshold {name}: {value}")]
    InvalidThreshold { name: &'static str, value: f32 },

    #[error("top_k must be greater than zero")]
    ZeroTopK,

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}
