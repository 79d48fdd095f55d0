//! Tool provider abstraction
//!
//! A [`ToolProvider`] is a transport that owns a set of tools. The tool-call
//! client asks every provider for its tools once at startup and routes each
//! call to the provider that registered the tool name.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               ToolCallClient                │
//! │   (registry, timeout, single retry)         │
//! └─────────────────────────────────────────────┘
//!            │                       │
//!            ▼                       ▼
//!    ┌───────────────┐       ┌───────────────┐
//!    │ WebSearch     │       │ HttpTool      │
//!    │ Provider      │       │ Provider      │
//!    └───────────────┘       └───────────────┘
//!      priority: 50            priority: 0
//! ```
//!
//! When two providers offer the same tool name, the higher priority wins.
//!
//! Providers report failures as [`ProviderError`]. Only
//! [`ProviderError::Transient`] is eligible for the client's single retry.

use async_trait::async_trait;
use thiserror::Error;

use super::entities::{ToolCall, ToolDefinition};

/// Error type for tool provider operations
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    /// Network error or retryable status (5xx, 429)
    #[error("Transient failure: {0}")]
    Transient(String),

    /// The tool rejected the request (4xx, malformed payload)
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Provider is not available (e.g., missing credentials)
    #[error("Provider not available: {0}")]
    NotAvailable(String),

    /// Tool not found in this provider
    #[error("Tool not found: {0}")]
    ToolNotFound(String),
}

impl ProviderError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Transient(_))
    }
}

/// Tool provider abstraction - external source of tools
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Unique identifier for this provider (e.g. "web", "http:patent_lookup")
    fn id(&self) -> &str;

    /// Priority for tool resolution (higher = preferred)
    fn priority(&self) -> i32 {
        0
    }

    /// Check if the provider is available and properly configured
    async fn is_available(&self) -> bool {
        true
    }

    /// Tools this provider can execute
    fn tools(&self) -> Vec<ToolDefinition>;

    /// Execute a tool call and return its raw payload
    async fn execute(&self, call: &ToolCall) -> Result<serde_json::Value, ProviderError>;
}
