//! Tool Executor port
//!
//! Defines the uniform request/response bridge to named external tools
//! (web search, patent lookup, ...). Implementations own transport details;
//! callers see only [`ToolResponse`] and the [`ToolCallError`] taxonomy.

use async_trait::async_trait;
use rag_domain::tool::{
    entities::{ToolCall, ToolDefinition, ToolSpec},
    value_objects::ToolResponse,
};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Timeout applied when an executor has no per-tool setting
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Errors surfaced by a tool call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolCallError {
    /// No registered tool has this name; no I/O was performed
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The call did not complete within its timeout; never retried
    #[error("Tool '{tool}' timed out after {timeout_ms}ms")]
    ToolCallTimeout { tool: String, timeout_ms: u64 },

    /// The call failed (after the single retry, for transient failures)
    #[error("Tool '{tool}' failed: {reason}")]
    ToolCallFailed { tool: String, reason: String },

    /// The session was cancelled while the call was in flight
    #[error("Tool call cancelled")]
    Cancelled,
}

impl ToolCallError {
    /// Whether the caller may degrade to local-only results
    pub fn is_soft(&self) -> bool {
        !matches!(self, ToolCallError::Cancelled)
    }
}

/// Port for tool execution
///
/// This port defines how the application layer reaches external tools.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Get the specification of all available tools
    fn tool_spec(&self) -> &ToolSpec;

    /// Check if a tool is available
    fn has_tool(&self, name: &str) -> bool {
        self.tool_spec().contains(name)
    }

    /// Get the definition of a specific tool
    fn get_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tool_spec().get(name)
    }

    /// Names of all registered tools, sorted
    fn list_tools(&self) -> Vec<&str> {
        self.tool_spec().names()
    }

    /// Configured timeout for `tool_name`, applied when `call` gets `None`
    fn timeout_for(&self, _tool_name: &str) -> Duration {
        DEFAULT_TOOL_TIMEOUT
    }

    /// Invoke a tool.
    ///
    /// `timeout` overrides the tool's configured default. The returned
    /// response is always successful; failures are reported as errors.
    async fn call(
        &self,
        call: &ToolCall,
        timeout: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<ToolResponse, ToolCallError>;
}
