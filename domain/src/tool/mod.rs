//! Tool domain module
//!
//! This module defines the abstractions behind the **uniform tool-call
//! protocol**: how agents reach external tools (web search, patent lookup, ...)
//! without knowing anything about the transport behind them.
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ ToolSpec     │───▶│ ToolCall     │───▶│ ToolResponse │
//! │ (registry)   │    │ (invocation) │    │ (payload)    │
//! └──────────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`ToolSpec`]: tools resolved once at startup
//! - [`ToolDefinition`]: schema for a single tool (name, parameters)
//! - [`ToolCall`]: a request: tool name plus argument mapping
//! - [`ToolResponse`]: `{success, payload, error, elapsed}`; the payload is
//!   opaque to the client and interpreted by the caller
//! - [`ToolProvider`]: a transport that can discover and execute tools
//!
//! # Architecture
//!
//! - **Domain** (this module): pure definitions, no I/O
//! - **Application** (`ToolExecutorPort`): timeout, retry and error taxonomy
//! - **Infrastructure** (`ToolCallClient`, providers): HTTP transports

pub mod entities;
pub mod provider;
pub mod traits;
pub mod value_objects;

pub use entities::{ToolCall, ToolDefinition, ToolParameter, ToolSpec};
pub use provider::{ProviderError, ToolProvider};
pub use traits::{DefaultToolValidator, ToolValidator};
pub use value_objects::{ToolResponse, WEB_SEARCH, WebSearchItem};
