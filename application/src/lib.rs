//! Application layer for hybrid-rag
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.
//!
//! Control flow for one question:
//!
//! ```text
//! Dispatcher ──▶ Agent ──▶ Retriever ──▶ Embedder
//!                  │           ├──────▶ VectorIndex
//!                  │           └──────▶ ToolExecutorPort (web_search, on escalation)
//!                  └──▶ GenerationBackend
//! ```

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::RetrievalParams;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    embedder::{Embedder, EmbeddingError},
    generation::{GenerationBackend, GenerationError, GenerationRequest, GenerationResponse},
    progress::{NoProgress, ProgressNotifier},
    tool_executor::{ToolCallError, ToolExecutorPort},
    vector_index::{IndexError, ScoredDocument, VectorIndex},
};
pub use use_cases::agent::{Agent, AgentError, DomainAgent};
pub use use_cases::dispatch::{DispatchError, Dispatcher};
pub use use_cases::retrieve::{RetrievalError, RetrievalMode, Retriever};
