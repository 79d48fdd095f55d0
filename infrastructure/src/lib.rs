//! Infrastructure layer for hybrid-rag
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.
//!
//! | Port | Adapter |
//! |------|---------|
//! | `Embedder` | [`HashingEmbedder`], [`HttpEmbedder`] |
//! | `VectorIndex` | [`FileVectorIndex`] |
//! | `ToolExecutorPort` | [`ToolCallClient`] |
//! | `GenerationBackend` | [`OpenAiChatBackend`] |
//! | `ConversationLogger` | [`JsonlConversationLogger`] |

pub mod config;
pub mod embedding;
pub mod generation;
pub mod index;
pub mod logging;
pub mod tools;

// Re-export commonly used types
pub use config::{ConfigLoader, ConfigValidationError, FileConfig, FileReplConfig};
pub use embedding::{HashingEmbedder, HttpEmbedder, embedder_from_config};
pub use generation::OpenAiChatBackend;
pub use index::{FileVectorIndex, index_from_config};
pub use logging::JsonlConversationLogger;
pub use tools::{
    HttpToolProvider, ToolCallClient, WebSearchProvider, build_http_client,
    tool_client_from_config,
};
