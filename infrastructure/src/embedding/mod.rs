//! Embedder adapters
//!
//! - [`HashingEmbedder`]: offline, deterministic (default)
//! - [`HttpEmbedder`]: OpenAI-compatible `/embeddings` endpoint

mod hashing;
mod http;

pub use hashing::HashingEmbedder;
pub use http::HttpEmbedder;

use rag_application::ports::embedder::Embedder;
use std::sync::Arc;

use crate::config::{EmbeddingBackendKind, FileEmbeddingConfig};

/// Build the embedder selected by `[embedding] backend`.
pub fn embedder_from_config(config: &FileEmbeddingConfig) -> Arc<dyn Embedder> {
    match config.backend {
        EmbeddingBackendKind::Hashing => Arc::new(HashingEmbedder::new(config.dimension)),
        EmbeddingBackendKind::Http => Arc::new(HttpEmbedder::from_config(config)),
    }
}
