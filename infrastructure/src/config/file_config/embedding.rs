//! Embedding configuration from TOML (`[embedding]` section)

use serde::{Deserialize, Serialize};

/// Which embedder backs the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackendKind {
    /// Offline feature-hashing embedder
    #[default]
    Hashing,
    /// OpenAI-compatible `/embeddings` endpoint
    Http,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEmbeddingConfig {
    pub backend: EmbeddingBackendKind,
    /// Base URL; `/embeddings` is appended
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Dimension of produced vectors
    pub dimension: usize,
    /// Texts per request when embedding in bulk
    pub batch_size: usize,
    pub timeout_seconds: u64,
}

impl Default for FileEmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackendKind::Hashing,
            endpoint: "https://api.openai.com/v1".to_string(),
            model: "text-embedding-3-small".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            dimension: 384,
            batch_size: 32,
            timeout_seconds: 30,
        }
    }
}
