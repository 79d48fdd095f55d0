//! Configuration file loading for hybrid-rag
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `HYBRID_RAG_*` environment variables (`__` separates nested keys)
//! 2. `--config <path>` specified file
//! 3. Project root: `./hybrid-rag.toml` or `./.hybrid-rag.toml`
//! 4. Global: `$XDG_CONFIG_HOME/hybrid-rag/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, DEFAULT_TOOL_TIMEOUT_MS, EmbeddingBackendKind, FileAgentOverride,
    FileAgentsConfig, FileCollectionConfig, FileConfig, FileEmbeddingConfig,
    FileGenerationConfig, FileIndexConfig, FileLoggingConfig, FileReplConfig,
    FileRetrievalConfig, FileToolConfig, FileToolParameter,
};
pub use loader::{ConfigLoader, ENV_PREFIX};
