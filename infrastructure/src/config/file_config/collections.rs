//! Collection configuration from TOML (`[collections.<name>]` sections)
//!
//! ```toml
//! [collections.marketing]
//! min_hits = 3
//! min_score = 0.6
//! top_k = 5
//! embedding_dimension = 384
//! ```

use rag_domain::CollectionPolicy;
use serde::{Deserialize, Serialize};

/// Per-collection thresholds. Omitted keys take the built-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCollectionConfig {
    pub min_hits: usize,
    pub min_score: f32,
    pub top_k: usize,
    pub embedding_dimension: Option<usize>,
}

impl Default for FileCollectionConfig {
    fn default() -> Self {
        let policy = CollectionPolicy::default();
        Self {
            min_hits: policy.min_hits,
            min_score: policy.min_score,
            top_k: policy.top_k,
            embedding_dimension: policy.embedding_dimension,
        }
    }
}

impl FileCollectionConfig {
    pub fn to_policy(&self) -> CollectionPolicy {
        CollectionPolicy {
            min_hits: self.min_hits,
            min_score: self.min_score,
            top_k: self.top_k,
            embedding_dimension: self.embedding_dimension,
        }
    }
}
