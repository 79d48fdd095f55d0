//! Retrieval domain entities

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A scalar metadata value attached to a [`Document`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl MetadataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataValue::Bool(b) => write!(f, "{}", b),
            MetadataValue::Number(n) => write!(f, "{}", n),
            MetadataValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        MetadataValue::Text(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        MetadataValue::Text(s)
    }
}

impl From<f64> for MetadataValue {
    fn from(n: f64) -> Self {
        MetadataValue::Number(n)
    }
}

impl From<bool> for MetadataValue {
    fn from(b: bool) -> Self {
        MetadataValue::Bool(b)
    }
}

/// Document metadata. Ordered so persisted snapshots are stable.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// Metadata key used as the display title of a local result.
pub const TITLE_KEY: &str = "title";

/// A document stored in one collection of the vector index (Entity)
///
/// Created or replaced only through `VectorIndex::upsert`. Once stored, only
/// its metadata may be refreshed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub collection: String,
    pub text: String,
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        collection: impl Into<String>,
        text: impl Into<String>,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            id: id.into(),
            collection: collection.into(),
            text: text.into(),
            embedding,
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Embedding dimension of this document
    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }

    /// Display title: the `title` metadata entry, or the id.
    pub fn title(&self) -> &str {
        self.metadata
            .get(TITLE_KEY)
            .and_then(|v| v.as_str())
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.id)
    }
}
