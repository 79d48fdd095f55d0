//! Vector index port
//!
//! Per-collection store of embedded [`Document`]s with cosine-similarity
//! nearest-neighbour search. `upsert` and `upsert_batch` are the only write
//! paths; apart from full replacement, a stored document may only have its
//! metadata refreshed.

use async_trait::async_trait;
use rag_domain::{Document, Metadata};
use thiserror::Error;

/// Errors that can occur during vector index operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error("Collection '{collection}' expects {expected}-dimension embeddings, got {actual}")]
    DimensionMismatch {
        collection: String,
        expected: usize,
        actual: usize,
    },

    #[error("Collection '{collection}' unavailable: {reason}")]
    CollectionUnavailable { collection: String, reason: String },

    #[error("Document '{id}' not found in collection '{collection}'")]
    DocumentNotFound { collection: String, id: String },

    #[error("Document belongs to collection '{actual}', not '{expected}'")]
    WrongCollection { expected: String, actual: String },
}

impl IndexError {
    pub fn unavailable(collection: impl Into<String>, reason: impl ToString) -> Self {
        IndexError::CollectionUnavailable {
            collection: collection.into(),
            reason: reason.to_string(),
        }
    }
}

/// A search hit: the stored document and its cosine similarity to the query
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: f32,
}

/// Port for the local vector store
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert a document or replace the one with the same id.
    async fn upsert(&self, collection: &str, document: Document) -> Result<(), IndexError>;

    /// Insert or replace several documents of one collection.
    ///
    /// Stops at the first rejected document. Persistent implementations
    /// should override this to write once per batch.
    async fn upsert_batch(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<(), IndexError> {
        for document in documents {
            self.upsert(collection, document).await?;
        }
        Ok(())
    }

    /// Up to `top_k` documents by descending cosine similarity.
    ///
    /// Equal scores keep insertion order. An empty collection yields an
    /// empty list, never an error.
    async fn search(
        &self,
        collection: &str,
        query_vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredDocument>, IndexError>;

    /// Replace the metadata of a stored document.
    async fn refresh_metadata(
        &self,
        collection: &str,
        id: &str,
        metadata: Metadata,
    ) -> Result<(), IndexError>;

    /// Number of documents stored in `collection`
    async fn count(&self, collection: &str) -> Result<usize, IndexError>;

    /// Names of all known collections, sorted
    async fn collections(&self) -> Vec<String>;
}
