//! Retrieval value objects: queries, ranked results and outcomes

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Provenance of a retrieved item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Locally indexed knowledge base
    Local,
    /// Live web search
    Web,
}

impl Source {
    pub fn as_str(&self) -> &str {
        match self {
            Source::Local => "local",
            Source::Web => "web",
        }
    }

    /// Human-readable label for rendering provenance
    pub fn label(&self) -> &str {
        match self {
            Source::Local => "local index",
            Source::Web => "web",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-collection retrieval configuration.
///
/// `min_hits` and `min_score` are always taken from here, never inferred
/// from the query at call time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollectionPolicy {
    pub min_hits: usize,
    pub min_score: f32,
    pub top_k: usize,
    /// Fixed embedding dimension; `None` lets the first stored document decide.
    pub embedding_dimension: Option<usize>,
}

impl Default for CollectionPolicy {
    fn default() -> Self {
        Self {
            min_hits: 3,
            min_score: 0.6,
            top_k: 5,
            embedding_dimension: None,
        }
    }
}

impl CollectionPolicy {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.top_k == 0 {
            return Err(DomainError::ZeroTopK);
        }
        if !(-1.0..=1.0).contains(&self.min_score) || self.min_score.is_nan() {
            return Err(DomainError::InvalidThreshold {
                name: "min_score",
                value: self.min_score,
            });
        }
        Ok(())
    }
}

/// A retrieval request (Value Object, never persisted)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    pub collection: String,
    pub top_k: usize,
    pub min_score: f32,
    pub min_hits: usize,
}

impl Query {
    /// Build a query for `collection` using that collection's thresholds.
    pub fn new(
        text: impl Into<String>,
        collection: impl Into<String>,
        policy: &CollectionPolicy,
    ) -> Result<Self, DomainError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DomainError::EmptyQuery);
        }
        policy.validate()?;
        Ok(Self {
            text,
            collection: collection.into(),
            top_k: policy.top_k,
            min_score: policy.min_score,
            min_hits: policy.min_hits,
        })
    }
}

/// One ranked item handed to an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub source: Source,
    /// Document id for local results, URL for web results
    pub id_or_url: String,
    pub title: String,
    pub snippet: String,
    pub score: f32,
    /// 1-based position in the merged list (0 until merged)
    pub rank: usize,
}

impl RetrievalResult {
    pub fn local(
        id: impl Into<String>,
        title: impl Into<String>,
        snippet: impl Into<String>,
        score: f32,
    ) -> Self {
        Self {
            source: Source::Local,
            id_or_url: id.into(),
            title: title.into(),
            snippet: snippet.into(),
            score,
            rank: 0,
        }
    }

    pub fn web(
        url: impl Into<String>,
        title: impl Into<String>,
        snippet: impl Into<String>,
        score: f32,
    ) -> Self {
        Self {
            source: Source::Web,
            id_or_url: url.into(),
            title: title.into(),
            snippet: snippet.into(),
            score,
            rank: 0,
        }
    }

    pub fn with_rank(mut self, rank: usize) -> Self {
        self.rank = rank;
        self
    }

    pub fn is_local(&self) -> bool {
        self.source == Source::Local
    }
}

/// Output of one retrieval call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalOutcome {
    /// Ranked, de-duplicated, capped results
    pub results: Vec<RetrievalResult>,
    /// Escalation was attempted but the web tool failed; results are local-only
    pub degraded: bool,
    /// Web search was invoked
    pub escalated: bool,
    /// The local collection could not be reached and counted as zero hits
    pub local_unavailable: bool,
}

impl RetrievalOutcome {
    pub fn local_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_local()).count()
    }

    pub fn web_count(&self) -> usize {
        self.results.iter().filter(|r| !r.is_local()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
