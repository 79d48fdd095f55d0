//! Retrieval domain module
//!
//! Pure definitions for the **Hybrid Retrieval** flow: what is stored in the
//! local index, what a query asks for, when the query escalates to the web,
//! and how local and web results are merged.
//!
//! ```text
//! Query ──▶ local hits ──▶ EscalationPolicy::decide ──┬─▶ (no) local only
//!                                                     └─▶ (yes) + web hits
//!                                   merge_results ◀──────────────┘
//!                                        │
//!                                        ▼
//!                                 RetrievalOutcome
//! ```
//!
//! # Key Types
//!
//! - [`Document`](entities::Document): an indexed text with its embedding and metadata
//! - [`Query`](value_objects::Query): per-call request carrying collection thresholds
//! - [`RetrievalResult`](value_objects::RetrievalResult): one ranked item with provenance
//! - [`EscalationPolicy`](policy::EscalationPolicy): deterministic local-vs-web decision
//! - [`merge_results`](merge::merge_results): rank, de-duplicate, cap

pub mod entities;
pub mod merge;
pub mod policy;
pub mod value_objects;

pub use entities::{Document, Metadata, MetadataValue};
pub use merge::{merge_results, normalize_identifier};
pub use policy::{EscalationDecision, EscalationPolicy};
pub use value_objects::{CollectionPolicy, Query, RetrievalOutcome, RetrievalResult, Source};
