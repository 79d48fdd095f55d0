//! Domain layer for hybrid-rag
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Hybrid Retrieval
//!
//! Every question is first answered from the locally indexed knowledge base.
//! When the local hits are judged insufficient by the [`EscalationPolicy`],
//! the question is **escalated** to the external `web_search` tool and the two
//! result sets are merged into one ranked, de-duplicated list.
//!
//! ## Domain Agents
//!
//! Each [`AgentDomain`] (marketing, patent, team, ...) is backed by an
//! [`AgentProfile`] naming its collection, prompt template, allowed tools and
//! retrieval thresholds. Only the chat domain keeps a [`ConversationHistory`].

pub mod agent;
pub mod core;
pub mod prompt;
pub mod retrieval;
pub mod tool;

// Re-export commonly used types
pub use agent::{
    context::{AgentContext, ConversationHistory, Turn},
    domain::AgentDomain,
    profile::AgentProfile,
    response::AgentResponse,
};
pub use core::error::DomainError;
pub use prompt::DomainPromptTemplate;
pub use retrieval::{
    entities::{Document, Metadata, MetadataValue},
    merge::{merge_results, normalize_identifier},
    policy::{EscalationDecision, EscalationPolicy, ThresholdCombine, ThresholdComparison},
    value_objects::{CollectionPolicy, Query, RetrievalOutcome, RetrievalResult, Source},
};
pub use tool::{
    entities::{ToolCall, ToolDefinition, ToolParameter, ToolSpec},
    provider::{ProviderError, ToolProvider},
    traits::{DefaultToolValidator, ToolValidator},
    value_objects::{ToolResponse, WebSearchItem},
};
