//! Port for structured conversation logging.
//!
//! Defines the [`ConversationLogger`] trait for recording conversation events
//! (questions, retrieval decisions, answers) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the full
//! exchange in a machine-readable format (JSONL).

use rag_domain::{AgentDomain, RetrievalOutcome};
use serde_json::{Value, json};

/// Event type of a finished retrieval
pub const RETRIEVAL_EVENT: &str = "retrieval";
/// Event type of a delivered answer
pub const AGENT_RESPONSE_EVENT: &str = "agent_response";

/// A structured conversation event for logging.
///
/// Each event has a type string and a JSON payload containing
/// event-specific fields. The adapter adds the timestamp.
pub struct ConversationEvent {
    /// Event type identifier, one of the `*_EVENT` constants for built-in events
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }

    /// The escalation decision and result mix of one retrieval
    pub fn retrieval(domain: AgentDomain, collection: &str, outcome: &RetrievalOutcome) -> Self {
        Self::new(
            RETRIEVAL_EVENT,
            json!({
                "domain": domain.as_str(),
                "collection": collection,
                "escalated": outcome.escalated,
                "degraded": outcome.degraded,
                "local_unavailable": outcome.local_unavailable,
                "local": outcome.local_count(),
                "web": outcome.web_count(),
            }),
        )
    }

    /// A delivered answer with the identifiers of its sources
    pub fn agent_response(
        domain: AgentDomain,
        question: &str,
        answer: &str,
        outcome: &RetrievalOutcome,
    ) -> Self {
        let sources: Vec<&str> = outcome.results.iter().map(|r| r.id_or_url.as_str()).collect();
        Self::new(
            AGENT_RESPONSE_EVENT,
            json!({
                "domain": domain.as_str(),
                "question": question,
                "answer": answer,
                "sources": sources,
                "degraded": outcome.degraded,
            }),
        )
    }
}

/// Port for logging conversation events to a structured log.
///
/// Implementations write each event as a single record (e.g., one JSONL line).
/// `log` is synchronous and infallible; write failures are dropped.
pub trait ConversationLogger: Send + Sync {
    /// Record a conversation event.
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
