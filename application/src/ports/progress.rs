//! Progress notification port
//!
//! Defines the interface for reporting progress while a question is being
//! answered.

use rag_domain::AgentDomain;

/// Callback for progress updates during one agent response
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (spinner, plain log lines, ...).
pub trait ProgressNotifier: Send + Sync {
    /// Called before local retrieval starts
    fn on_retrieval_start(&self, _domain: AgentDomain, _collection: &str) {}

    /// Called when the retriever escalates to web search
    fn on_escalation(&self, _tool: &str) {}

    /// Called when retrieval finished, with the merged result count
    fn on_retrieval_complete(&self, _results: usize, _degraded: bool) {}

    /// Called before the generation backend is invoked
    fn on_generation_start(&self) {}

    /// Called when the answer is ready (or generation failed)
    fn on_complete(&self, _success: bool) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {}
