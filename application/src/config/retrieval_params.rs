//! Retrieval parameters: shared knobs of the fallback decision engine.
//!
//! [`RetrievalParams`] holds the settings that apply to every collection:
//! the merged-list cap and the threshold policy. Per-collection thresholds
//! live in [`CollectionPolicy`](rag_domain::CollectionPolicy); the escalation
//! timeout is the `web_search` tool's own configured timeout.

use rag_domain::EscalationPolicy;
use serde::{Deserialize, Serialize};

/// Default cap on the merged result list handed to an agent.
pub const DEFAULT_MAX_RESULTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalParams {
    /// Maximum merged results returned to an agent.
    pub max_results: usize,
    /// Threshold comparator and combinator.
    pub policy: EscalationPolicy,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            policy: EscalationPolicy::default(),
        }
    }
}

impl RetrievalParams {
    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    pub fn with_policy(mut self, policy: EscalationPolicy) -> Self {
        self.policy = policy;
        self
    }
}
