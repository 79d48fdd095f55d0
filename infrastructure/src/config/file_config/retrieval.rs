//! Retrieval configuration from TOML (`[retrieval]` section)
//!
//! ```toml
//! [retrieval]
//! max_results = 10
//!
//! [retrieval.policy]
//! comparison = "strict"   # or "inclusive"
//! combine = "any"         # or "all"
//! ```
//!
//! The escalation timeout is `[tools.web_search] timeout_ms`.

use rag_application::RetrievalParams;
use rag_application::config::DEFAULT_MAX_RESULTS;
use rag_domain::EscalationPolicy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetrievalConfig {
    /// Cap on the merged result list
    pub max_results: usize,
    /// Threshold comparator and combinator
    pub policy: EscalationPolicy,
}

impl Default for FileRetrievalConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            policy: EscalationPolicy::default(),
        }
    }
}

impl FileRetrievalConfig {
    pub fn to_params(&self) -> RetrievalParams {
        RetrievalParams::default()
            .with_max_results(self.max_results)
            .with_policy(self.policy)
    }
}
