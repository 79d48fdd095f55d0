//! Agent response value object

use super::domain::AgentDomain;
use crate::retrieval::value_objects::RetrievalResult;
use serde::{Deserialize, Serialize};

/// Answer returned by an agent, with the results it was grounded on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub domain: AgentDomain,
    pub answer: String,
    pub sources: Vec<RetrievalResult>,
    /// Live web data was wanted but unavailable
    pub degraded: bool,
}

impl AgentResponse {
    pub fn local_sources(&self) -> impl Iterator<Item = &RetrievalResult> {
        self.sources.iter().filter(|s| s.is_local())
    }

    pub fn web_sources(&self) -> impl Iterator<Item = &RetrievalResult> {
        self.sources.iter().filter(|s| !s.is_local())
    }
}
