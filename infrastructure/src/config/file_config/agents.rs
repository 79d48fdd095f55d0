//! Agent configuration from TOML (`[agents]` section)
//!
//! ```toml
//! [agents]
//! max_history_turns = 20
//!
//! [agents.domains.patent]
//! collection = "patents_2024"
//! allowed_tools = ["web_search", "patent_lookup"]
//! min_score = 0.7
//!
//! [agents.domains.policy]
//! allowed_tools = []        # local-only
//! ```
//!
//! Thresholds set here override those of the agent's collection.

use rag_domain::agent::context::DEFAULT_MAX_TURNS;
use rag_domain::{AgentDomain, AgentProfile, CollectionPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Overrides for one domain agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentOverride {
    pub collection: Option<String>,
    pub prompt_template: Option<String>,
    pub allowed_tools: Option<Vec<String>>,
    pub min_hits: Option<usize>,
    pub min_score: Option<f32>,
    pub top_k: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentsConfig {
    /// Turns retained by the chat agent's history
    pub max_history_turns: usize,
    /// Per-domain overrides keyed by domain identifier
    pub domains: BTreeMap<String, FileAgentOverride>,
}

impl Default for FileAgentsConfig {
    fn default() -> Self {
        Self {
            max_history_turns: DEFAULT_MAX_TURNS,
            domains: BTreeMap::new(),
        }
    }
}

impl FileAgentsConfig {
    /// Override entry for `domain`, matching keys the way domain identifiers parse
    pub fn override_for(&self, domain: AgentDomain) -> Option<&FileAgentOverride> {
        self.domains
            .iter()
            .find(|(key, _)| key.parse::<AgentDomain>().ok() == Some(domain))
            .map(|(_, value)| value)
    }
}

impl FileAgentOverride {
    /// Apply these overrides on top of a profile whose policy came from its collection.
    pub fn apply(&self, mut profile: AgentProfile) -> AgentProfile {
        if let Some(template) = &self.prompt_template {
            profile = profile.with_prompt_template(template.clone());
        }
        if let Some(tools) = &self.allowed_tools {
            profile = profile.with_allowed_tools(tools.clone());
        }
        let policy = CollectionPolicy {
            min_hits: self.min_hits.unwrap_or(profile.policy.min_hits),
            min_score: self.min_score.unwrap_or(profile.policy.min_score),
            top_k: self.top_k.unwrap_or(profile.policy.top_k),
            embedding_dimension: profile.policy.embedding_dimension,
        };
        profile.with_policy(policy)
    }
}
