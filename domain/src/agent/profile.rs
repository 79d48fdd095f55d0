//! Agent profile: the static configuration of one domain agent

use super::domain::AgentDomain;
use crate::prompt::DomainPromptTemplate;
use crate::retrieval::value_objects::CollectionPolicy;
use crate::tool::value_objects::WEB_SEARCH;
use serde::{Deserialize, Serialize};

/// Configuration of one domain agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub domain: AgentDomain,
    /// Collection searched for local knowledge
    pub collection: String,
    /// System prompt template; `{domain}` is substituted at request time
    pub prompt_template: String,
    /// Tool names this agent may invoke
    pub allowed_tools: Vec<String>,
    /// Retrieval thresholds copied from the collection's configuration
    pub policy: CollectionPolicy,
}

impl AgentProfile {
    /// Default profile for a domain: its default collection, its built-in
    /// prompt, `web_search` allowed, default thresholds.
    pub fn for_domain(domain: AgentDomain) -> Self {
        Self {
            domain,
            collection: domain.default_collection().to_string(),
            prompt_template: DomainPromptTemplate::system_for(domain).to_string(),
            allowed_tools: vec![WEB_SEARCH.to_string()],
            policy: CollectionPolicy::default(),
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn with_policy(mut self, policy: CollectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = template.into();
        self
    }

    pub fn with_allowed_tools(mut self, tools: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.allowed_tools = tools.into_iter().map(Into::into).collect();
        self
    }

    pub fn allows_tool(&self, name: &str) -> bool {
        self.allowed_tools.iter().any(|t| t == name)
    }

    /// Whether retrieval for this agent may escalate to the web.
    pub fn can_escalate(&self) -> bool {
        self.allows_tool(WEB_SEARCH)
    }

    pub fn min_hits(&self) -> usize {
        self.policy.min_hits
    }

    pub fn min_score(&self) -> f32 {
        self.policy.min_score
    }

    /// The prompt template with the domain name substituted.
    pub fn render_prompt(&self) -> String {
        self.prompt_template.replace("{domain}", self.domain.as_str())
    }
}
