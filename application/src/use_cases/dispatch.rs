//! Dispatch use case: routes a domain identifier to its agent.

use crate::ports::embedder::Embedder;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::vector_index::VectorIndex;
use crate::use_cases::agent::{Agent, AgentError};
use rag_domain::agent::context::DEFAULT_MAX_TURNS;
use rag_domain::{AgentContext, AgentDomain, AgentResponse, DomainError};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Errors that can occur while dispatching a question
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("Unknown domain: {0}")]
    UnknownDomain(String),

    #[error(transparent)]
    Agent(#[from] AgentError),
}

impl From<DomainError> for DispatchError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::UnknownDomain(name) => DispatchError::UnknownDomain(name),
            other => DispatchError::Agent(AgentError::from(other)),
        }
    }
}

/// Explicit registry of domain agents.
///
/// Owns the process-wide embedder and vector index. Agents reach them
/// through their retriever, built from the same handles; ingestion and
/// status reporting reach them through [`Self::embedder`] and
/// [`Self::index`].
pub struct Dispatcher {
    agents: HashMap<AgentDomain, Arc<dyn Agent>>,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    max_history_turns: usize,
}

impl Dispatcher {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            agents: HashMap::new(),
            embedder,
            index,
            max_history_turns: DEFAULT_MAX_TURNS,
        }
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    /// Bound applied to the history of sessions created by [`Self::new_session`].
    pub fn with_max_history_turns(mut self, max_turns: usize) -> Self {
        self.max_history_turns = max_turns;
        self
    }

    /// Register an agent under its own domain, replacing any previous one.
    pub fn register(mut self, agent: Arc<dyn Agent>) -> Self {
        self.agents.insert(agent.domain(), agent);
        self
    }

    /// Parse an identifier such as `"Pitch_Deck"` and look up its agent.
    pub fn resolve(&self, identifier: &str) -> Result<&Arc<dyn Agent>, DispatchError> {
        let domain: AgentDomain = identifier.parse()?;
        self.agent(domain)
    }

    pub fn agent(&self, domain: AgentDomain) -> Result<&Arc<dyn Agent>, DispatchError> {
        self.agents
            .get(&domain)
            .ok_or_else(|| DispatchError::UnknownDomain(domain.to_string()))
    }

    /// Registered domains in declaration order
    pub fn domains(&self) -> Vec<AgentDomain> {
        let mut domains: Vec<AgentDomain> = self.agents.keys().copied().collect();
        domains.sort();
        domains
    }

    /// Collection searched by a domain's agent
    pub fn collection_for(&self, domain: AgentDomain) -> Result<&str, DispatchError> {
        Ok(self.agent(domain)?.profile().collection.as_str())
    }

    /// Empty session state for `domain`
    pub fn new_session(&self, domain: AgentDomain) -> Result<AgentContext, DispatchError> {
        self.agent(domain)?;
        Ok(AgentContext::with_max_turns(domain, self.max_history_turns))
    }

    /// Route a question to the agent of the session's domain.
    pub async fn dispatch(
        &self,
        query: &str,
        context: &mut AgentContext,
    ) -> Result<AgentResponse, DispatchError> {
        self.dispatch_with(query, context, &NoProgress, &CancellationToken::new())
            .await
    }

    pub async fn dispatch_with(
        &self,
        query: &str,
        context: &mut AgentContext,
        progress: &dyn ProgressNotifier,
        cancel: &CancellationToken,
    ) -> Result<AgentResponse, DispatchError> {
        let agent = self.agent(context.domain)?;
        debug!(domain = %context.domain, "Dispatching question");
        Ok(agent.respond_with(query, context, progress, cancel).await?)
    }
}
