//! Agent use case: one domain-specialized responder per [`AgentDomain`].
//!
//! An agent turns a question into an answer with provenance:
//!
//! 1. Build a [`Query`] from the profile's collection and thresholds.
//! 2. Retrieve (hybrid when `web_search` is an allowed tool, local-only otherwise).
//!    A degraded retrieval with no results at all ends here with
//!    [`AgentError::NoContext`]; the backend is not called.
//! 3. Call the generation backend with the rendered prompt, the merged
//!    results and, for the chat agent, the conversation history.
//! 4. Chat only: append the completed turn to the session's history.

use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::generation::{GenerationBackend, GenerationError, GenerationRequest};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::retrieve::{RetrievalError, RetrievalMode, Retriever};
use crate::use_cases::shared::check_cancelled;
use async_trait::async_trait;
use rag_domain::core::string::truncate;
use rag_domain::tool::WEB_SEARCH;
use rag_domain::{
    AgentContext, AgentDomain, AgentProfile, AgentResponse, DomainError, Query, Turn,
};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Errors that can occur while an agent responds
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    #[error("Query text cannot be empty")]
    EmptyQuery,

    #[error("Session belongs to the {actual} agent, not {expected}")]
    DomainMismatch {
        expected: AgentDomain,
        actual: AgentDomain,
    },

    #[error("Invalid agent configuration: {0}")]
    Configuration(DomainError),

    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("No context for {0}: nothing found locally and web search unavailable")]
    NoContext(AgentDomain),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Cancelled")]
    Cancelled,
}

impl AgentError {
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            AgentError::Cancelled | AgentError::Retrieval(RetrievalError::Cancelled)
        )
    }
}

impl From<DomainError> for AgentError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::EmptyQuery => AgentError::EmptyQuery,
            DomainError::Cancelled => AgentError::Cancelled,
            other => AgentError::Configuration(other),
        }
    }
}

/// A domain agent.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Static configuration of this agent
    fn profile(&self) -> &AgentProfile;

    fn domain(&self) -> AgentDomain {
        self.profile().domain
    }

    /// Answer `query` within the session `context`.
    async fn respond_with(
        &self,
        query: &str,
        context: &mut AgentContext,
        progress: &dyn ProgressNotifier,
        cancel: &CancellationToken,
    ) -> Result<AgentResponse, AgentError>;

    /// Answer without progress reporting or cancellation.
    async fn respond(
        &self,
        query: &str,
        context: &mut AgentContext,
    ) -> Result<AgentResponse, AgentError> {
        self.respond_with(query, context, &NoProgress, &CancellationToken::new())
            .await
    }
}

/// The agent implementation shared by every domain; behaviour differs only
/// through the [`AgentProfile`] and whether the domain is multi-turn.
pub struct DomainAgent {
    profile: AgentProfile,
    retriever: Arc<Retriever>,
    backend: Arc<dyn GenerationBackend>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl DomainAgent {
    pub fn new(
        profile: AgentProfile,
        retriever: Arc<Retriever>,
        backend: Arc<dyn GenerationBackend>,
    ) -> Self {
        Self {
            profile,
            retriever,
            backend,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    fn retrieval_mode(&self) -> RetrievalMode {
        if self.profile.can_escalate() {
            RetrievalMode::Hybrid
        } else {
            RetrievalMode::LocalOnly
        }
    }
}

#[async_trait]
impl Agent for DomainAgent {
    fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    async fn respond_with(
        &self,
        query: &str,
        context: &mut AgentContext,
        progress: &dyn ProgressNotifier,
        cancel: &CancellationToken,
    ) -> Result<AgentResponse, AgentError> {
        let domain = self.profile.domain;
        if context.domain != domain {
            return Err(AgentError::DomainMismatch {
                expected: domain,
                actual: context.domain,
            });
        }
        if query.trim().is_empty() {
            return Err(AgentError::EmptyQuery);
        }

        info!(domain = %domain, "Answering: {}", truncate(query, 100));

        let query = Query::new(query, &self.profile.collection, &self.profile.policy)?;

        progress.on_retrieval_start(domain, &query.collection);
        let mode = self.retrieval_mode();
        if mode == RetrievalMode::LocalOnly {
            debug!(domain = %domain, "{} not allowed, retrieving locally only", WEB_SEARCH);
        }

        let outcome = self.retriever.retrieve(&query, mode, cancel).await?;
        if outcome.escalated {
            progress.on_escalation(WEB_SEARCH);
        }
        progress.on_retrieval_complete(outcome.results.len(), outcome.degraded);

        self.conversation_logger
            .log(ConversationEvent::retrieval(domain, &query.collection, &outcome));

        if outcome.degraded && outcome.results.is_empty() {
            progress.on_complete(false);
            return Err(AgentError::NoContext(domain));
        }

        let history = if domain.is_multi_turn() {
            context.conversation_history.to_vec()
        } else {
            Vec::new()
        };

        let request = GenerationRequest {
            prompt: self.profile.render_prompt(),
            question: query.text.clone(),
            context_items: outcome.results.clone(),
            history,
        };

        check_cancelled(cancel, AgentError::Cancelled)?;
        progress.on_generation_start();

        let generated = tokio::select! {
            _ = cancel.cancelled() => {
                progress.on_complete(false);
                return Err(AgentError::Cancelled);
            }
            result = self.backend.generate(&request) => result,
        };
        let answer = match generated {
            Ok(response) => response.text,
            Err(e) => {
                progress.on_complete(false);
                return Err(AgentError::Generation(e));
            }
        };
        progress.on_complete(true);

        context.merged_results = outcome.results.clone();
        if domain.is_multi_turn() {
            context
                .conversation_history
                .append(Turn::new(query.text.clone(), answer.clone()));
        }

        self.conversation_logger.log(ConversationEvent::agent_response(
            domain,
            &query.text,
            &answer,
            &outcome,
        ));

        Ok(AgentResponse {
            domain,
            answer,
            sources: outcome.results,
            degraded: outcome.degraded,
        })
    }
}
