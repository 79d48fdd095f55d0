//! Prompt templates for domain agents

use crate::agent::context::Turn;
use crate::agent::domain::AgentDomain;
use crate::core::string::truncate;
use crate::retrieval::value_objects::RetrievalResult;

/// Maximum characters of a single history message quoted back to the model
const HISTORY_MESSAGE_LIMIT: usize = 600;

/// Templates for generating prompts for each agent domain
pub struct DomainPromptTemplate;

impl DomainPromptTemplate {
    /// Default system prompt for a domain. `{domain}` is substituted by the
    /// agent profile when rendered.
    pub fn system_for(domain: AgentDomain) -> &'static str {
        match domain {
            AgentDomain::Marketing => {
                r#"You are a marketing strategist answering {domain} questions.
Ground every claim in the provided context. Prefer concrete figures, audiences and channels.
When the context is thin or outdated, say so instead of guessing."#
            }
            AgentDomain::Patent => {
                r#"You are a patent analyst answering {domain} questions.
Cite patent numbers, assignees and filing dates from the provided context when available.
Do not offer legal advice; describe prior art and claims factually."#
            }
            AgentDomain::Team => {
                r#"You are an organizational advisor answering {domain} questions.
Use the provided context about people, roles and hiring plans. Keep answers practical."#
            }
            AgentDomain::Competitive => {
                r#"You are a competitive intelligence analyst answering {domain} questions.
Compare products, pricing and positioning using only the provided context.
Flag information that may be stale."#
            }
            AgentDomain::Policy => {
                r#"You are a policy and compliance specialist answering {domain} questions.
Quote the relevant rule or regulation from the provided context and explain how it applies."#
            }
            AgentDomain::PitchDeck => {
                r#"You are a startup advisor helping with {domain} content.
Draft concise, investor-ready statements backed by the provided context."#
            }
            AgentDomain::Chat => {
                r#"You are a helpful assistant in an ongoing conversation.
Use the provided context and the conversation so far. Be concise and admit uncertainty."#
            }
        }
    }

    /// Numbered context block built from merged retrieval results.
    ///
    /// Each entry is labelled with its provenance so the model can tell
    /// indexed knowledge from live web data.
    pub fn context_block(results: &[RetrievalResult]) -> String {
        if results.is_empty() {
            return "No supporting context was found.".to_string();
        }

        let mut block = String::from("Context:\n");
        for result in results {
            block.push_str(&format!(
                "\n[{}] ({}) {}\n{}\nSource: {}\n",
                result.rank,
                result.source.label(),
                result.title,
                result.snippet,
                result.id_or_url
            ));
        }
        block
    }

    /// Prior turns rendered as a transcript, oldest first
    pub fn history_block<'a>(turns: impl IntoIterator<Item = &'a Turn>) -> String {
        let mut block = String::new();
        for turn in turns {
            block.push_str(&format!(
                "User: {}\nAssistant: {}\n",
                truncate(&turn.user, HISTORY_MESSAGE_LIMIT),
                truncate(&turn.assistant, HISTORY_MESSAGE_LIMIT)
            ));
        }
        block
    }

    /// Full user prompt: history (if any), context, then the question.
    pub fn user_prompt(question: &str, results: &[RetrievalResult], history: &[Turn]) -> String {
        let mut prompt = String::new();

        if !history.is_empty() {
            prompt.push_str("Conversation so far:\n");
            prompt.push_str(&Self::history_block(history));
            prompt.push('\n');
        }

        prompt.push_str(&Self::context_block(results));
        prompt.push_str(&format!("\nQuestion: {}\n", question));
        prompt.push_str("\nAnswer using the context above. Refer to sources by their number.");
        prompt
    }
}
