//! Prompt domain
//!
//! System prompts per agent domain and helpers that lay out retrieved
//! context and conversation history for the generation backend.

mod template;

pub use template::DomainPromptTemplate;
