//! Agent domain module
//!
//! Describes the fixed set of domain agents and the state they own:
//!
//! - [`AgentDomain`](domain::AgentDomain): the closed set of agent variants
//! - [`AgentProfile`](profile::AgentProfile): collection, prompt, tools, thresholds
//! - [`AgentContext`](context::AgentContext): session-owned history and last results
//! - [`AgentResponse`](response::AgentResponse): answer plus provenance
//!
//! Only [`AgentDomain::Chat`](domain::AgentDomain::Chat) is multi-turn; every
//! other domain is single-shot and never writes to the conversation history.

pub mod context;
pub mod domain;
pub mod profile;
pub mod response;

pub use context::{AgentContext, ConversationHistory, Turn};
pub use domain::AgentDomain;
pub use profile::AgentProfile;
pub use response::AgentResponse;
