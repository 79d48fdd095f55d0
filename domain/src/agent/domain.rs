//! Agent domains

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The closed set of domain agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentDomain {
    Marketing,
    Patent,
    Team,
    Competitive,
    Policy,
    PitchDeck,
    Chat,
}

impl AgentDomain {
    pub const ALL: [AgentDomain; 7] = [
        AgentDomain::Marketing,
        AgentDomain::Patent,
        AgentDomain::Team,
        AgentDomain::Competitive,
        AgentDomain::Policy,
        AgentDomain::PitchDeck,
        AgentDomain::Chat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentDomain::Marketing => "marketing",
            AgentDomain::Patent => "patent",
            AgentDomain::Team => "team",
            AgentDomain::Competitive => "competitive",
            AgentDomain::Policy => "policy",
            AgentDomain::PitchDeck => "pitch-deck",
            AgentDomain::Chat => "chat",
        }
    }

    /// Default collection name backing this domain.
    pub fn default_collection(&self) -> &'static str {
        match self {
            AgentDomain::PitchDeck => "pitch_deck",
            AgentDomain::Chat => "general",
            other => other.as_str(),
        }
    }

    /// Whether the agent keeps conversation history across calls.
    pub fn is_multi_turn(&self) -> bool {
        matches!(self, AgentDomain::Chat)
    }
}

impl std::fmt::Display for AgentDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AgentDomain {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "marketing" => Ok(AgentDomain::Marketing),
            "patent" => Ok(AgentDomain::Patent),
            "team" => Ok(AgentDomain::Team),
            "competitive" => Ok(AgentDomain::Competitive),
            "policy" => Ok(AgentDomain::Policy),
            "pitch-deck" | "pitch_deck" | "pitch" => Ok(AgentDomain::PitchDeck),
            "chat" => Ok(AgentDomain::Chat),
            _ => Err(DomainError::UnknownDomain(s.to_string())),
        }
    }
}
