//! Session-owned agent state

use super::domain::AgentDomain;
use crate::retrieval::value_objects::RetrievalResult;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of turns retained by a [`ConversationHistory`].
pub const DEFAULT_MAX_TURNS: usize = 20;

/// One completed exchange in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub user: String,
    pub assistant: String,
}

impl Turn {
    pub fn new(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            assistant: assistant.into(),
        }
    }
}

/// Append-only, bounded conversation log.
///
/// When the log is full the oldest turn is evicted. The retained maximum is
/// at least one, so the turn just appended is always kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationHistory {
    turns: VecDeque<Turn>,
    max_turns: usize,
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TURNS)
    }
}

impl ConversationHistory {
    pub fn new(max_turns: usize) -> Self {
        Self {
            turns: VecDeque::new(),
            max_turns: max_turns.max(1),
        }
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.max_turns {
            self.turns.pop_front();
        }
    }

    pub fn turns(&self) -> impl ExactSizeIterator<Item = &Turn> {
        self.turns.iter()
    }

    /// Owned copy of the retained turns, oldest first.
    pub fn to_vec(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

/// State owned by exactly one session for the duration of a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentContext {
    pub domain: AgentDomain,
    pub conversation_history: ConversationHistory,
    /// Results behind the most recent answer
    pub merged_results: Vec<RetrievalResult>,
}

impl AgentContext {
    pub fn new(domain: AgentDomain) -> Self {
        Self::with_max_turns(domain, DEFAULT_MAX_TURNS)
    }

    pub fn with_max_turns(domain: AgentDomain, max_turns: usize) -> Self {
        Self {
            domain,
            conversation_history: ConversationHistory::new(max_turns),
            merged_results: Vec::new(),
        }
    }

    /// Reset history and results, keeping the domain and history bound.
    pub fn reset(&mut self) {
        self.conversation_history.clear();
        self.merged_results.clear();
    }
}
