//! Escalation policy: when local retrieval is judged insufficient
//!
//! The decision is a pure function of the local scores and the query's two
//! thresholds. It keeps no state between calls.
//!
//! | Comparison | count condition | score condition |
//! |------------|-----------------|-----------------|
//! | `Strict` (default) | `hits < min_hits` | `best < min_score` |
//! | `Inclusive` | `hits <= min_hits` | `best <= min_score` |
//!
//! The two conditions are OR'd (`ThresholdCombine::Any`, default) or AND'd
//! (`ThresholdCombine::All`). An empty hit list has no best score, which
//! always counts as a failed score condition.

use serde::{Deserialize, Serialize};

/// How a value is compared against its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdComparison {
    /// Insufficient when strictly below the threshold
    #[default]
    Strict,
    /// Insufficient when at or below the threshold
    Inclusive,
}

impl ThresholdComparison {
    fn below<T: PartialOrd>(&self, value: T, threshold: T) -> bool {
        match self {
            ThresholdComparison::Strict => value < threshold,
            ThresholdComparison::Inclusive => value <= threshold,
        }
    }
}

/// How the count and score conditions are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdCombine {
    /// Escalate when either condition fails
    #[default]
    Any,
    /// Escalate only when both conditions fail
    All,
}

/// Result of evaluating the policy against one local result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationDecision {
    pub escalate: bool,
    pub too_few_hits: bool,
    pub score_too_low: bool,
}

/// Deterministic local-vs-web decision rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationPolicy {
    pub comparison: ThresholdComparison,
    pub combine: ThresholdCombine,
}

impl EscalationPolicy {
    pub fn new(comparison: ThresholdComparison, combine: ThresholdCombine) -> Self {
        Self {
            comparison,
            combine,
        }
    }

    /// Decide from the scores of the local hits.
    pub fn decide(&self, local_scores: &[f32], min_hits: usize, min_score: f32) -> EscalationDecision {
        let too_few_hits = self.comparison.below(local_scores.len(), min_hits);
        let score_too_low = local_scores
            .iter()
            .copied()
            .reduce(f32::max)
            .is_none_or(|best| self.comparison.below(best, min_score));

        let escalate = match self.combine {
            ThresholdCombine::Any => too_few_hits || score_too_low,
            ThresholdCombine::All => too_few_hits && score_too_low,
        };

        EscalationDecision {
            escalate,
            too_few_hits,
            score_too_low,
        }
    }
}
