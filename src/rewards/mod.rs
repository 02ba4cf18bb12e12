//! Outcome reward mapping
//!
//! Deterministic mapping from (action, observed outcome) to the scalar
//! reward consumed by offline policy retraining. The table is fixed
//! policy; pairs it does not model earn a mild penalty.

use serde::{Deserialize, Serialize};

use crate::fusion::Action;

/// Reward for any (action, outcome) pair the table does not model
pub const DEFAULT_REWARD: f64 = -0.1;

/// Ground-truth outcome for a past decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    Fraud,
    FalsePositive,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Success => "success",
            OutcomeKind::Fraud => "fraud",
            OutcomeKind::FalsePositive => "false_positive",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "success" => Some(OutcomeKind::Success),
            "fraud" => Some(OutcomeKind::Fraud),
            "false_positive" => Some(OutcomeKind::FalsePositive),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Map an action/outcome pair to its reward. Pure function.
pub fn reward_for(action: Action, outcome: OutcomeKind) -> f64 {
    match (action, outcome) {
        (Action::Allow, OutcomeKind::Success) => 1.0,
        (Action::Allow, OutcomeKind::Fraud) => -5.0,
        (Action::Block, OutcomeKind::Fraud) => 2.0,
        (Action::Block, OutcomeKind::Success) => -3.0,
        (Action::Throttle, OutcomeKind::Success) => -0.1,
        (Action::Throttle, OutcomeKind::Fraud) => -0.1,
        _ => DEFAULT_REWARD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reward_table_exact_values() {
        assert_eq!(reward_for(Action::Allow, OutcomeKind::Success), 1.0);
        assert_eq!(reward_for(Action::Allow, OutcomeKind::Fraud), -5.0);
        assert_eq!(reward_for(Action::Block, OutcomeKind::Fraud), 2.0);
        assert_eq!(reward_for(Action::Block, OutcomeKind::Success), -3.0);
        assert_eq!(reward_for(Action::Throttle, OutcomeKind::Success), -0.1);
        assert_eq!(reward_for(Action::Throttle, OutcomeKind::Fraud), -0.1);
    }

    #[test]
    fn test_unmapped_pairs_use_default_penalty() {
        for action in [Action::Allow, Action::Throttle, Action::Block] {
            assert_eq!(
                reward_for(action, OutcomeKind::FalsePositive),
                DEFAULT_REWARD
            );
        }
    }

    #[test]
    fn test_mapping_is_pure() {
        let first = reward_for(Action::Block, OutcomeKind::Fraud);
        let second = reward_for(Action::Block, OutcomeKind::Fraud);
        assert_eq!(first, second);
    }

    #[test]
    fn test_outcome_parse_round_trip() {
        for outcome in [
            OutcomeKind::Success,
            OutcomeKind::Fraud,
            OutcomeKind::FalsePositive,
        ] {
            assert_eq!(OutcomeKind::parse(outcome.as_str()), Some(outcome));
        }
        assert!(OutcomeKind::parse("chargeback").is_none());
    }
}
