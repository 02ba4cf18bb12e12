//! Fusion types

use serde::{Deserialize, Serialize};

use crate::features::FeatureSnapshot;

/// Final action for an entity
///
/// Wire encoding is the action index (0/1/2), matching the policy model's
/// output space and the ledger's action column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Allow,
    Throttle,
    Block,
}

/// Action taken when any upstream signal is unavailable: the most
/// restrictive non-blocking action.
pub const FALLBACK_ACTION: Action = Action::Throttle;

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Allow => "allow",
            Action::Throttle => "throttle",
            Action::Block => "block",
        }
    }

    /// Ledger / policy-model index
    pub fn index(&self) -> i16 {
        match self {
            Action::Allow => 0,
            Action::Throttle => 1,
            Action::Block => 2,
        }
    }

    /// Decode a policy-model action index
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Action::Allow),
            1 => Some(Action::Throttle),
            2 => Some(Action::Block),
            _ => None,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why the fallback path was taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// Entity has no recorded features at all
    NoFeatures,
    /// Risk scorer failed, timed out, or returned an out-of-range score
    RiskUnavailable,
    /// Policy model failed, timed out, or returned an unknown action
    PolicyUnavailable,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::NoFeatures => "no recorded features",
            FallbackReason::RiskUnavailable => "risk signal unavailable",
            FallbackReason::PolicyUnavailable => "policy signal unavailable",
        }
    }
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of fusing the upstream signals for one entity
///
/// Always well-formed: a fallback is a tagged variant of the result, not
/// an error.
#[derive(Debug, Clone)]
pub struct FusedDecision {
    pub action: Action,
    pub risk: Option<f64>,
    /// Snapshot the decision was based on (absent on the no-features path)
    pub snapshot: Option<FeatureSnapshot>,
    /// Set when the fallback path produced this decision
    pub fallback: Option<FallbackReason>,
    /// Name of the rule that overrode the policy action, if any
    pub matched_rule: Option<&'static str>,
}

impl FusedDecision {
    pub fn fallback(reason: FallbackReason) -> Self {
        Self {
            action: FALLBACK_ACTION,
            risk: None,
            snapshot: None,
            fallback: Some(reason),
            matched_rule: None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}
