//! Rule overrides
//!
//! Deterministic overrides applied after the policy model proposes an
//! action. Rules are evaluated in fixed priority order; the first match
//! forces its action, no match leaves the policy action untouched.

use crate::features::FeatureSnapshot;

use super::types::Action;

/// Risk at or above this forces a block regardless of the policy action
pub const HARD_BLOCK_RISK: f64 = 0.9;

/// 1m event count at or above this forces a throttle
pub const BURST_THROTTLE_COUNT_1M: u64 = 120;

/// Threshold predicate over risk and features
///
/// Every bound present must hold for the rule to match, so a condition is
/// total over its inputs: it either matches or it does not, never partially.
#[derive(Debug, Clone, Default)]
pub struct Condition {
    pub min_risk: Option<f64>,
    pub max_risk: Option<f64>,
    pub min_count_1m: Option<u64>,
    pub min_count_5m: Option<u64>,
}

impl Condition {
    fn matches(&self, risk: f64, features: &FeatureSnapshot) -> bool {
        if let Some(min) = self.min_risk {
            if risk < min {
                return false;
            }
        }
        if let Some(max) = self.max_risk {
            if risk > max {
                return false;
            }
        }
        if let Some(min) = self.min_count_1m {
            if features.count_1m < min {
                return false;
            }
        }
        if let Some(min) = self.min_count_5m {
            if features.count_5m < min {
                return false;
            }
        }
        true
    }
}

/// One override: when the condition matches, the action is forced
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: &'static str,
    pub when: Condition,
    pub force: Action,
}

/// Ordered rule list
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Apply the first matching rule to the proposed action
    ///
    /// Returns the final action and the name of the rule that fired, if any.
    pub fn apply(
        &self,
        risk: f64,
        features: &FeatureSnapshot,
        proposed: Action,
    ) -> (Action, Option<&'static str>) {
        for rule in &self.rules {
            if rule.when.matches(risk, features) {
                return (rule.force, Some(rule.name));
            }
        }
        (proposed, None)
    }
}

impl Default for RuleSet {
    /// Built-in overrides: block on extreme risk, throttle on event bursts
    fn default() -> Self {
        Self::new(vec![
            Rule {
                name: "hard_block_high_risk",
                when: Condition {
                    min_risk: Some(HARD_BLOCK_RISK),
                    ..Default::default()
                },
                force: Action::Block,
            },
            Rule {
                name: "burst_throttle",
                when: Condition {
                    min_count_1m: Some(BURST_THROTTLE_COUNT_1M),
                    ..Default::default()
                },
                force: Action::Throttle,
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(count_1m: u64, count_5m: u64) -> FeatureSnapshot {
        FeatureSnapshot {
            count_1m,
            count_5m,
            avg_value_1m: 0.0,
            last_event_ts: None,
        }
    }

    #[test]
    fn test_no_match_keeps_policy_action() {
        let rules = RuleSet::default();
        let (action, matched) = rules.apply(0.5, &features(3, 10), Action::Allow);
        assert_eq!(action, Action::Allow);
        assert!(matched.is_none());
    }

    #[test]
    fn test_high_risk_forces_block() {
        let rules = RuleSet::default();
        let (action, matched) = rules.apply(0.95, &features(3, 10), Action::Allow);
        assert_eq!(action, Action::Block);
        assert_eq!(matched, Some("hard_block_high_risk"));
    }

    #[test]
    fn test_boundary_risk_matches() {
        let rules = RuleSet::default();
        let (action, _) = rules.apply(HARD_BLOCK_RISK, &features(0, 0), Action::Allow);
        assert_eq!(action, Action::Block);
    }

    #[test]
    fn test_burst_forces_throttle() {
        let rules = RuleSet::default();
        let (action, matched) = rules.apply(0.1, &features(500, 900), Action::Allow);
        assert_eq!(action, Action::Throttle);
        assert_eq!(matched, Some("burst_throttle"));
    }

    #[test]
    fn test_first_match_wins() {
        // Both rules match; the block rule is ordered first
        let rules = RuleSet::default();
        let (action, matched) = rules.apply(0.99, &features(500, 900), Action::Allow);
        assert_eq!(action, Action::Block);
        assert_eq!(matched, Some("hard_block_high_risk"));
    }

    #[test]
    fn test_empty_ruleset_is_identity() {
        let rules = RuleSet::empty();
        for proposed in [Action::Allow, Action::Throttle, Action::Block] {
            let (action, matched) = rules.apply(1.0, &features(1000, 1000), proposed);
            assert_eq!(action, proposed);
            assert!(matched.is_none());
        }
    }

    #[test]
    fn test_all_bounds_must_hold() {
        let rules = RuleSet::new(vec![Rule {
            name: "banded",
            when: Condition {
                min_risk: Some(0.4),
                max_risk: Some(0.6),
                min_count_1m: Some(10),
                ..Default::default()
            },
            force: Action::Block,
        }]);

        let (action, _) = rules.apply(0.5, &features(5, 5), Action::Allow);
        assert_eq!(action, Action::Allow);

        let (action, _) = rules.apply(0.5, &features(20, 20), Action::Allow);
        assert_eq!(action, Action::Block);

        let (action, _) = rules.apply(0.7, &features(20, 20), Action::Allow);
        assert_eq!(action, Action::Allow);
    }
}
