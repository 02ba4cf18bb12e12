//! Fusion engine
//!
//! Happy path: snapshot -> risk score -> policy action -> rule overrides.
//! Any missing-data or collaborator failure drops to the fallback path,
//! which needs no external dependency and cannot itself fail. `decide`
//! therefore always returns a well-formed decision.

use metrics::counter;

use crate::features::WindowStore;
use crate::telemetry::FALLBACK_DECISIONS;
use crate::signals::{Explainer, PolicyModel, RiskScorer, EXPLANATION_PLACEHOLDER};

use super::rules::RuleSet;
use super::types::{Action, FallbackReason, FusedDecision};

/// Fuses external signals into a final action
///
/// Collaborator handles are injected once at startup and held for the
/// engine's lifetime; swapping models means rebuilding the engine. The
/// engine owns no persistent state.
pub struct FusionEngine<R, P, E> {
    scorer: R,
    policy: P,
    explainer: E,
    rules: RuleSet,
}

impl<R: RiskScorer, P: PolicyModel, E: Explainer> FusionEngine<R, P, E> {
    pub fn new(scorer: R, policy: P, explainer: E, rules: RuleSet) -> Self {
        Self {
            scorer,
            policy,
            explainer,
            rules,
        }
    }

    /// Fuse the current signals for an entity into a final action
    pub async fn decide(&self, entity_id: &str, features: &WindowStore) -> FusedDecision {
        // Unknown entity is "no data", distinct from zero-valued aggregates
        let Some(snapshot) = features.get(entity_id) else {
            return self.fall_back(entity_id, FallbackReason::NoFeatures);
        };

        let risk = match self.scorer.score(entity_id, &snapshot).await {
            Ok(risk) if (0.0..=1.0).contains(&risk) => risk,
            Ok(risk) => {
                tracing::warn!("Risk scorer returned out-of-range score {} for {}", risk, entity_id);
                return self.fall_back(entity_id, FallbackReason::RiskUnavailable);
            }
            Err(err) => {
                tracing::warn!("Risk scorer failed for {}: {}", entity_id, err);
                return self.fall_back(entity_id, FallbackReason::RiskUnavailable);
            }
        };

        let proposed = match self.policy.act(snapshot.state_vector(risk)).await {
            Ok(index) => match Action::from_index(index) {
                Some(action) => action,
                None => {
                    tracing::warn!("Policy model returned unknown action {} for {}", index, entity_id);
                    return self.fall_back(entity_id, FallbackReason::PolicyUnavailable);
                }
            },
            Err(err) => {
                tracing::warn!("Policy model failed for {}: {}", entity_id, err);
                return self.fall_back(entity_id, FallbackReason::PolicyUnavailable);
            }
        };

        let (action, matched_rule) = self.rules.apply(risk, &snapshot, proposed);
        if let Some(rule) = matched_rule {
            tracing::debug!(
                "Rule {} overrode {} -> {} for {}",
                rule,
                proposed,
                action,
                entity_id
            );
        }

        FusedDecision {
            action,
            risk: Some(risk),
            snapshot: Some(snapshot),
            fallback: None,
            matched_rule,
        }
    }

    /// Rationale for a fused decision, best-effort
    ///
    /// Fallback decisions explain themselves without any collaborator; on
    /// the happy path an explainer failure substitutes the placeholder.
    pub async fn explain(&self, entity_id: &str, decision: &FusedDecision) -> String {
        if let Some(reason) = decision.fallback {
            return format!(
                "fallback decision: {}; defaulted to {}",
                reason, decision.action
            );
        }

        let (Some(risk), Some(snapshot)) = (decision.risk, decision.snapshot.as_ref()) else {
            return EXPLANATION_PLACEHOLDER.to_string();
        };

        match self
            .explainer
            .explain(entity_id, risk, decision.action, snapshot)
            .await
        {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!("Explainer failed for {}: {}", entity_id, err);
                EXPLANATION_PLACEHOLDER.to_string()
            }
        }
    }

    fn fall_back(&self, entity_id: &str, reason: FallbackReason) -> FusedDecision {
        counter!(FALLBACK_DECISIONS).increment(1);
        tracing::warn!("Fallback decision for {}: {}", entity_id, reason);
        FusedDecision::fallback(reason)
    }
}
