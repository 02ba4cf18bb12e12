//! Decision fusion
//!
//! Combines the external risk score and policy action with deterministic
//! rule overrides and a dependency-free fallback path into one final
//! action plus rationale.

pub mod engine;
pub mod rules;
pub mod types;

pub use engine::FusionEngine;
pub use rules::{Rule, RuleSet};
pub use types::{Action, FallbackReason, FusedDecision, FALLBACK_ACTION};
