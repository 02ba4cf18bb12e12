//! Feature snapshot
//!
//! The materialized view of one entity's rolling aggregates. A snapshot is
//! recomputed from the event log on every read and never mutated in place,
//! so it always reflects a single consistent log state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Short aggregation window (seconds)
pub const SHORT_WINDOW_SECS: i64 = 60;

/// Long aggregation window (seconds)
pub const LONG_WINDOW_SECS: i64 = 300;

/// Per-entity rolling aggregates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSnapshot {
    /// Events in the last minute
    pub count_1m: u64,
    /// Events in the last five minutes
    pub count_5m: u64,
    /// Mean event value over the last minute (0 when empty)
    pub avg_value_1m: f64,
    /// Timestamp of the newest event seen for the entity
    pub last_event_ts: Option<DateTime<Utc>>,
}

impl FeatureSnapshot {
    /// State vector consumed by the policy model, in fixed order:
    /// `[risk, count_1m, count_5m]`
    pub fn state_vector(&self, risk: f64) -> [f64; 3] {
        [risk, self.count_1m as f64, self.count_5m as f64]
    }
}
