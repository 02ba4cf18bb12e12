//! Window store
//!
//! Per-entity append-only event log with lazy, time-bounded pruning.
//! Appends never prune; aggregates are computed at read time against
//! absolute cutoffs, so late or reordered arrivals within a window still
//! count. A periodic compaction sweep drops entries older than the largest
//! window to bound memory.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};

use super::snapshot::{FeatureSnapshot, LONG_WINDOW_SECS, SHORT_WINDOW_SECS};

/// One entity's event history, arrival-ordered
#[derive(Debug, Default)]
struct EntityLog {
    entries: Vec<(DateTime<Utc>, f64)>,
}

impl EntityLog {
    fn aggregate(&self, now: DateTime<Utc>) -> FeatureSnapshot {
        let short_cutoff = now - Duration::seconds(SHORT_WINDOW_SECS);
        let long_cutoff = now - Duration::seconds(LONG_WINDOW_SECS);

        let mut count_1m = 0u64;
        let mut count_5m = 0u64;
        let mut sum_1m = 0.0f64;
        let mut last_event_ts: Option<DateTime<Utc>> = None;

        for &(ts, value) in &self.entries {
            // Closed boundary: an event exactly at the cutoff is included
            if ts >= long_cutoff {
                count_5m += 1;
            }
            if ts >= short_cutoff {
                count_1m += 1;
                sum_1m += value;
            }
            if last_event_ts.map_or(true, |prev| ts > prev) {
                last_event_ts = Some(ts);
            }
        }

        let avg_value_1m = if count_1m > 0 {
            sum_1m / count_1m as f64
        } else {
            0.0
        };

        FeatureSnapshot {
            count_1m,
            count_5m,
            avg_value_1m,
            last_event_ts,
        }
    }

    /// Drop entries older than the largest window, by absolute cutoff
    fn compact(&mut self, now: DateTime<Utc>) -> usize {
        let cutoff = now - Duration::seconds(LONG_WINDOW_SECS);
        let before = self.entries.len();
        self.entries.retain(|&(ts, _)| ts >= cutoff);
        before - self.entries.len()
    }
}

/// Concurrent per-entity window store
///
/// Each entity's log sits behind its own mutex, so appends and snapshot
/// reads for one entity serialize while unrelated entities never contend.
pub struct WindowStore {
    entities: RwLock<HashMap<String, Arc<Mutex<EntityLog>>>>,
}

impl WindowStore {
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(HashMap::new()),
        }
    }

    /// Append an event for an entity. Never fails; no pruning happens here.
    pub fn record(&self, entity_id: &str, value: f64, timestamp: DateTime<Utc>) {
        let log = self.entity_log(entity_id);
        log.lock().entries.push((timestamp, value));
    }

    /// Aggregates for an entity, or `None` when it has no recorded events
    pub fn get(&self, entity_id: &str) -> Option<FeatureSnapshot> {
        self.get_at(entity_id, Utc::now())
    }

    /// Aggregates for an entity, zeroed when the entity is unknown
    pub fn snapshot(&self, entity_id: &str) -> FeatureSnapshot {
        self.get(entity_id).unwrap_or_default()
    }

    /// Drop entries older than the largest window across all entities and
    /// evict entities whose logs emptied out. Returns entries removed.
    pub fn compact(&self) -> usize {
        self.compact_at(Utc::now())
    }

    /// Number of entities currently tracked
    pub fn entity_count(&self) -> usize {
        self.entities.read().len()
    }

    fn get_at(&self, entity_id: &str, now: DateTime<Utc>) -> Option<FeatureSnapshot> {
        let log = {
            let entities = self.entities.read();
            entities.get(entity_id).cloned()
        }?;

        let log = log.lock();
        if log.entries.is_empty() {
            return None;
        }
        Some(log.aggregate(now))
    }

    fn compact_at(&self, now: DateTime<Utc>) -> usize {
        let logs: Vec<(String, Arc<Mutex<EntityLog>>)> = {
            let entities = self.entities.read();
            entities
                .iter()
                .map(|(id, log)| (id.clone(), log.clone()))
                .collect()
        };

        let mut removed = 0;
        let mut empty: Vec<String> = Vec::new();
        for (entity_id, log) in logs {
            let mut log = log.lock();
            removed += log.compact(now);
            if log.entries.is_empty() {
                empty.push(entity_id);
            }
        }

        if !empty.is_empty() {
            let mut entities = self.entities.write();
            for entity_id in empty {
                // Re-check under the write lock; a concurrent record may
                // have appended since the sweep looked at this log.
                let still_empty = entities
                    .get(&entity_id)
                    .map_or(false, |log| log.lock().entries.is_empty());
                if still_empty {
                    entities.remove(&entity_id);
                }
            }
        }

        removed
    }

    fn entity_log(&self, entity_id: &str) -> Arc<Mutex<EntityLog>> {
        {
            let entities = self.entities.read();
            if let Some(log) = entities.get(entity_id) {
                return log.clone();
            }
        }

        let mut entities = self.entities.write();
        entities
            .entry(entity_id.to_string())
            .or_default()
            .clone()
    }
}

impl Default for WindowStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(now: DateTime<Utc>, secs_ago: i64) -> DateTime<Utc> {
        now - Duration::seconds(secs_ago)
    }

    #[test]
    fn test_unknown_entity_snapshot_is_zeroed() {
        let store = WindowStore::new();
        let snap = store.snapshot("nobody");
        assert_eq!(snap.count_1m, 0);
        assert_eq!(snap.count_5m, 0);
        assert_eq!(snap.avg_value_1m, 0.0);
        assert!(snap.last_event_ts.is_none());
        assert!(store.get("nobody").is_none());
    }

    #[test]
    fn test_recent_events_aggregate() {
        let store = WindowStore::new();
        let now = Utc::now();

        store.record("E1", 10.0, ts(now, 10));
        store.record("E1", 20.0, ts(now, 20));
        store.record("E1", 30.0, ts(now, 30));

        let snap = store.get_at("E1", now).unwrap();
        assert_eq!(snap.count_1m, 3);
        assert_eq!(snap.count_5m, 3);
        assert_eq!(snap.avg_value_1m, 20.0);
        assert_eq!(snap.last_event_ts, Some(ts(now, 10)));
    }

    #[test]
    fn test_stale_events_fall_out_of_windows() {
        let store = WindowStore::new();
        let now = Utc::now();

        store.record("E1", 5.0, ts(now, 90)); // outside 1m, inside 5m
        store.record("E1", 7.0, ts(now, 400)); // outside both

        let snap = store.get_at("E1", now).unwrap();
        assert_eq!(snap.count_1m, 0);
        assert_eq!(snap.count_5m, 1);
        assert_eq!(snap.avg_value_1m, 0.0);
    }

    #[test]
    fn test_cutoff_boundary_is_closed() {
        let store = WindowStore::new();
        let now = Utc::now();

        store.record("E1", 4.0, ts(now, 60));
        store.record("E1", 8.0, ts(now, 300));

        let snap = store.get_at("E1", now).unwrap();
        assert_eq!(snap.count_1m, 1);
        assert_eq!(snap.count_5m, 2);
        assert_eq!(snap.avg_value_1m, 4.0);
    }

    #[test]
    fn test_out_of_order_arrival_still_counts() {
        let store = WindowStore::new();
        let now = Utc::now();

        // Arrival order does not match timestamp order
        store.record("E1", 1.0, ts(now, 5));
        store.record("E1", 3.0, ts(now, 50));
        store.record("E1", 2.0, ts(now, 25));

        let snap = store.get_at("E1", now).unwrap();
        assert_eq!(snap.count_1m, 3);
        assert_eq!(snap.avg_value_1m, 2.0);
        assert_eq!(snap.last_event_ts, Some(ts(now, 5)));
    }

    #[test]
    fn test_compaction_prunes_only_beyond_largest_window() {
        let store = WindowStore::new();
        let now = Utc::now();

        store.record("E1", 1.0, ts(now, 10));
        store.record("E1", 2.0, ts(now, 299));
        store.record("E1", 3.0, ts(now, 301));
        store.record("E1", 4.0, ts(now, 5000));

        let removed = store.compact_at(now);
        assert_eq!(removed, 2);

        let snap = store.get_at("E1", now).unwrap();
        assert_eq!(snap.count_5m, 2);
        assert_eq!(snap.count_1m, 1);
    }

    #[test]
    fn test_compaction_evicts_empty_entities() {
        let store = WindowStore::new();
        let now = Utc::now();

        store.record("gone", 1.0, ts(now, 5000));
        store.record("kept", 1.0, ts(now, 5));
        assert_eq!(store.entity_count(), 2);

        store.compact_at(now);
        assert_eq!(store.entity_count(), 1);
        assert!(store.get("gone").is_none());
        assert!(store.get_at("kept", now).is_some());
    }

    #[test]
    fn test_entities_are_independent() {
        let store = WindowStore::new();
        let now = Utc::now();

        store.record("A", 100.0, ts(now, 1));
        store.record("B", 1.0, ts(now, 1));

        assert_eq!(store.get_at("A", now).unwrap().avg_value_1m, 100.0);
        assert_eq!(store.get_at("B", now).unwrap().avg_value_1m, 1.0);
    }

    #[test]
    fn test_concurrent_record_and_snapshot() {
        let store = Arc::new(WindowStore::new());
        let now = Utc::now();

        let writers: Vec<_> = (0..4)
            .map(|w| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..250 {
                        let entity = format!("E{}", w % 2);
                        store.record(&entity, i as f64, now);
                    }
                })
            })
            .collect();

        // Interleaved reads must never observe a torn log
        for _ in 0..100 {
            let _ = store.snapshot("E0");
            let _ = store.snapshot("E1");
        }

        for handle in writers {
            handle.join().unwrap();
        }

        let total = store.get_at("E0", now).unwrap().count_5m
            + store.get_at("E1", now).unwrap().count_5m;
        assert_eq!(total, 1000);
    }
}
