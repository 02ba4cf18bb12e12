//! Event ingestion
//!
//! Delivery seam for the external event stream. Transport is external;
//! this module owns the schema, a capacity-bounded dedup filter for
//! at-least-once delivery, and the worker that drains the queue into the
//! window store. Malformed or duplicate deliveries are skipped with a log
//! line and a counter, never by stopping the stream.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::features::WindowStore;
use crate::telemetry::{EVENTS_INGESTED, EVENTS_SKIPPED};

/// One delivered event, immutable once ingested
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_id: String,
    pub entity_id: String,
    pub event_type: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// Capacity-bounded event-id filter for at-least-once delivery
///
/// Remembers the most recent ids up to capacity; capacity 0 disables
/// filtering entirely. Best-effort only: an id evicted from the window can
/// be double-counted, which the aggregates tolerate.
pub struct DedupFilter {
    capacity: usize,
    seen: HashSet<String>,
    order: VecDeque<String>,
}

impl DedupFilter {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            seen: HashSet::new(),
            order: VecDeque::new(),
        }
    }

    /// Returns true when the id has not been seen within the window
    pub fn check_and_insert(&mut self, event_id: &str) -> bool {
        if self.capacity == 0 {
            return true;
        }
        if self.seen.contains(event_id) {
            return false;
        }

        self.seen.insert(event_id.to_string());
        self.order.push_back(event_id.to_string());
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        true
    }
}

/// Drain the ingestion queue into the window store
pub fn spawn_worker(
    store: Arc<WindowStore>,
    mut rx: mpsc::Receiver<Event>,
    dedup_capacity: usize,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut dedup = DedupFilter::new(dedup_capacity);
        tracing::info!("Ingestion worker started (dedup capacity: {})", dedup_capacity);

        while let Some(event) = rx.recv().await {
            if event.entity_id.is_empty() {
                tracing::warn!("Skipping event {} with empty entity_id", event.event_id);
                counter!(EVENTS_SKIPPED).increment(1);
                continue;
            }

            if !dedup.check_and_insert(&event.event_id) {
                tracing::debug!("Skipping duplicate event {}", event.event_id);
                counter!(EVENTS_SKIPPED).increment(1);
                continue;
            }

            store.record(&event.entity_id, event.value, event.timestamp);
            counter!(EVENTS_INGESTED).increment(1);
            tracing::debug!(
                "Processed event {} for {} ({})",
                event.event_id,
                event.entity_id,
                event.event_type
            );
        }

        tracing::info!("Ingestion worker stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str, entity: &str, value: f64) -> Event {
        Event {
            event_id: id.to_string(),
            entity_id: entity.to_string(),
            event_type: "txn".to_string(),
            value,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_dedup_disabled_accepts_everything() {
        let mut filter = DedupFilter::new(0);
        assert!(filter.check_and_insert("e1"));
        assert!(filter.check_and_insert("e1"));
    }

    #[test]
    fn test_dedup_drops_repeat_within_window() {
        let mut filter = DedupFilter::new(8);
        assert!(filter.check_and_insert("e1"));
        assert!(!filter.check_and_insert("e1"));
        assert!(filter.check_and_insert("e2"));
    }

    #[test]
    fn test_dedup_evicts_oldest_at_capacity() {
        let mut filter = DedupFilter::new(2);
        assert!(filter.check_and_insert("e1"));
        assert!(filter.check_and_insert("e2"));
        assert!(filter.check_and_insert("e3")); // evicts e1
        assert!(filter.check_and_insert("e1"));
        assert!(!filter.check_and_insert("e3"));
    }

    #[tokio::test]
    async fn test_worker_appends_and_skips() {
        let store = Arc::new(WindowStore::new());
        let (tx, rx) = mpsc::channel(16);
        let worker = spawn_worker(store.clone(), rx, 8);

        tx.send(event("e1", "E1", 10.0)).await.unwrap();
        tx.send(event("e1", "E1", 10.0)).await.unwrap(); // duplicate
        tx.send(event("e2", "", 5.0)).await.unwrap(); // malformed
        tx.send(event("e3", "E1", 30.0)).await.unwrap();
        drop(tx);
        worker.await.unwrap();

        let snap = store.get("E1").unwrap();
        assert_eq!(snap.count_1m, 2);
        assert_eq!(snap.avg_value_1m, 20.0);
    }
}
