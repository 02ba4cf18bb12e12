//! Telemetry registry
//!
//! Prometheus exposition backed by the `metrics` recorder. The handle is
//! installed once at startup and rendered by `GET /metrics`.

use metrics::{describe_counter, describe_histogram, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub const DECISION_REQUESTS: &str = "decision_requests_total";
pub const DECISION_LATENCY: &str = "decision_request_latency_seconds";
pub const OUTCOME_REQUESTS: &str = "outcome_requests_total";
pub const FALLBACK_DECISIONS: &str = "fallback_decisions_total";
pub const LEDGER_WRITE_FAILURES: &str = "ledger_write_failures_total";
pub const EVENTS_INGESTED: &str = "events_ingested_total";
pub const EVENTS_SKIPPED: &str = "events_skipped_total";
pub const REWARDS_RECONCILED: &str = "rewards_reconciled_total";

/// Install the global recorder and describe the exported series
pub fn init() -> PrometheusHandle {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install metrics recorder");

    describe_counter!(DECISION_REQUESTS, "Total number of decision requests");
    describe_histogram!(
        DECISION_LATENCY,
        Unit::Seconds,
        "Decision request latency"
    );
    describe_counter!(OUTCOME_REQUESTS, "Total number of outcome requests");
    describe_counter!(
        FALLBACK_DECISIONS,
        "Decisions served by the fallback path"
    );
    describe_counter!(
        LEDGER_WRITE_FAILURES,
        "Decision ledger writes that failed after the decision was made"
    );
    describe_counter!(EVENTS_INGESTED, "Events appended to the window store");
    describe_counter!(
        EVENTS_SKIPPED,
        "Events dropped by the ingestion worker (malformed or duplicate)"
    );
    describe_counter!(
        REWARDS_RECONCILED,
        "Rewards backfilled by the reconciliation sweep"
    );

    handle
}
