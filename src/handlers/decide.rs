//! Decide handler

use std::time::Instant;

use axum::{extract::State, Json};
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};

use crate::telemetry::{DECISION_LATENCY, DECISION_REQUESTS, LEDGER_WRITE_FAILURES};
use crate::models::Decision;
use crate::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct DecideRequest {
    pub entity_id: String,
}

#[derive(Debug, Serialize)]
pub struct DecideResponse {
    /// Absent when the ledger write failed; the decision still stands
    pub decision_id: Option<i64>,
    pub entity_id: String,
    pub risk: Option<f64>,
    pub action: i16,
    pub explanation: String,
}

/// Decide the action for an entity
///
/// Once the request validates this always returns 200 with a decision:
/// collaborator failures degrade to the fallback action, and a ledger
/// write failure is surfaced through observability instead of the caller.
pub async fn decide(
    State(state): State<AppState>,
    Json(req): Json<DecideRequest>,
) -> AppResult<Json<DecideResponse>> {
    counter!(DECISION_REQUESTS).increment(1);
    let start = Instant::now();

    let entity_id = req.entity_id.trim();
    if entity_id.is_empty() {
        return Err(AppError::ValidationError(
            "entity_id must not be empty".to_string(),
        ));
    }

    let fused = state.engine.decide(entity_id, &state.features).await;

    let decision_id =
        match Decision::insert(&state.pool, entity_id, fused.action, fused.risk).await {
            Ok(decision) => Some(decision.id),
            Err(err) => {
                counter!(LEDGER_WRITE_FAILURES).increment(1);
                tracing::error!("Failed to persist decision for {}: {}", entity_id, err);
                None
            }
        };

    let explanation = state.engine.explain(entity_id, &fused).await;

    histogram!(DECISION_LATENCY).record(start.elapsed().as_secs_f64());

    Ok(Json(DecideResponse {
        decision_id,
        entity_id: entity_id.to_string(),
        risk: fused.risk,
        action: fused.action.index(),
        explanation,
    }))
}
