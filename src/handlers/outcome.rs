//! Outcome handler

use axum::{extract::State, Json};
use metrics::counter;
use serde::{Deserialize, Serialize};

use crate::telemetry::OUTCOME_REQUESTS;
use crate::models::{self, Decision};
use crate::rewards::{reward_for, OutcomeKind};
use crate::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct OutcomeRequest {
    pub decision_id: i64,
    pub outcome: OutcomeKind,
}

#[derive(Debug, Serialize)]
pub struct OutcomeResponse {
    pub decision_id: i64,
    pub action: &'static str,
    pub outcome: OutcomeKind,
    pub reward: f64,
}

/// Record the real-world outcome for a decision and derive its reward
pub async fn record(
    State(state): State<AppState>,
    Json(req): Json<OutcomeRequest>,
) -> AppResult<Json<OutcomeResponse>> {
    counter!(OUTCOME_REQUESTS).increment(1);

    let decision = Decision::find_by_id(&state.pool, req.decision_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Decision not found".to_string()))?;

    let action = decision.action_kind().ok_or_else(|| {
        AppError::InternalError(format!(
            "Decision {} has unknown action {}",
            decision.id, decision.action
        ))
    })?;

    let reward = reward_for(action, req.outcome);

    match models::outcome::record_feedback(&state.pool, req.decision_id, req.outcome, reward).await
    {
        Ok(()) => {}
        Err(err) if models::outcome::is_unique_violation(&err) => {
            return Err(AppError::AlreadyExists(
                "Outcome already recorded for decision".to_string(),
            ));
        }
        Err(err) => return Err(err.into()),
    }

    tracing::info!(
        "Outcome {} for decision {} ({}) -> reward {}",
        req.outcome,
        req.decision_id,
        action,
        reward
    );

    Ok(Json(OutcomeResponse {
        decision_id: req.decision_id,
        action: action.as_str(),
        outcome: req.outcome,
        reward,
    }))
}
