//! Event ingestion handler
//!
//! HTTP delivery seam for the external event stream; accepted events are
//! queued to the ingestion worker rather than written inline.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;

use crate::ingest::Event;
use crate::{AppError, AppResult, AppState};

pub async fn ingest(
    State(state): State<AppState>,
    Json(event): Json<Event>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    if event.event_id.trim().is_empty() {
        return Err(AppError::ValidationError(
            "event_id must not be empty".to_string(),
        ));
    }
    if event.entity_id.trim().is_empty() {
        return Err(AppError::ValidationError(
            "entity_id must not be empty".to_string(),
        ));
    }

    let event_id = event.event_id.clone();
    state
        .ingest_tx
        .send(event)
        .await
        .map_err(|_| AppError::InternalError("Ingestion worker is not running".to_string()))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "status": "queued", "event_id": event_id })),
    ))
}
