//! Training dataset handler

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::models::{Decision, TrainingRecord};
use crate::{AppResult, AppState};

#[derive(Debug, Deserialize, Default)]
pub struct TrainingFilter {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// All decisions joined with their outcomes and rewards
pub async fn records(
    State(state): State<AppState>,
    Query(filter): Query<TrainingFilter>,
) -> AppResult<Json<Vec<TrainingRecord>>> {
    let limit = filter.limit.unwrap_or(500);
    let offset = filter.offset.unwrap_or(0);

    let records = Decision::training_records(&state.pool, limit, offset).await?;
    Ok(Json(records))
}
