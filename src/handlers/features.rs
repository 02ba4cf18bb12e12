//! Feature snapshot handler

use axum::{
    extract::{Path, State},
    Json,
};

use crate::features::FeatureSnapshot;
use crate::{AppResult, AppState};

/// Current rolling aggregates for an entity
///
/// Unknown entities report zeroed aggregates rather than 404, matching
/// the window store contract.
pub async fn get(
    State(state): State<AppState>,
    Path(entity_id): Path<String>,
) -> AppResult<Json<FeatureSnapshot>> {
    Ok(Json(state.features.snapshot(&entity_id)))
}
