//! Metrics exposition handler

use axum::extract::State;

use crate::AppState;

/// Prometheus text exposition of the recorded series
pub async fn render(State(state): State<AppState>) -> String {
    state.metrics.render()
}
