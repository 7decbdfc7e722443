//! Metrics Route

use axum::extract::State;

use crate::SharedState;

/// Prometheus text exposition; empty when no recorder is installed
pub async fn get_metrics(State(state): State<SharedState>) -> String {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}
