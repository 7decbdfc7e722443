//! Prediction Routes

use axum::{extract::State, Json};
use inference_engine::FeatureRow;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::SharedState;

/// Request body for the predict endpoint
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    /// Feature values by column name; omitted columns count as 0
    pub features: FeatureRow,
}

/// Response for the predict endpoint
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: f64,
}

/// Predict a single row
pub async fn predict(
    State(state): State<SharedState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, ApiError> {
    let result = state
        .engine
        .predict(&request.features)
        .map_err(|e| ApiError::from_inference("Prediction", e))?;

    debug!("Prediction served in {}us", result.latency_us);

    Ok(Json(PredictResponse {
        prediction: result.output.prediction,
    }))
}
