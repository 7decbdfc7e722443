//! Explanation Routes

use axum::{extract::State, Json};
use fallback::{AttributionContext, Contribution};
use inference_engine::{FeatureRow, InferenceError};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::{AppState, SharedState};

/// Request body for the explain endpoint
#[derive(Debug, Deserialize)]
pub struct ExplainRequest {
    /// Feature values by column name; omitted columns count as 0
    pub features: FeatureRow,
    /// Maximum number of contributions; values <= 0 return none
    #[serde(default = "default_top_k")]
    pub top_k: i64,
}

fn default_top_k() -> i64 {
    5
}

/// Response for the explain endpoint
#[derive(Debug, Serialize)]
pub struct ExplainResponse {
    pub prediction: f64,
    /// Ranked by descending absolute contribution
    pub prediction_explanation: Vec<Contribution>,
}

/// Predict a single row and attribute the prediction to its features.
///
/// Only pipeline failures become errors; attribution degrades to an empty
/// list instead. Exact Shapley enumeration can evaluate thousands of rows,
/// so the work runs on the blocking pool.
pub async fn explain(
    State(state): State<SharedState>,
    Json(request): Json<ExplainRequest>,
) -> Result<Json<ExplainResponse>, ApiError> {
    let response = tokio::task::spawn_blocking(move || explain_row(&state, &request))
        .await
        .map_err(|e| {
            ApiError::from_inference(
                "Explain",
                InferenceError::InferenceFailed(format!("Explain task aborted: {}", e)),
            )
        })??;

    Ok(Json(response))
}

fn explain_row(state: &AppState, request: &ExplainRequest) -> Result<ExplainResponse, ApiError> {
    let bundle = state
        .engine
        .bundle()
        .map_err(|e| ApiError::from_inference("Explain", e))?;
    let result = state
        .engine
        .predict(&request.features)
        .map_err(|e| ApiError::from_inference("Explain", e))?;

    let ctx = AttributionContext::new(bundle, &result.output.transformed);
    let explanation = state.attribution.explain(&ctx, request.top_k);

    info!(
        "Explained prediction {:.4}: {} contributions from {}",
        result.output.prediction,
        explanation.contributions.len(),
        explanation.source
    );

    Ok(ExplainResponse {
        prediction: result.output.prediction,
        prediction_explanation: explanation.contributions,
    })
}
