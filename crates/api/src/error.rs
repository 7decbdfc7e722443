//! API Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use inference_engine::InferenceError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Errors surfaced to clients
#[derive(Debug, Error)]
pub enum ApiError {
    /// No bundle was loaded at startup
    #[error("Model not loaded")]
    ServiceUnavailable,

    /// Matrix build, preprocessing or model prediction failed
    #[error("{operation} failed: {source}")]
    PredictionFailed {
        operation: &'static str,
        source: InferenceError,
    },
}

impl ApiError {
    /// Classify a pipeline error for `operation` ("Prediction", "Explain")
    pub fn from_inference(operation: &'static str, err: InferenceError) -> Self {
        match err {
            InferenceError::NotLoaded => ApiError::ServiceUnavailable,
            source => ApiError::PredictionFailed { operation, source },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::PredictionFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            error!("{}", self);
        }
        (status, Json(ErrorResponse { detail: self.to_string() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_loaded_maps_to_503() {
        let err = ApiError::from_inference("Explain", InferenceError::NotLoaded);
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.to_string(), "Model not loaded");
    }

    #[test]
    fn test_pipeline_failure_maps_to_500() {
        let err = ApiError::from_inference("Explain", InferenceError::InferenceFailed("boom".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Explain failed: Inference failed: boom");
    }
}
