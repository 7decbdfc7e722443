//! Regression Inference Engine
//!
//! Holds the fitted model bundle and turns a sparse feature map into a
//! single scalar prediction.

mod bundle;
mod engine;
mod model;
mod models;
mod pipeline;

pub use bundle::FeatureBundle;
pub use engine::{InferenceEngine, InferenceResult};
pub use model::{ImportanceAttributable, LinearAttributable, Model};
pub use models::{ConstantModel, LinearModel, ModelSpec, Stump, StumpEnsemble};
pub use pipeline::{build_matrix, predict, FeatureRow, PredictionOutput};

use preprocess::PreprocessError;
use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model not loaded")]
    NotLoaded,
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
    #[error("Preprocessing failed: {0}")]
    Preprocess(#[from] PreprocessError),
    #[error("Attribute unavailable: {0}")]
    AttributeUnavailable(String),
}
