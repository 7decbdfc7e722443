//! Attribution Fallback System
//!
//! Explains a single prediction as a ranked list of per-feature
//! contributions. Strategies are tried in priority order and the first
//! non-empty result wins:
//!
//! 1. model-agnostic attribution library (Shapley values)
//! 2. linear coefficients, live or from a reloaded bundle
//! 3. global feature importances of the live model
//!
//! When nothing applies the explanation is empty, which is a valid outcome.

mod config;
mod contribution;
mod engine;
mod shapley;
mod strategy;

pub use config::AttributionConfig;
pub use contribution::{align, rank, AttributionSource, Contribution};
pub use engine::{AttributionEngine, Explanation};
pub use shapley::{AttributionLibrary, ShapleyExplainer, MAX_EXACT_FEATURES};
pub use strategy::{
    Attribution, AttributionContext, AttributionStrategy, CoefficientStrategy, ImportanceStrategy,
    LibraryStrategy, ReloadSource,
};

use inference_engine::InferenceError;
use storage::StorageError;
use thiserror::Error;

/// Failure inside a single attribution tier.
///
/// Always recovered by the engine; never surfaced to a client.
#[derive(Debug, Error)]
pub enum AttributionError {
    #[error("Attribution library failed: {0}")]
    Library(String),
    #[error("Model does not support {0} attribution")]
    Unsupported(&'static str),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },
    #[error("Attribute lookup failed: {0}")]
    Lookup(#[from] InferenceError),
    #[error("Bundle reload failed: {0}")]
    Reload(#[from] StorageError),
}
