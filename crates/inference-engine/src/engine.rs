//! Inference Engine Implementation

use crate::bundle::FeatureBundle;
use crate::pipeline::{self, FeatureRow, PredictionOutput};
use crate::InferenceError;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of inference operation
#[derive(Debug, Clone)]
pub struct InferenceResult {
    /// Prediction and transformed row
    pub output: PredictionOutput,
    /// Inference latency in microseconds
    pub latency_us: u64,
}

/// Process-wide handle on the loaded bundle.
///
/// Set once at startup and read-only afterwards; an absent bundle disables
/// prediction instead of crashing the process.
#[derive(Debug, Clone, Default)]
pub struct InferenceEngine {
    bundle: Option<Arc<FeatureBundle>>,
}

impl InferenceEngine {
    /// Create an engine serving `bundle`
    pub fn new(bundle: FeatureBundle) -> Self {
        info!(
            "Creating inference engine: model={}, features={}",
            bundle.model.name(),
            bundle.n_features()
        );
        Self {
            bundle: Some(Arc::new(bundle)),
        }
    }

    /// Create an engine with no model; every prediction fails with `NotLoaded`
    pub fn unloaded() -> Self {
        warn!("Creating inference engine without a model bundle");
        Self { bundle: None }
    }

    /// Loaded bundle, if any
    pub fn bundle(&self) -> Result<&Arc<FeatureBundle>, InferenceError> {
        self.bundle.as_ref().ok_or(InferenceError::NotLoaded)
    }

    /// Run the prediction pipeline on a feature row
    pub fn predict(&self, row: &FeatureRow) -> Result<InferenceResult, InferenceError> {
        let start = std::time::Instant::now();
        let bundle = self.bundle()?;

        let output = pipeline::predict(bundle, row)?;

        let latency_us = start.elapsed().as_micros() as u64;
        debug!("Inference completed in {}us", latency_us);

        Ok(InferenceResult { output, latency_us })
    }

    /// Check if a bundle is loaded
    pub fn is_loaded(&self) -> bool {
        self.bundle.is_some()
    }
}
