//! Model Capabilities

use crate::InferenceError;
use ndarray::Array2;

/// A fitted regression model.
///
/// Attribution support is declared rather than discovered: a model hands out
/// its linear or importance view when it has one.
pub trait Model: Send + Sync {
    /// Short model kind used in logs
    fn name(&self) -> &str;

    /// Predict one value per row of `x`
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<f64>, InferenceError>;

    /// Linear coefficient view, if the model is linear in its inputs
    fn as_linear(&self) -> Option<&dyn LinearAttributable> {
        None
    }

    /// Global feature-importance view
    fn as_importance(&self) -> Option<&dyn ImportanceAttributable> {
        None
    }

    /// Whether a model-agnostic explainer may drive `predict` with perturbed rows
    fn is_black_box_attributable(&self) -> bool {
        true
    }
}

/// Model exposing one coefficient per input column
pub trait LinearAttributable {
    /// Flattened coefficient vector
    fn coefficients(&self) -> Result<Vec<f64>, InferenceError>;
}

/// Model exposing one global importance score per input column
pub trait ImportanceAttributable {
    /// Flattened importance vector
    fn feature_importances(&self) -> Result<Vec<f64>, InferenceError>;
}
