//! Feature Preprocessing
//!
//! Provides the imputation and scaling stages applied to a feature matrix
//! before it reaches the model.

mod error;
mod imputer;
mod scaler;

pub use error::PreprocessError;
pub use imputer::{ImputeStrategy, Imputer};
pub use scaler::StandardScaler;

use ndarray::Array2;

/// A fitted preprocessing stage that maps a matrix to a matrix of the same shape
pub trait Transformer: Send + Sync {
    /// Transform every row of `x`
    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, PreprocessError>;

    /// Number of columns this stage was fitted on
    fn n_features(&self) -> usize;
}

/// Check that `x` has the column count a stage was fitted on
pub(crate) fn check_width(x: &Array2<f64>, expected: usize) -> Result<(), PreprocessError> {
    if x.ncols() != expected {
        return Err(PreprocessError::ShapeMismatch {
            expected,
            actual: x.ncols(),
        });
    }
    Ok(())
}
