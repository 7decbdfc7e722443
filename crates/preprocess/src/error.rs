//! Preprocessing Error Types

use thiserror::Error;

/// Errors while fitting or applying a preprocessing stage
#[derive(Debug, Clone, Error)]
pub enum PreprocessError {
    /// Matrix width differs from the fitted width
    #[error("Expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Fitting requires at least one row
    #[error("Cannot fit on an empty matrix")]
    EmptyInput,

    /// Fitted statistics are inconsistent
    #[error("Invalid fitted state: {0}")]
    InvalidState(String),
}
