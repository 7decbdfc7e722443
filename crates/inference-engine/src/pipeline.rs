//! Prediction Pipeline
//!
//! Sparse feature map -> ordered row -> impute -> scale -> model.

use crate::bundle::FeatureBundle;
use crate::InferenceError;
use ndarray::Array2;
use std::collections::HashMap;
use tracing::debug;

/// Client-supplied feature values keyed by column name.
///
/// A `None` value marks an explicitly missing entry and is left for the
/// imputer to fill.
pub type FeatureRow = HashMap<String, Option<f64>>;

/// Scalar prediction plus the row the model actually saw
#[derive(Debug, Clone)]
pub struct PredictionOutput {
    pub prediction: f64,
    /// Shape `(1, numeric_cols.len())`, after imputation and scaling
    pub transformed: Array2<f64>,
}

/// Project `row` onto `numeric_cols`.
///
/// Omitted columns become `0.0`, explicit nulls become `NaN`, unknown keys
/// are ignored.
pub fn build_matrix(numeric_cols: &[String], row: &FeatureRow) -> Result<Array2<f64>, InferenceError> {
    let values: Vec<f64> = numeric_cols
        .iter()
        .map(|col| match row.get(col) {
            Some(Some(v)) => *v,
            Some(None) => f64::NAN,
            None => 0.0,
        })
        .collect();

    Array2::from_shape_vec((1, numeric_cols.len()), values)
        .map_err(|e| InferenceError::InferenceFailed(format!("Failed to build feature matrix: {}", e)))
}

/// Run the full pipeline for a single row
pub fn predict(bundle: &FeatureBundle, row: &FeatureRow) -> Result<PredictionOutput, InferenceError> {
    let mut x = build_matrix(&bundle.numeric_cols, row)?;

    if let Some(imputer) = &bundle.imputer {
        x = imputer.transform(&x)?;
    }
    if let Some(scaler) = &bundle.scaler {
        x = scaler.transform(&x)?;
    }

    // Models only see finite input; unimputed nulls stop here
    if let Some((i, v)) = x.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(InferenceError::InferenceFailed(format!(
            "Input contains non-finite value {} for feature '{}'",
            v,
            bundle.numeric_cols.get(i).map(String::as_str).unwrap_or("?")
        )));
    }

    let outputs = bundle.model.predict(&x)?;
    let prediction = *outputs
        .first()
        .ok_or_else(|| InferenceError::InferenceFailed("Model returned no predictions".to_string()))?;
    if !prediction.is_finite() {
        return Err(InferenceError::InferenceFailed(format!(
            "Model returned non-finite prediction {}",
            prediction
        )));
    }

    debug!("Predicted {} with {} model", prediction, bundle.model.name());

    Ok(PredictionOutput {
        prediction,
        transformed: x,
    })
}
