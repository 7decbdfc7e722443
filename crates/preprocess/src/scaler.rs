//! Z-Score Standardization

use crate::{check_width, PreprocessError, Transformer};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Standardizes each column to zero mean and unit variance.
///
/// Deserialization goes through [`StandardScaler::from_parts`], so a
/// persisted scaler is held to the same checks as one built in code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ScalerParts")]
pub struct StandardScaler {
    /// Per-column mean
    mean: Vec<f64>,
    /// Per-column standard deviation (1.0 for constant columns)
    scale: Vec<f64>,
}

/// Raw serialized fields, validated before becoming a scaler
#[derive(Deserialize)]
struct ScalerParts {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl TryFrom<ScalerParts> for StandardScaler {
    type Error = PreprocessError;

    fn try_from(parts: ScalerParts) -> Result<Self, Self::Error> {
        Self::from_parts(parts.mean, parts.scale)
    }
}

impl StandardScaler {
    /// Create a scaler from fitted means and scales.
    ///
    /// Lengths must match, means must be finite and scales finite and
    /// strictly positive.
    pub fn from_parts(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, PreprocessError> {
        if mean.len() != scale.len() {
            return Err(PreprocessError::InvalidState(format!(
                "mean has {} entries but scale has {}",
                mean.len(),
                scale.len()
            )));
        }
        if let Some(i) = mean.iter().position(|m| !m.is_finite()) {
            return Err(PreprocessError::InvalidState(format!(
                "mean[{}] is not finite: {}",
                i, mean[i]
            )));
        }
        if let Some(i) = scale.iter().position(|s| !s.is_finite() || *s <= 0.0) {
            return Err(PreprocessError::InvalidState(format!(
                "scale[{}] must be finite and positive, got {}",
                i, scale[i]
            )));
        }
        Ok(Self { mean, scale })
    }

    /// Fit means and population standard deviations
    pub fn fit(x: &Array2<f64>) -> Result<Self, PreprocessError> {
        if x.nrows() == 0 {
            return Err(PreprocessError::EmptyInput);
        }

        let n = x.nrows() as f64;
        let mut mean = Vec::with_capacity(x.ncols());
        let mut scale = Vec::with_capacity(x.ncols());

        for column in x.axis_iter(Axis(1)) {
            let mu = column.sum() / n;
            let variance = column.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / n;
            let std_dev = variance.sqrt();
            mean.push(mu);
            scale.push(if std_dev > f64::EPSILON { std_dev } else { 1.0 });
        }

        debug!("Fitted standard scaler on {} columns", x.ncols());
        Self::from_parts(mean, scale)
    }

    /// Fitted means
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Fitted scales
    pub fn scale(&self) -> &[f64] {
        &self.scale
    }
}

impl Transformer for StandardScaler {
    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, PreprocessError> {
        check_width(x, self.mean.len())?;

        let mut out = x.clone();
        for ((mut column, &mu), &sigma) in out
            .axis_iter_mut(Axis(1))
            .zip(&self.mean)
            .zip(&self.scale)
        {
            column.mapv_inplace(|v| (v - mu) / sigma);
        }
        Ok(out)
    }

    fn n_features(&self) -> usize {
        self.mean.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use proptest::prelude::*;

    #[test]
    fn test_fit_and_transform() {
        let x = array![[1.0, 5.0], [3.0, 5.0]];
        let scaler = StandardScaler::fit(&x).unwrap();
        assert_eq!(scaler.mean(), &[2.0, 5.0]);
        // Constant column keeps unit scale
        assert_eq!(scaler.scale(), &[1.0, 1.0]);

        let out = scaler.transform(&x).unwrap();
        assert_eq!(out, array![[-1.0, 0.0], [1.0, 0.0]]);
    }

    #[test]
    fn test_from_parts_length_mismatch() {
        assert!(StandardScaler::from_parts(vec![0.0], vec![1.0, 1.0]).is_err());
    }

    #[test]
    fn test_from_parts_rejects_bad_scale() {
        assert!(StandardScaler::from_parts(vec![0.0], vec![0.0]).is_err());
        assert!(StandardScaler::from_parts(vec![0.0], vec![-2.0]).is_err());
        assert!(StandardScaler::from_parts(vec![0.0], vec![f64::INFINITY]).is_err());
        assert!(StandardScaler::from_parts(vec![f64::NAN], vec![1.0]).is_err());
    }

    #[test]
    fn test_deserialize_validates_parts() {
        let ok: StandardScaler = serde_json::from_str(r#"{"mean":[1.0],"scale":[2.0]}"#).unwrap();
        assert_eq!(ok.scale(), &[2.0]);

        let short = serde_json::from_str::<StandardScaler>(r#"{"mean":[0.0,100.0],"scale":[1.0]}"#);
        assert!(short.is_err());
        let zero = serde_json::from_str::<StandardScaler>(r#"{"mean":[0.0],"scale":[0.0]}"#);
        assert!(zero.is_err());
    }

    #[test]
    fn test_transform_width_mismatch() {
        let scaler = StandardScaler::from_parts(vec![0.0], vec![1.0]).unwrap();
        assert!(scaler.transform(&array![[1.0, 2.0]]).is_err());
    }

    proptest! {
        #[test]
        fn prop_fitted_columns_are_centered(values in prop::collection::vec(-1e6_f64..1e6, 2..50)) {
            let x = Array2::from_shape_vec((values.len(), 1), values).unwrap();
            let scaler = StandardScaler::fit(&x).unwrap();
            let out = scaler.transform(&x).unwrap();
            let mean = out.sum() / out.len() as f64;
            prop_assert!(mean.abs() < 1e-6);
        }
    }
}
