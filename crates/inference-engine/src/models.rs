//! Concrete Model Kinds

use crate::model::{ImportanceAttributable, LinearAttributable, Model};
use crate::InferenceError;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

fn check_width(x: &Array2<f64>, expected: usize) -> Result<(), InferenceError> {
    if x.ncols() != expected {
        return Err(InferenceError::InvalidInputShape {
            expected: format!("(_, {})", expected),
            actual: format!("({}, {})", x.nrows(), x.ncols()),
        });
    }
    Ok(())
}

/// Ridge/OLS style linear regressor: `y = coef . x + intercept`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub coef: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl LinearModel {
    pub fn new(coef: Vec<f64>, intercept: f64) -> Self {
        Self { coef, intercept }
    }
}

impl Model for LinearModel {
    fn name(&self) -> &str {
        "linear"
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<f64>, InferenceError> {
        check_width(x, self.coef.len())?;
        Ok(x.rows()
            .into_iter()
            .map(|row| row.iter().zip(&self.coef).map(|(v, c)| v * c).sum::<f64>() + self.intercept)
            .collect())
    }

    fn as_linear(&self) -> Option<&dyn LinearAttributable> {
        Some(self)
    }
}

impl LinearAttributable for LinearModel {
    fn coefficients(&self) -> Result<Vec<f64>, InferenceError> {
        Ok(self.coef.clone())
    }
}

/// Predicts the same value for every row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstantModel {
    pub value: f64,
}

impl ConstantModel {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl Model for ConstantModel {
    fn name(&self) -> &str {
        "constant"
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<f64>, InferenceError> {
        Ok(vec![self.value; x.nrows()])
    }
}

/// Single-split decision stump
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stump {
    /// Column index the split reads
    pub feature: usize,
    pub threshold: f64,
    /// Output when `x[feature] <= threshold`
    pub left: f64,
    /// Output otherwise
    pub right: f64,
}

/// Additive ensemble of decision stumps
///
/// Not linear in its inputs, so it only exposes global importances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StumpEnsemble {
    pub n_features: usize,
    #[serde(default)]
    pub base: f64,
    pub stumps: Vec<Stump>,
}

impl StumpEnsemble {
    pub fn new(n_features: usize, base: f64, stumps: Vec<Stump>) -> Self {
        Self {
            n_features,
            base,
            stumps,
        }
    }
}

impl Model for StumpEnsemble {
    fn name(&self) -> &str {
        "stump_ensemble"
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<f64>, InferenceError> {
        check_width(x, self.n_features)?;
        if let Some(stump) = self.stumps.iter().find(|s| s.feature >= self.n_features) {
            return Err(InferenceError::InferenceFailed(format!(
                "stump splits on feature {} but model has {} features",
                stump.feature, self.n_features
            )));
        }

        Ok(x.rows()
            .into_iter()
            .map(|row| {
                self.base
                    + self
                        .stumps
                        .iter()
                        .map(|s| if row[s.feature] <= s.threshold { s.left } else { s.right })
                        .sum::<f64>()
            })
            .collect())
    }

    fn as_importance(&self) -> Option<&dyn ImportanceAttributable> {
        Some(self)
    }
}

impl ImportanceAttributable for StumpEnsemble {
    /// Per-feature share of the total split amplitude `|right - left|`
    fn feature_importances(&self) -> Result<Vec<f64>, InferenceError> {
        let mut importances = vec![0.0; self.n_features];
        for stump in &self.stumps {
            let slot = importances.get_mut(stump.feature).ok_or_else(|| {
                InferenceError::AttributeUnavailable(format!(
                    "stump feature {} out of range",
                    stump.feature
                ))
            })?;
            *slot += (stump.right - stump.left).abs();
        }

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            importances.iter_mut().for_each(|v| *v /= total);
        }
        Ok(importances)
    }
}

/// Serialized model description stored in a bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSpec {
    Linear(LinearModel),
    Constant(ConstantModel),
    StumpEnsemble(StumpEnsemble),
}

impl Model for ModelSpec {
    fn name(&self) -> &str {
        match self {
            ModelSpec::Linear(m) => m.name(),
            ModelSpec::Constant(m) => m.name(),
            ModelSpec::StumpEnsemble(m) => m.name(),
        }
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<f64>, InferenceError> {
        match self {
            ModelSpec::Linear(m) => m.predict(x),
            ModelSpec::Constant(m) => m.predict(x),
            ModelSpec::StumpEnsemble(m) => m.predict(x),
        }
    }

    fn as_linear(&self) -> Option<&dyn LinearAttributable> {
        match self {
            ModelSpec::Linear(m) => m.as_linear(),
            _ => None,
        }
    }

    fn as_importance(&self) -> Option<&dyn ImportanceAttributable> {
        match self {
            ModelSpec::StumpEnsemble(m) => m.as_importance(),
            _ => None,
        }
    }
}
