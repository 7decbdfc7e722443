//! Model-Agnostic Shapley Attribution
//!
//! Features outside a coalition take their baseline value. Small rows are
//! explained exactly by enumerating every coalition; wider rows average
//! marginal contributions over the cyclic forward and reverse feature
//! orderings. Both paths issue a single batched `predict` call and involve
//! no randomness.

use crate::AttributionError;
use inference_engine::Model;
use ndarray::Array2;
use tracing::{debug, warn};

/// Hard ceiling for exact enumeration (2^16 coalitions)
pub const MAX_EXACT_FEATURES: usize = 16;

/// Black-box explainer driven only by a model's predict function
pub trait AttributionLibrary: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Per-feature attribution of the single row in `row` against `baseline`
    fn attribute(
        &self,
        model: &dyn Model,
        row: &Array2<f64>,
        baseline: &Array2<f64>,
    ) -> Result<Vec<f64>, AttributionError>;
}

/// Baseline-substitution Shapley value explainer
#[derive(Debug, Clone)]
pub struct ShapleyExplainer {
    max_exact_features: usize,
}

impl ShapleyExplainer {
    /// Create an explainer that enumerates coalitions up to `max_exact_features`
    pub fn new(max_exact_features: usize) -> Self {
        if max_exact_features > MAX_EXACT_FEATURES {
            warn!(
                "max_exact_features {} exceeds {}, clamping",
                max_exact_features, MAX_EXACT_FEATURES
            );
        }
        Self {
            max_exact_features: max_exact_features.min(MAX_EXACT_FEATURES),
        }
    }

    pub fn max_exact_features(&self) -> usize {
        self.max_exact_features
    }

    fn evaluate(&self, model: &dyn Model, batch: &Array2<f64>) -> Result<Vec<f64>, AttributionError> {
        let outputs = model
            .predict(batch)
            .map_err(|e| AttributionError::Library(e.to_string()))?;
        if outputs.len() != batch.nrows() {
            return Err(AttributionError::Library(format!(
                "model returned {} outputs for {} rows",
                outputs.len(),
                batch.nrows()
            )));
        }
        Ok(outputs)
    }

    fn exact(&self, model: &dyn Model, x: &[f64], base: &[f64]) -> Result<Vec<f64>, AttributionError> {
        let m = x.len();
        let n_coalitions = 1usize << m;

        let mut batch = Array2::<f64>::zeros((n_coalitions, m));
        for (mask, mut row) in batch.rows_mut().into_iter().enumerate() {
            for i in 0..m {
                row[i] = if mask & (1 << i) != 0 { x[i] } else { base[i] };
            }
        }
        let values = self.evaluate(model, &batch)?;

        // weight(s) = s! (m - s - 1)! / m!
        let factorial: Vec<f64> = (0..=m)
            .scan(1.0, |acc, k| {
                if k > 0 {
                    *acc *= k as f64;
                }
                Some(*acc)
            })
            .collect();
        let weight = |s: usize| factorial[s] * factorial[m - s - 1] / factorial[m];

        let mut phi = vec![0.0; m];
        for mask in 0..n_coalitions {
            let size = mask.count_ones() as usize;
            for (i, slot) in phi.iter_mut().enumerate() {
                if mask & (1 << i) == 0 {
                    *slot += weight(size) * (values[mask | (1 << i)] - values[mask]);
                }
            }
        }
        Ok(phi)
    }

    fn permutation(&self, model: &dyn Model, x: &[f64], base: &[f64]) -> Result<Vec<f64>, AttributionError> {
        let m = x.len();
        let orders: Vec<Vec<usize>> = (0..m)
            .flat_map(|shift| {
                let forward: Vec<usize> = (shift..m).chain(0..shift).collect();
                let reverse: Vec<usize> = forward.iter().rev().copied().collect();
                [forward, reverse]
            })
            .collect();

        // Each ordering walks from the baseline to x one feature at a time
        let steps = m + 1;
        let mut batch = Array2::<f64>::zeros((orders.len() * steps, m));
        for (o, order) in orders.iter().enumerate() {
            let mut current = base.to_vec();
            for step in 0..steps {
                if step > 0 {
                    let feature = order[step - 1];
                    current[feature] = x[feature];
                }
                for (j, &v) in current.iter().enumerate() {
                    batch[[o * steps + step, j]] = v;
                }
            }
        }
        let values = self.evaluate(model, &batch)?;

        let mut phi = vec![0.0; m];
        for (o, order) in orders.iter().enumerate() {
            for (step, &feature) in order.iter().enumerate() {
                let at = o * steps + step;
                phi[feature] += values[at + 1] - values[at];
            }
        }
        let n_orders = orders.len() as f64;
        phi.iter_mut().for_each(|v| *v /= n_orders);
        Ok(phi)
    }
}

impl Default for ShapleyExplainer {
    fn default() -> Self {
        Self::new(10)
    }
}

impl AttributionLibrary for ShapleyExplainer {
    fn name(&self) -> &str {
        "shapley"
    }

    fn attribute(
        &self,
        model: &dyn Model,
        row: &Array2<f64>,
        baseline: &Array2<f64>,
    ) -> Result<Vec<f64>, AttributionError> {
        if !model.is_black_box_attributable() {
            return Err(AttributionError::Unsupported("black-box"));
        }
        if row.nrows() != 1 || row.dim() != baseline.dim() {
            return Err(AttributionError::ShapeMismatch {
                expected: format!("(1, {})", baseline.ncols()),
                actual: format!("{:?}", row.dim()),
            });
        }

        let x: Vec<f64> = row.iter().copied().collect();
        let base: Vec<f64> = baseline.iter().copied().collect();
        if x.is_empty() {
            return Ok(Vec::new());
        }

        if x.len() <= self.max_exact_features {
            debug!("Exact Shapley over {} features", x.len());
            self.exact(model, &x, &base)
        } else {
            debug!("Permutation Shapley over {} features", x.len());
            self.permutation(model, &x, &base)
        }
    }
}
