//! Missing Value Imputation

use crate::{check_width, PreprocessError, Transformer};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How the fill value of a column is derived
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputeStrategy {
    /// Median of the observed values
    Median,
    /// Mean of the observed values
    Mean,
    /// Fixed fill value
    Constant(f64),
}

/// Replaces `NaN` entries with a per-column statistic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Imputer {
    strategy: ImputeStrategy,
    /// Fill value for each column
    statistics: Vec<f64>,
}

impl Imputer {
    /// Create an imputer from previously fitted statistics
    pub fn from_statistics(strategy: ImputeStrategy, statistics: Vec<f64>) -> Self {
        Self { strategy, statistics }
    }

    /// Fit column statistics, ignoring `NaN` entries.
    ///
    /// A column with no observed values falls back to `0.0`.
    pub fn fit(strategy: ImputeStrategy, x: &Array2<f64>) -> Result<Self, PreprocessError> {
        if x.nrows() == 0 {
            return Err(PreprocessError::EmptyInput);
        }

        let statistics = x
            .axis_iter(Axis(1))
            .map(|column| {
                let mut observed: Vec<f64> = column.iter().copied().filter(|v| !v.is_nan()).collect();
                if observed.is_empty() {
                    return 0.0;
                }
                match strategy {
                    ImputeStrategy::Median => median(&mut observed),
                    ImputeStrategy::Mean => observed.iter().sum::<f64>() / observed.len() as f64,
                    ImputeStrategy::Constant(value) => value,
                }
            })
            .collect();

        debug!("Fitted {:?} imputer on {} columns", strategy, x.ncols());
        Ok(Self { strategy, statistics })
    }

    /// Fill strategy
    pub fn strategy(&self) -> ImputeStrategy {
        self.strategy
    }

    /// Fitted fill values
    pub fn statistics(&self) -> &[f64] {
        &self.statistics
    }
}

impl Transformer for Imputer {
    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, PreprocessError> {
        check_width(x, self.statistics.len())?;

        let mut out = x.clone();
        for (mut column, &fill) in out.axis_iter_mut(Axis(1)).zip(&self.statistics) {
            column.mapv_inplace(|v| if v.is_nan() { fill } else { v });
        }
        Ok(out)
    }

    fn n_features(&self) -> usize {
        self.statistics.len()
    }
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
