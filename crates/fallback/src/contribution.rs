//! Contributions and Ranking

use serde::{Deserialize, Serialize};
use std::fmt;

/// Signed contribution of one feature to a prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub feature: String,
    pub contribution: f64,
}

impl Contribution {
    pub fn new(feature: impl Into<String>, contribution: f64) -> Self {
        Self {
            feature: feature.into(),
            contribution,
        }
    }
}

/// Which tier produced an explanation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionSource {
    /// Model-agnostic attribution library
    AttributionLibrary,
    /// Coefficients of the serving model times the transformed row
    LiveCoefficients,
    /// Coefficients read from a freshly reloaded bundle
    ReloadedCoefficients,
    /// Global importances read from a freshly reloaded bundle
    ReloadedImportances,
    /// Global importances of the serving model
    LiveImportances,
    /// No tier produced anything
    None,
}

impl AttributionSource {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributionSource::AttributionLibrary => "attribution_library",
            AttributionSource::LiveCoefficients => "live_coefficients",
            AttributionSource::ReloadedCoefficients => "reloaded_coefficients",
            AttributionSource::ReloadedImportances => "reloaded_importances",
            AttributionSource::LiveImportances => "live_importances",
            AttributionSource::None => "none",
        }
    }

    /// True when the values are global importances rather than local
    /// contributions to this particular prediction
    pub fn is_global(&self) -> bool {
        matches!(
            self,
            AttributionSource::ReloadedImportances | AttributionSource::LiveImportances
        )
    }
}

impl fmt::Display for AttributionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pair feature names with values by position, stopping at the shorter side
pub fn align(names: &[String], values: &[f64]) -> Vec<Contribution> {
    names
        .iter()
        .zip(values)
        .map(|(name, &value)| Contribution::new(name.clone(), value))
        .collect()
}

/// Sort by descending magnitude and keep the first `max(0, top_k)`.
///
/// The sort is stable, so equal magnitudes keep their input order.
pub fn rank(mut contributions: Vec<Contribution>, top_k: i64) -> Vec<Contribution> {
    contributions.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));
    let keep = usize::try_from(top_k.max(0)).unwrap_or(usize::MAX);
    contributions.truncate(keep);
    contributions
}
