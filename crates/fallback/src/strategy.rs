//! Attribution Strategies
//!
//! Each tier of the cascade is an independent strategy. `Ok(None)` and an
//! empty contribution list both mean "nothing here, try the next tier".

use crate::contribution::{align, AttributionSource, Contribution};
use crate::shapley::AttributionLibrary;
use crate::AttributionError;
use inference_engine::FeatureBundle;
use ndarray::Array2;
use std::sync::Arc;
use storage::BundleStore;
use tracing::{debug, info, warn};

/// Inputs shared by every strategy for one explain request
#[derive(Debug, Clone, Copy)]
pub struct AttributionContext<'a> {
    pub bundle: &'a FeatureBundle,
    /// Single transformed row, shape `(1, n_features)`
    pub transformed: &'a Array2<f64>,
}

impl<'a> AttributionContext<'a> {
    pub fn new(bundle: &'a FeatureBundle, transformed: &'a Array2<f64>) -> Self {
        Self { bundle, transformed }
    }

    /// Width of the transformed row
    pub fn n_features(&self) -> usize {
        self.transformed.ncols()
    }

    /// Transformed row flattened in column order
    pub fn row_values(&self) -> Vec<f64> {
        self.transformed.iter().copied().collect()
    }

    /// `coef[i] * row[i]` for the first `min(len(coef), n_features)` columns
    fn weighted(&self, coef: &[f64]) -> Vec<Contribution> {
        let len = coef.len().min(self.n_features());
        let products: Vec<f64> = coef[..len]
            .iter()
            .zip(self.row_values())
            .map(|(c, v)| c * v)
            .collect();
        align(&self.bundle.numeric_cols, &products)
    }

    /// Raw values for the first `min(len(values), n_features)` columns
    fn direct(&self, values: &[f64]) -> Vec<Contribution> {
        let len = values.len().min(self.n_features());
        align(&self.bundle.numeric_cols, &values[..len])
    }
}

/// Contributions tagged with the tier that produced them
#[derive(Debug, Clone, PartialEq)]
pub struct Attribution {
    pub source: AttributionSource,
    pub contributions: Vec<Contribution>,
}

impl Attribution {
    pub fn new(source: AttributionSource, contributions: Vec<Contribution>) -> Self {
        Self { source, contributions }
    }
}

/// One tier of the attribution cascade
pub trait AttributionStrategy: Send + Sync {
    /// Short name used in logs and metrics
    fn name(&self) -> &'static str;

    /// Try to attribute the prediction in `ctx`
    fn attempt(&self, ctx: &AttributionContext<'_>) -> Result<Option<Attribution>, AttributionError>;
}

/// Fresh copy of the persisted bundle, consulted when the serving model
/// has no usable coefficients
pub trait ReloadSource: Send + Sync {
    /// `Ok(None)` when nothing is persisted
    fn reload(&self) -> Result<Option<Arc<FeatureBundle>>, AttributionError>;
}

impl ReloadSource for BundleStore {
    fn reload(&self) -> Result<Option<Arc<FeatureBundle>>, AttributionError> {
        Ok(BundleStore::reload(self)?)
    }
}

/// Tier 1: model-agnostic library against an all-zero baseline
pub struct LibraryStrategy {
    library: Arc<dyn AttributionLibrary>,
}

impl LibraryStrategy {
    pub fn new(library: Arc<dyn AttributionLibrary>) -> Self {
        Self { library }
    }
}

impl AttributionStrategy for LibraryStrategy {
    fn name(&self) -> &'static str {
        "library"
    }

    fn attempt(&self, ctx: &AttributionContext<'_>) -> Result<Option<Attribution>, AttributionError> {
        let baseline = Array2::<f64>::zeros((1, ctx.n_features()));
        let values = self
            .library
            .attribute(ctx.bundle.model.as_ref(), ctx.transformed, &baseline)?;

        if values.len() != ctx.bundle.numeric_cols.len() {
            warn!(
                "{} returned {} values for {} features",
                self.library.name(),
                values.len(),
                ctx.bundle.numeric_cols.len()
            );
        }
        info!("{} produced {} contributions", self.library.name(), values.len());

        Ok(Some(Attribution::new(
            AttributionSource::AttributionLibrary,
            align(&ctx.bundle.numeric_cols, &values),
        )))
    }
}

enum Reloaded {
    Coefficients(Vec<f64>),
    Importances(Vec<f64>),
}

/// Tier 2: linear coefficients times the transformed row.
///
/// When the serving model has no coefficients the persisted bundle is
/// reloaded and its model inspected for coefficients, then importances.
/// Reloaded importances are emitted as-is and tagged as global.
pub struct CoefficientStrategy {
    reload: Option<Arc<dyn ReloadSource>>,
}

impl CoefficientStrategy {
    /// Live coefficients only
    pub fn new() -> Self {
        Self { reload: None }
    }

    /// Live coefficients, falling back to `reload`
    pub fn with_reload(reload: Arc<dyn ReloadSource>) -> Self {
        Self { reload: Some(reload) }
    }

    fn live_coefficients(ctx: &AttributionContext<'_>) -> Vec<f64> {
        let Some(linear) = ctx.bundle.model.as_linear() else {
            return Vec::new();
        };
        linear.coefficients().unwrap_or_else(|e| {
            warn!("Accessing live model coefficients failed: {}", e);
            Vec::new()
        })
    }

    fn reloaded(&self) -> Option<Reloaded> {
        let source = self.reload.as_ref()?;
        let bundle = match source.reload() {
            Ok(Some(bundle)) => bundle,
            Ok(None) => return None,
            Err(e) => {
                warn!("Error reloading saved bundle: {}", e);
                return None;
            }
        };

        let model = bundle.model.as_ref();
        if let Some(linear) = model.as_linear() {
            match linear.coefficients() {
                Ok(coef) if !coef.is_empty() => {
                    info!("Using coefficients from reloaded {} model (len={})", model.name(), coef.len());
                    return Some(Reloaded::Coefficients(coef));
                }
                Ok(_) => debug!("Reloaded model has empty coefficients"),
                Err(e) => warn!("Failed to extract coefficients from reloaded model: {}", e),
            }
        }
        if let Some(importance) = model.as_importance() {
            match importance.feature_importances() {
                Ok(imp) if !imp.is_empty() => {
                    info!("Using feature importances from reloaded {} model", model.name());
                    return Some(Reloaded::Importances(imp));
                }
                Ok(_) => debug!("Reloaded model has empty importances"),
                Err(e) => warn!("Failed to extract importances from reloaded model: {}", e),
            }
        }
        None
    }
}

impl Default for CoefficientStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl AttributionStrategy for CoefficientStrategy {
    fn name(&self) -> &'static str {
        "coefficients"
    }

    fn attempt(&self, ctx: &AttributionContext<'_>) -> Result<Option<Attribution>, AttributionError> {
        let live = Self::live_coefficients(ctx);
        if !live.is_empty() {
            let contributions = ctx.weighted(&live);
            info!(
                "Coefficient fallback used: coef_len={}, used_features={}",
                live.len(),
                contributions.len()
            );
            return Ok(Some(Attribution::new(AttributionSource::LiveCoefficients, contributions)));
        }

        Ok(match self.reloaded() {
            Some(Reloaded::Coefficients(coef)) => Some(Attribution::new(
                AttributionSource::ReloadedCoefficients,
                ctx.weighted(&coef),
            )),
            Some(Reloaded::Importances(imp)) => Some(Attribution::new(
                AttributionSource::ReloadedImportances,
                ctx.direct(&imp),
            )),
            None => None,
        })
    }
}

/// Tier 3: global importances of the serving model, emitted as-is
#[derive(Debug, Default)]
pub struct ImportanceStrategy;

impl AttributionStrategy for ImportanceStrategy {
    fn name(&self) -> &'static str {
        "importances"
    }

    fn attempt(&self, ctx: &AttributionContext<'_>) -> Result<Option<Attribution>, AttributionError> {
        let Some(importance) = ctx.bundle.model.as_importance() else {
            return Ok(None);
        };
        let imp = importance.feature_importances()?;
        info!("Feature importance fallback used (live model)");
        Ok(Some(Attribution::new(AttributionSource::LiveImportances, ctx.direct(&imp))))
    }
}
