//! Attribution Engine Implementation

use crate::config::AttributionConfig;
use crate::contribution::{rank, AttributionSource, Contribution};
use crate::shapley::ShapleyExplainer;
use crate::strategy::{
    Attribution, AttributionContext, AttributionStrategy, CoefficientStrategy, ImportanceStrategy,
    LibraryStrategy, ReloadSource,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Ranked, truncated contributions and the tier they came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub source: AttributionSource,
    pub contributions: Vec<Contribution>,
}

/// Runs attribution strategies in priority order
pub struct AttributionEngine {
    strategies: Vec<Box<dyn AttributionStrategy>>,
}

impl AttributionEngine {
    /// Engine with no strategies; every explanation is empty
    pub fn empty() -> Self {
        Self { strategies: Vec::new() }
    }

    /// Append a lower-priority strategy
    pub fn with_strategy(mut self, strategy: impl AttributionStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Library (if enabled), coefficients (with optional reload), importances
    pub fn from_config(config: &AttributionConfig, reload: Option<Arc<dyn ReloadSource>>) -> Self {
        let mut engine = Self::empty();

        if config.library_enabled {
            let library = ShapleyExplainer::new(config.max_exact_features);
            engine = engine.with_strategy(LibraryStrategy::new(Arc::new(library)));
        }

        let coefficients = match reload {
            Some(source) => CoefficientStrategy::with_reload(source),
            None => CoefficientStrategy::new(),
        };

        let engine = engine.with_strategy(coefficients).with_strategy(ImportanceStrategy);
        info!("Attribution engine tiers: {:?}", engine.strategy_names());
        engine
    }

    /// Strategy names in priority order
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Explain the prediction in `ctx`, keeping at most `max(0, top_k)` entries
    pub fn explain(&self, ctx: &AttributionContext<'_>, top_k: i64) -> Explanation {
        let attribution = self.cascade(ctx);

        metrics::counter!("explain_requests_total", "source" => attribution.source.as_str()).increment(1);
        if attribution.source.is_global() {
            info!(
                "Reporting {} global importances as contributions (source={})",
                attribution.contributions.len(),
                attribution.source
            );
        }

        let contributions = rank(attribution.contributions, top_k);
        debug!(
            "Returning {} contributions (source={}, top={:?})",
            contributions.len(),
            attribution.source,
            contributions.first()
        );

        Explanation {
            source: attribution.source,
            contributions,
        }
    }

    /// First non-empty strategy result; tier failures are logged and skipped
    fn cascade(&self, ctx: &AttributionContext<'_>) -> Attribution {
        for strategy in &self.strategies {
            match strategy.attempt(ctx) {
                Ok(Some(attribution)) if !attribution.contributions.is_empty() => {
                    return attribution;
                }
                Ok(_) => debug!("Strategy {} produced nothing", strategy.name()),
                Err(e) => {
                    metrics::counter!("attribution_tier_failures_total", "strategy" => strategy.name())
                        .increment(1);
                    warn!("Strategy {} failed: {}", strategy.name(), e);
                }
            }
        }
        Attribution::new(AttributionSource::None, Vec::new())
    }
}
