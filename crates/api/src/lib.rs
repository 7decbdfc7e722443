//! House Valuation API Server
//!
//! REST API serving single-row price predictions and per-feature
//! explanations of those predictions.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use fallback::{AttributionEngine, ReloadSource};
use inference_engine::InferenceEngine;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use storage::BundleStore;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

pub mod config;
pub mod error;
pub mod routes;

pub use config::{LoggingConfig, ServiceConfig};
pub use error::ApiError;

/// Application state shared across handlers.
///
/// Immutable after startup, so handlers read it without locking.
pub struct AppState {
    /// Live prediction pipeline
    pub engine: InferenceEngine,
    /// Explanation cascade
    pub attribution: AttributionEngine,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: Instant,
    /// Prometheus renderer, when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

/// Shared handle passed to every route
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Create new application state
    pub fn new(engine: InferenceEngine, attribution: AttributionEngine) -> Self {
        Self {
            engine,
            attribution,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
            metrics: None,
        }
    }

    /// Load the bundle named in `config` and build the attribution cascade.
    ///
    /// A bundle that fails to load leaves the service up without a model.
    /// The same store backs the coefficient fallback's reload.
    pub fn from_config(config: &ServiceConfig) -> Self {
        let store = Arc::new(BundleStore::new(config.bundle_path.clone()).with_reload_cache(config.cache_reloads));

        let engine = match store.load() {
            Ok(bundle) => {
                info!("Loaded bundle from {}", store.path().display());
                InferenceEngine::new(bundle)
            }
            Err(e) => {
                error!("Failed to load bundle from {}: {}", store.path().display(), e);
                InferenceEngine::unloaded()
            }
        };

        let reload: Arc<dyn ReloadSource> = store;
        let attribution = AttributionEngine::from_config(&config.attribution, Some(reload));

        Self::new(engine, attribution)
    }

    /// Attach a Prometheus handle for the metrics route
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Create the application router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/predict", post(routes::predict::predict))
        .route("/explain", post(routes::explain::explain))
        .route("/metrics", get(routes::metrics::get_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model_loaded: state.engine.is_loaded(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let level = config.level.parse::<Level>().unwrap_or(Level::INFO);

    if config.json {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    }
}

/// Run the server
pub async fn run_server(config: ServiceConfig) -> anyhow::Result<()> {
    let mut state = AppState::from_config(&config);

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => state = state.with_metrics(handle),
        Err(e) => warn!("Metrics recorder unavailable: {}", e),
    }

    let app = create_router(Arc::new(state));

    info!("Starting API server on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
