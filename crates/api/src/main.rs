//! House Valuation Service - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, ServiceConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1);
    let config = ServiceConfig::load(config_path.as_deref()).context("Failed to load configuration")?;

    init_logging(&config.logging).context("Failed to set tracing subscriber")?;

    info!("=== House Valuation Service v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Bundle: {}", config.bundle_path.display());

    run_server(config).await
}
