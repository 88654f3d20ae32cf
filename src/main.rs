//! linechatd - line-oriented TCP chat daemon.
//!
//! Every connected client is listed in a shared directory and receives every
//! broadcast in one global order.

mod config;
mod error;
mod handlers;
mod http;
mod metrics;
mod network;
mod state;
mod telemetry;

use crate::config::Config;
use crate::handlers::Dispatcher;
use crate::network::Gateway;
use crate::state::Matrix;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Port for `/metrics` when `server.metrics_port` is unset.
const DEFAULT_METRICS_PORT: u16 = 9090;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load_or_default(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = crate::config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {}", errors.len(), config_path);
    }

    info!(
        server = %config.server.name,
        listen = %config.listen.address,
        max_line_length = config.limits.max_line_length,
        "Starting linechatd"
    );

    // Metrics endpoint
    metrics::init();
    match config.server.metrics_port.unwrap_or(DEFAULT_METRICS_PORT) {
        0 => info!("Metrics endpoint disabled"),
        port => {
            tokio::spawn(http::run_http_server(port));
        }
    }

    // Shared state and the single broadcast consumer
    let (matrix, queue) = Matrix::new(&config);
    let matrix = Arc::new(matrix);
    queue.spawn(Arc::clone(&matrix.registry));

    let dispatcher = Arc::new(Dispatcher::new());

    let gateway = Gateway::bind(config.listen.address, Arc::clone(&matrix), dispatcher).await?;
    info!(address = %gateway.local_addr()?, "Accepting connections");

    gateway.run().await?;

    Ok(())
}
