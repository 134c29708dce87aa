//! headline-relay: binary entrypoint.
//! Loads configuration, installs tracing and metrics, and serves the Axum app.

use anyhow::Context;
use headline_relay::{config::AppConfig, metrics::Metrics, telemetry};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();

    telemetry::init_tracing();

    let config = AppConfig::from_env().context("reading configuration")?;
    if !config.is_configured() {
        warn!("NEWS_API_KEY is not set; news endpoints will answer 500 until it is");
    }
    let bind = config.bind;

    let metrics = Metrics::init().context("installing prometheus recorder")?;
    let app = headline_relay::app(config)?.merge(metrics.router());

    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("binding {bind}"))?;
    info!(%bind, "server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving http")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "ctrl-c handler failed; shutting down");
    }
    info!("shutdown requested");
}
