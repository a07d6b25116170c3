// =============================================================================
// stock-signals main entry point
// =============================================================================
//
// Serves historical price series for a ticker and the technical indicators
// derived from them.  Startup: env + config, tracing, provider, router, then
// serve until Ctrl+C.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod config;
mod error;
mod indicators;
mod provider;
mod types;
mod validator;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::config::{ServerConfig, DEFAULT_CONFIG_PATH};
use crate::provider::YahooClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("stock-signals starting up");

    let config_path =
        std::env::var("STOCK_SIGNALS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let config = ServerConfig::load(&config_path)
        .unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            ServerConfig::default()
        })
        .with_env_overrides();

    info!(
        upstream = %config.upstream_base_url,
        timeout_secs = config.request_timeout_secs,
        cache_ttl_secs = config.cache_ttl_secs,
        fetch_options = config.fetch_options,
        range_check = ?config.range_check(),
        "Configuration resolved"
    );

    // ── 2. Upstream provider & shared state ──────────────────────────────
    let provider = Arc::new(YahooClient::new(
        config.upstream_base_url.clone(),
        config.request_timeout(),
    )?);
    let addr = config.listen_addr();
    let state = Arc::new(AppState::new(config, provider));

    // ── 3. API server ────────────────────────────────────────────────────
    let app = api::rest::router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind API server on {addr}"))?;
    info!(addr = %addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server failed")?;

    info!("stock-signals shut down complete.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    warn!("Shutdown signal received, stopping gracefully");
}
