use std::sync::Arc;

use anyhow::Context;
use filedock_server::config::DEFAULT_CONFIG_PATH;
use filedock_server::{AppState, ServerConfig, create_router};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let config_path =
        std::env::var("FILEDOCK_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    info!(path = %config_path, "loading server config");
    let config = ServerConfig::load(&config_path)
        .with_context(|| format!("failed to load server config from {config_path}"))?;

    let state = AppState::new(&config.upload_root, &config.archive_root);
    state
        .prepare()
        .context("failed to create upload and archive directories")?;
    info!(
        upload_root = %config.upload_root.display(),
        archive_root = %config.archive_root.display(),
        "storage directories ready"
    );

    let app = create_router(Arc::new(state), &config);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    info!(addr = %config.bind, "server running, press Ctrl+C to shut down");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated unexpectedly")?;

    info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received, stopping server"),
        Err(err) => warn!(error = %err, "failed to listen for shutdown signal"),
    }
}

fn init_tracing() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}
