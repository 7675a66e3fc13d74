//! `VirtuePAI` server entry point.
//!
//! Loads configuration, refuses to start without the required secrets, then
//! serves the API with graceful shutdown on SIGINT or SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use virtuepai_server::config::ServerConfig;
use virtuepai_server::mailer::SmtpMailer;
use virtuepai_server::routes;
use virtuepai_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real deployments set the environment directly.
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env().context("invalid server configuration")?;

    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(
        upstream = %config.upstream.endpoint,
        model = %config.upstream.model,
        timeout_ms = u64::try_from(config.upstream.timeout.as_millis()).unwrap_or(u64::MAX),
        max_retries = config.upstream.max_retries,
        "VirtuePAI server starting"
    );

    let state = Arc::new(
        AppState::new(&config, Arc::new(SmtpMailer)).context("failed to build application state")?,
    );

    let app = routes::app(state);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "VirtuePAI server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("VirtuePAI server stopped");
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
}
