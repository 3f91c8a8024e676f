//! TalkSense HTTP server binary.
//!
//! # Environment Variables
//!
//! - `PORT`: HTTP port (default: 8080)
//! - `GEMINI_API_KEY`: Gemini credential; unset runs in offline/demo mode
//! - `TALKSENSE_MODEL`: Model identifier (default: gemini-3-flash-preview)
//! - `TALKSENSE_PERSONAS`: YAML persona file (default: embedded personas)
//! - `TALKSENSE_MAX_RETRIES`, `TALKSENSE_BACKOFF_BASE_MS`, `TALKSENSE_PACING_MS`
//! - `RUST_LOG`: Tracing filter (default: "info,talksense=debug")
//!
//! A `.env` file in the working directory is loaded first.

use anyhow::Context;
use talksense::config::AppConfig;
use talksense::council::AgentCouncil;
use talksense::server::{app_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,talksense=debug".into()),
        )
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let council = AgentCouncil::from_config(&config).context("failed to load personas")?;

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind_addr = format!("0.0.0.0:{}", port);

    tracing::info!(
        "talksense server starting on {} ({} mode, {} personas)",
        bind_addr,
        if council.is_offline() { "offline" } else { "online" },
        council.registry().len()
    );

    let app = app_router(AppState::new(council));
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;

    tracing::info!("talksense server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
