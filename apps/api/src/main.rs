mod analysis;
mod backend_client;
mod config;
mod errors;
mod export;
mod layout;
mod models;
mod render;
mod routes;
mod session;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::backend_client::HttpBackend;
use crate::config::Config;
use crate::export::Exporter;
use crate::layout::PageGeometry;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CareerPilot API v{}", env!("CARGO_PKG_VERSION"));

    // Analysis backend client
    let backend = HttpBackend::new(
        &config.backend_url,
        config.request_timeout,
        config.upload_timeout,
        config.retry,
    )
    .context("Failed to build analysis backend client")?;
    info!(
        "Analysis backend at {} (retry: {} attempts)",
        config.backend_url, config.retry.max_attempts
    );

    // Session context, restored from disk
    let session = SessionStore::load(&config.session_file)
        .await
        .with_context(|| format!("Failed to load session file '{}'", config.session_file))?;
    info!("Session store at {}", session.path().display());

    // Report compositor (A4, 20mm margins)
    let exporter = Exporter::new(PageGeometry::a4());

    // Build app state
    let state = AppState {
        exporter,
        backend: Arc::new(backend),
        session: Arc::new(session),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the dashboard host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
