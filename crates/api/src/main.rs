mod config;
mod error;
mod fallback;
mod middleware;
mod routes;
mod state;

use std::sync::Arc;

use site_content_core::events::bus::EventBus;
use site_content_core::store::ContentStore;
use tracing_subscriber::EnvFilter;

use crate::fallback::{FallbackSource, JsonFileFallback};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience)
    let _ = dotenvy::dotenv();

    let config = config::AppConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load config: {e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    tracing::info!("Starting site content API server");

    let event_bus = EventBus::new(config.event_bus_capacity);
    let store = ContentStore::new(config.store_config(), event_bus);

    let fallback: Option<Arc<dyn FallbackSource>> = match &config.fallback_path {
        Some(path) => {
            let source = JsonFileFallback::load(path).map_err(|e| {
                anyhow::anyhow!("Failed to load fallback content from {}: {e}", path.display())
            })?;
            tracing::info!(path = %path.display(), "Loaded fallback content");
            Some(Arc::new(source))
        }
        None => None,
    };

    // First read runs migration or default initialization. A failure here is
    // reported again on every request, so keep serving.
    match store.read().await {
        Ok(doc) => tracing::info!(
            path = %config.content_path.display(),
            last_updated = ?doc.last_updated(),
            "Content store ready"
        ),
        Err(e) => tracing::error!(
            path = %config.content_path.display(),
            error = %e,
            "Content store failed to load"
        ),
    }

    let state = state::AppState::new(store, config.clone(), fallback);

    let app = middleware::body_limit::with_body_limit(routes::build_router(state), config.max_body_bytes)
        .layer(middleware::request_tracing::trace_layer())
        .layer(middleware::cors::cors_layer());

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM. If a handler cannot be installed that
/// signal is ignored and the other one still works.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { tracing::info!("Received Ctrl+C, shutting down..."); }
        _ = terminate => { tracing::info!("Received SIGTERM, shutting down..."); }
    }
}
