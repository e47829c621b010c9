//! SEO Prerender server binary
//!
//! Serves the single-page application and prerenders it for crawlers.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seo_prerender::lifecycle::{on_shutdown, on_startup};
use seo_prerender::{create_router, AppState, ChromiumEngine, Config};

/// Main entry point for the prerender server.
///
/// # Startup Sequence
/// 1. Load `.env` if present and initialize tracing
/// 2. Load configuration from environment variables
/// 3. Build the browser session manager (not launched yet)
/// 4. Run the startup hook (launches the browser when prerender is active)
/// 5. Serve HTTP until SIGINT/SIGTERM
/// 6. Run the shutdown hook (closes the browser)
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seo_prerender=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SEO prerender server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: mode={:?}, prerender_active={}, base_url={}, ttl={}s, max_entries={}, port={}",
        config.mode,
        config.prerender_active(),
        config.public_base_url,
        config.ttl_seconds,
        config.max_entries,
        config.server_port
    );

    let engine = Arc::new(ChromiumEngine::new(
        config.chrome_executable.clone(),
        config.render.navigation_timeout,
    ));
    let state = AppState::from_config(&config, engine);

    on_startup(&state).await;

    let app = create_router(state.clone(), &config.frontend_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    on_shutdown(&state).await;
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
