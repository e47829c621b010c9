//! API Routes
//!
//! Assembles the router: JSON endpoints, the SPA shell fallback, and the
//! prerender interceptor wrapped around all of it.

use std::path::Path;

use axum::{middleware, routing::get, Router};
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use super::handlers::{health_handler, stats_handler, AppState};
use super::interceptor::prerender_middleware;

/// Creates the main router.
///
/// # Endpoints
/// - `GET /api/health` - Health check
/// - `GET /api/prerender/stats` - Render cache and session statistics
/// - anything else - files from `frontend_dir`, unknown paths get `index.html`
///
/// # Middleware
/// - Prerender: crawlers on page paths get a headless render
/// - Tracing: logs all requests
pub fn create_router(state: AppState, frontend_dir: &Path) -> Router {
    let spa = ServeDir::new(frontend_dir).fallback(ServeFile::new(frontend_dir.join("index.html")));

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/prerender/stats", get(stats_handler))
        .fallback_service(spa)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            prerender_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
