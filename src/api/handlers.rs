//! API Handlers
//!
//! Application state plus the health and prerender statistics endpoints.

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::browser::{BrowserEngine, BrowserSessionManager};
use crate::cache::RenderCache;
use crate::config::Config;
use crate::models::{HealthResponse, PrerenderStatsResponse};

/// Application state shared across all handlers and the interceptor.
#[derive(Clone)]
pub struct AppState {
    /// The one browser session of this process
    pub prerender: Arc<BrowserSessionManager>,
    /// Production mode and feature flag both on
    pub prerender_active: bool,
    /// Origin used to rebuild absolute render URLs
    pub public_base_url: Arc<str>,
}

impl AppState {
    pub fn new(
        prerender: Arc<BrowserSessionManager>,
        prerender_active: bool,
        public_base_url: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            prerender,
            prerender_active,
            public_base_url: public_base_url.into(),
        }
    }

    /// Builds the session manager and its cache from configuration.
    /// Nothing is launched yet.
    pub fn from_config(config: &Config, engine: Arc<dyn BrowserEngine>) -> Self {
        let cache = RenderCache::new(config.max_entries, config.ttl_seconds);
        let manager = BrowserSessionManager::new(engine, cache, config.render.clone());
        Self::new(
            Arc::new(manager),
            config.prerender_active(),
            config.public_base_url.as_str(),
        )
    }
}

/// Handler for GET /api/health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /api/prerender/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<PrerenderStatsResponse> {
    let stats = state.prerender.cache_stats().await;
    let (max_entries, ttl_seconds) = state.prerender.cache_limits().await;

    Json(PrerenderStatsResponse::new(
        state.prerender_active,
        state.prerender.state().await,
        state.prerender.launches(),
        stats,
        max_entries,
        ttl_seconds,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{BrowserInstance, SessionState};
    use crate::error::{PrerenderError, Result};
    use async_trait::async_trait;

    struct NoBrowser;

    #[async_trait]
    impl BrowserEngine for NoBrowser {
        async fn launch(&self) -> Result<Box<dyn BrowserInstance>> {
            Err(PrerenderError::SessionStart("no browser here".to_string()))
        }
    }

    #[tokio::test]
    async fn test_state_from_config() {
        let config = Config::default();
        let state = AppState::from_config(&config, Arc::new(NoBrowser));

        assert!(!state.prerender_active);
        assert_eq!(&*state.public_base_url, "http://127.0.0.1:8000");
        assert_eq!(state.prerender.state().await, SessionState::Stopped);
        assert_eq!(state.prerender.cache_limits().await, (200, 60));
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = AppState::from_config(&Config::default(), Arc::new(NoBrowser));

        let response = stats_handler(State(state)).await;
        assert_eq!(response.session, SessionState::Stopped);
        assert_eq!(response.hits, 0);
        assert_eq!(response.total_entries, 0);
        assert_eq!(response.max_entries, 200);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
