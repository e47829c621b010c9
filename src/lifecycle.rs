//! Startup and shutdown hooks for the browser session.
//!
//! Both are no-ops unless prerendering is active, and neither can fail the
//! process: start errors are logged and the next render retries the launch.

use tracing::{info, warn};

use crate::api::AppState;

/// Boot hook: warm up the browser so the first crawler is not kept waiting.
pub async fn on_startup(state: &AppState) {
    if !state.prerender_active {
        info!("prerender disabled for this deployment");
        return;
    }

    match state.prerender.start().await {
        Ok(()) => info!("prerender enabled, browser ready"),
        Err(e) => warn!(error = %e, "browser failed to start, will retry on first render"),
    }
}

/// Shutdown hook: close the browser and drop cached renders.
pub async fn on_shutdown(state: &AppState) {
    if !state.prerender_active {
        return;
    }
    state.prerender.stop().await;
}
