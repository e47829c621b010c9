//! Render Pipeline
//!
//! Drives one opened page from navigation to serialized HTML. Opening and
//! closing the page belongs to the session manager, which always closes it
//! whatever this returns.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::browser::engine::{PageContext, Viewport};
use crate::error::{PrerenderError, Result};

/// Global the front-end sets once its own data loading and filtering finished.
pub const READY_SIGNAL_EXPRESSION: &str = "window.__PRERENDER_STATE__ !== undefined";

/// True once the document has a non-empty title.
pub const TITLE_EXPRESSION: &str = "!!(document.title && document.title.length > 0)";

/// Default timeout for page navigation.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(45);

/// Default wait for the readiness signal.
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(12);

/// Default wait for a non-empty document title.
pub const DEFAULT_TITLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Quiet period after the load event treated as network idle.
pub const DEFAULT_NETWORK_IDLE: Duration = Duration::from_millis(500);

/// Knobs for a single render.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub viewport: Viewport,
    /// Bound on navigation including the network-idle period
    pub navigation_timeout: Duration,
    pub network_idle: Duration,
    pub ready_timeout: Duration,
    pub title_timeout: Duration,
    /// Delay between evaluations while waiting on a condition
    pub poll_interval: Duration,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            network_idle: DEFAULT_NETWORK_IDLE,
            ready_timeout: DEFAULT_READY_TIMEOUT,
            title_timeout: DEFAULT_TITLE_TIMEOUT,
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Navigates `page` to `url`, waits for the page to settle, and returns the DOM.
///
/// Only navigation and extraction can fail; the readiness and title waits are
/// best effort and never abort the render.
pub async fn render_page(
    page: &dyn PageContext,
    url: &str,
    options: &RenderOptions,
) -> Result<String> {
    let started = Instant::now();

    match tokio::time::timeout(
        options.navigation_timeout,
        page.navigate(url, options.network_idle),
    )
    .await
    {
        Ok(result) => result?,
        Err(_) => {
            return Err(PrerenderError::NavigationTimeout {
                url: url.to_string(),
                timeout: options.navigation_timeout,
            })
        }
    }

    let ready = wait_for_condition(
        page,
        READY_SIGNAL_EXPRESSION,
        options.ready_timeout,
        options.poll_interval,
    )
    .await;
    if !ready {
        debug!(url, "readiness signal not seen, rendering current DOM");
    }

    let titled = wait_for_condition(
        page,
        TITLE_EXPRESSION,
        options.title_timeout,
        options.poll_interval,
    )
    .await;
    if !titled {
        debug!(url, "document title still empty");
    }

    let html = page.content().await?;
    debug!(
        url,
        bytes = html.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "page rendered"
    );
    Ok(html)
}

/// Polls `expression` until it evaluates to true or `timeout` elapses.
///
/// Evaluation errors count as "not yet". Returns whether the condition held.
pub async fn wait_for_condition(
    page: &dyn PageContext,
    expression: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> bool {
    let poll = async {
        loop {
            if let Ok(true) = page.eval_bool(expression).await {
                return;
            }
            tokio::time::sleep(poll_interval).await;
        }
    };
    tokio::time::timeout(timeout, poll).await.is_ok()
}
