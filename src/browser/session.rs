//! Browser Session Manager
//!
//! Owns the single shared browser and the render cache. Launching, closing
//! and opening pages all go through one async mutex so two requests can never
//! launch two browsers, and a close can never race a launch. Navigation runs
//! outside that mutex, each page in its own isolated context.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::browser::engine::{BrowserEngine, BrowserInstance, PageContext};
use crate::browser::pipeline::{render_page, RenderOptions};
use crate::cache::{CacheStats, RenderCache};
use crate::error::{PrerenderError, Result};

/// Observable lifecycle state. `Starting` and `Stopping` only exist while the
/// session mutex is held and are never observed from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Stopped,
    Running,
}

pub struct BrowserSessionManager {
    engine: Arc<dyn BrowserEngine>,
    session: Mutex<Option<Box<dyn BrowserInstance>>>,
    cache: RwLock<RenderCache>,
    options: RenderOptions,
    launches: AtomicU64,
    /// Bumped by every stop; renders begun under an older value are not cached
    generation: AtomicU64,
}

impl BrowserSessionManager {
    /// Creates a stopped manager. Nothing is launched until the first
    /// [`start`](Self::start) or [`render`](Self::render).
    pub fn new(
        engine: Arc<dyn BrowserEngine>,
        cache: RenderCache,
        options: RenderOptions,
    ) -> Self {
        Self {
            engine,
            session: Mutex::new(None),
            cache: RwLock::new(cache),
            options,
            launches: AtomicU64::new(0),
            generation: AtomicU64::new(0),
        }
    }

    // == Start ==
    /// Launches the browser unless it is already running.
    pub async fn start(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        self.launch_locked(&mut session).await
    }

    async fn launch_locked(&self, session: &mut Option<Box<dyn BrowserInstance>>) -> Result<()> {
        if session.is_some() {
            return Ok(());
        }

        let started = Instant::now();
        let instance = self.engine.launch().await?;
        *session = Some(instance);
        self.launches.fetch_add(1, Ordering::SeqCst);

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "browser session started"
        );
        Ok(())
    }

    // == Stop ==
    /// Closes the browser and clears the cache. Close failures are logged and
    /// swallowed; the session always ends up stopped.
    pub async fn stop(&self) {
        let mut session = self.session.lock().await;
        let Some(instance) = session.take() else {
            return;
        };

        if let Err(e) = instance.close().await {
            warn!(error = %e, "browser close failed, session dropped anyway");
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cache.write().await.clear();

        info!("browser session stopped");
    }

    // == Render ==
    /// Returns the rendered HTML for `url`, from cache when fresh.
    ///
    /// Starts the session on demand. Empty output is reported as
    /// [`PrerenderError::EmptyContent`] and never cached. The page is driven
    /// and closed on its own task, so dropping this future (a crawler hanging
    /// up) cannot leave the page or its browser context open.
    pub async fn render(&self, url: &str) -> Result<String> {
        if let Some(html) = self.cache.write().await.get(url) {
            debug!(url, "prerender cache hit");
            return Ok(html);
        }
        debug!(url, "prerender cache miss");

        let (page, generation) = self.open_page().await?;
        let options = self.options.clone();
        let target = url.to_string();
        let task = tokio::spawn(async move {
            let outcome = render_page(page.as_ref(), &target, &options).await;
            if let Err(e) = page.close().await {
                debug!(url = %target, error = %e, "page cleanup failed");
            }
            outcome
        });

        let html = task
            .await
            .map_err(|e| PrerenderError::Extraction(format!("render task failed: {}", e)))??;
        if html.trim().is_empty() {
            return Err(PrerenderError::EmptyContent(url.to_string()));
        }

        let mut cache = self.cache.write().await;
        if self.generation.load(Ordering::SeqCst) == generation {
            cache.put(url.to_string(), html.clone());
        } else {
            debug!(url, "session stopped during render, result not cached");
        }
        Ok(html)
    }

    /// Opens a page under the session mutex, launching the browser first if needed.
    /// Also returns the stop generation the page was opened in.
    ///
    /// A browser that cannot open pages is assumed dead and torn down so the
    /// next render relaunches it.
    async fn open_page(&self) -> Result<(Box<dyn PageContext>, u64)> {
        let mut session = self.session.lock().await;
        self.launch_locked(&mut session).await?;
        let generation = self.generation.load(Ordering::SeqCst);

        let opened = match session.as_ref() {
            Some(instance) => instance.open_page(self.options.viewport).await,
            None => return Err(PrerenderError::SessionStart("session vanished".to_string())),
        };

        match opened {
            Ok(page) => Ok((page, generation)),
            Err(e) => {
                warn!(error = %e, "browser could not open a page, discarding session");
                if let Some(broken) = session.take() {
                    if let Err(close_err) = broken.close().await {
                        debug!(error = %close_err, "closing broken browser failed");
                    }
                }
                Err(e)
            }
        }
    }

    pub async fn state(&self) -> SessionState {
        if self.session.lock().await.is_some() {
            SessionState::Running
        } else {
            SessionState::Stopped
        }
    }

    /// Number of successful browser launches since construction.
    pub fn launches(&self) -> u64 {
        self.launches.load(Ordering::SeqCst)
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    pub async fn cache_limits(&self) -> (usize, u64) {
        let cache = self.cache.read().await;
        (cache.max_entries(), cache.ttl_seconds())
    }
}
