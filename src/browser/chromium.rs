//! Chromium backend over the Chrome DevTools Protocol.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::browser::engine::{BrowserEngine, BrowserInstance, PageContext, Viewport};
use crate::error::{PrerenderError, Result};

/// Headroom on top of the navigation bound for any single CDP command, so
/// chromiumoxide never times a navigation out before the pipeline does.
const REQUEST_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

/// The browser slot shared with open pages. Only [`ChromiumInstance::close`]
/// takes the browser out, so it stays the single owner of the process.
type SharedBrowser = Arc<RwLock<Option<Browser>>>;

/// Launches headless Chromium through chromiumoxide.
#[derive(Debug, Clone)]
pub struct ChromiumEngine {
    chrome_executable: Option<PathBuf>,
    request_timeout: Duration,
}

impl ChromiumEngine {
    /// Uses `chrome_executable` when given, otherwise chromiumoxide's auto-detection.
    /// CDP commands are allowed to outlast `navigation_timeout`.
    pub fn new(chrome_executable: Option<PathBuf>, navigation_timeout: Duration) -> Self {
        Self {
            chrome_executable,
            request_timeout: navigation_timeout + REQUEST_TIMEOUT_MARGIN,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(self.request_timeout);

        if let Some(ref path) = self.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        builder
            .build()
            .map_err(|e| PrerenderError::SessionStart(format!("invalid browser config: {}", e)))
    }
}

#[async_trait]
impl BrowserEngine for ChromiumEngine {
    async fn launch(&self) -> Result<Box<dyn BrowserInstance>> {
        let config = self.browser_config()?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| PrerenderError::SessionStart(format!("failed to launch browser: {}", e)))?;

        // The CDP connection only makes progress while its handler is polled
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "CDP handler error");
                }
            }
            debug!("CDP handler exited");
        });

        info!(
            request_timeout_ms = self.request_timeout.as_millis() as u64,
            "headless Chromium launched"
        );

        Ok(Box::new(ChromiumInstance {
            browser: Arc::new(RwLock::new(Some(browser))),
            handler_task,
        }))
    }
}

/// The browser and the task pumping its CDP connection, always held together.
struct ChromiumInstance {
    browser: SharedBrowser,
    handler_task: JoinHandle<()>,
}

#[async_trait]
impl BrowserInstance for ChromiumInstance {
    async fn open_page(&self, viewport: Viewport) -> Result<Box<dyn PageContext>> {
        let slot = self.browser.read().await;
        let Some(browser) = slot.as_ref() else {
            return Err(PrerenderError::Navigation("browser already closed".to_string()));
        };

        let context_id = browser
            .execute(CreateBrowserContextParams::default())
            .await
            .map_err(|e| PrerenderError::Navigation(format!("failed to create context: {}", e)))?
            .result
            .browser_context_id;

        let page = match new_page_in(browser, &context_id, viewport).await {
            Ok(page) => page,
            Err(e) => {
                dispose_context(browser, context_id).await;
                return Err(e);
            }
        };

        Ok(Box::new(ChromiumPage {
            browser: Arc::clone(&self.browser),
            context_id,
            page,
        }))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let ChromiumInstance {
            browser,
            handler_task,
        } = *self;

        let taken = browser.write().await.take();
        let closed = match taken {
            Some(mut browser) => {
                let closed = browser
                    .close()
                    .await
                    .map(|_| ())
                    .map_err(|e| PrerenderError::Cleanup(format!("browser close failed: {}", e)));
                if closed.is_err() {
                    if let Some(Err(e)) = browser.kill().await {
                        warn!(error = %e, "failed to kill browser process");
                    }
                }
                if let Err(e) = browser.wait().await {
                    debug!(error = %e, "waiting for browser process failed");
                }
                closed
            }
            None => Ok(()),
        };

        handler_task.abort();
        closed
    }
}

async fn new_page_in(
    browser: &Browser,
    context_id: &BrowserContextId,
    viewport: Viewport,
) -> Result<Page> {
    let target = CreateTargetParams::builder()
        .url("about:blank")
        .browser_context_id(context_id.clone())
        .build()
        .map_err(PrerenderError::Navigation)?;

    let page = browser
        .new_page(target)
        .await
        .map_err(|e| PrerenderError::Navigation(format!("failed to open page: {}", e)))?;

    let metrics = SetDeviceMetricsOverrideParams::new(
        i64::from(viewport.width),
        i64::from(viewport.height),
        1.0,
        false,
    );
    if let Err(e) = page.execute(metrics).await {
        if let Err(close_err) = page.close().await {
            debug!(error = %close_err, "closing half-opened page failed");
        }
        return Err(PrerenderError::Navigation(format!(
            "failed to set viewport: {}",
            e
        )));
    }

    Ok(page)
}

async fn dispose_context(browser: &Browser, context_id: BrowserContextId) {
    if let Err(e) = browser
        .execute(DisposeBrowserContextParams::new(context_id))
        .await
    {
        warn!(error = %e, "failed to dispose browser context");
    }
}

struct ChromiumPage {
    browser: SharedBrowser,
    context_id: BrowserContextId,
    page: Page,
}

#[async_trait]
impl PageContext for ChromiumPage {
    async fn navigate(&self, url: &str, network_idle: Duration) -> Result<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| PrerenderError::Navigation(format!("{}: {}", url, e)))?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| PrerenderError::Navigation(format!("{}: {}", url, e)))?;

        tokio::time::sleep(network_idle).await;
        Ok(())
    }

    async fn eval_bool(&self, expression: &str) -> Result<bool> {
        self.page
            .evaluate(expression)
            .await
            .map_err(|e| PrerenderError::Extraction(format!("evaluate failed: {}", e)))?
            .into_value::<bool>()
            .map_err(|e| PrerenderError::Extraction(format!("non-boolean result: {}", e)))
    }

    async fn content(&self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| PrerenderError::Extraction(e.to_string()))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let ChromiumPage {
            browser,
            context_id,
            page,
        } = *self;

        let closed = page
            .close()
            .await
            .map_err(|e| PrerenderError::Cleanup(format!("page close failed: {}", e)));

        // Disposing the context also closes any page the first step missed.
        // Once the browser is gone there is nothing left to dispose.
        if let Some(browser) = browser.read().await.as_ref() {
            browser
                .execute(DisposeBrowserContextParams::new(context_id))
                .await
                .map_err(|e| PrerenderError::Cleanup(format!("context dispose failed: {}", e)))?;
        }

        closed
    }
}
