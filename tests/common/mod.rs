//! In-memory browser engine shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use seo_prerender::browser::{
    BrowserEngine, BrowserInstance, BrowserSessionManager, PageContext, RenderOptions, Viewport,
};
use seo_prerender::cache::RenderCache;
use seo_prerender::{PrerenderError, Result};

/// How pages opened by the fake browser behave.
#[derive(Debug, Clone, PartialEq)]
pub enum PageBehaviour {
    /// Renders a document naming the URL
    Render,
    /// Navigation never completes
    HangNavigation,
    /// Navigation completes after the given delay
    SlowNavigation(Duration),
    /// Renders whitespace only
    Empty,
    /// DOM serialization fails
    FailExtraction,
    /// The browser refuses to open pages
    FailOpen,
}

/// Counters and switches observed and driven by the tests.
pub struct Tracker {
    pub launches: AtomicUsize,
    pub browser_closes: AtomicUsize,
    pub pages_opened: AtomicUsize,
    pub pages_closed: AtomicUsize,
    pub fail_launch: AtomicBool,
    pub fail_close: AtomicBool,
    pub launch_delay: Mutex<Duration>,
    pub behaviour: Mutex<PageBehaviour>,
    pub last_viewport: Mutex<Option<Viewport>>,
}

impl Tracker {
    pub fn set_behaviour(&self, behaviour: PageBehaviour) {
        *self.behaviour.lock().unwrap() = behaviour;
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn pages_opened(&self) -> usize {
        self.pages_opened.load(Ordering::SeqCst)
    }

    pub fn pages_closed(&self) -> usize {
        self.pages_closed.load(Ordering::SeqCst)
    }

    pub fn browser_closes(&self) -> usize {
        self.browser_closes.load(Ordering::SeqCst)
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self {
            launches: AtomicUsize::new(0),
            browser_closes: AtomicUsize::new(0),
            pages_opened: AtomicUsize::new(0),
            pages_closed: AtomicUsize::new(0),
            fail_launch: AtomicBool::new(false),
            fail_close: AtomicBool::new(false),
            launch_delay: Mutex::new(Duration::ZERO),
            behaviour: Mutex::new(PageBehaviour::Render),
            last_viewport: Mutex::new(None),
        }
    }
}

pub struct FakeEngine {
    pub tracker: Arc<Tracker>,
}

impl FakeEngine {
    pub fn new() -> (Arc<Self>, Arc<Tracker>) {
        let tracker = Arc::new(Tracker::default());
        (
            Arc::new(Self {
                tracker: Arc::clone(&tracker),
            }),
            tracker,
        )
    }
}

#[async_trait]
impl BrowserEngine for FakeEngine {
    async fn launch(&self) -> Result<Box<dyn BrowserInstance>> {
        let delay = *self.tracker.launch_delay.lock().unwrap();
        tokio::time::sleep(delay).await;

        if self.tracker.fail_launch.load(Ordering::SeqCst) {
            return Err(PrerenderError::SessionStart("chromium not found".to_string()));
        }
        self.tracker.launches.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeBrowser {
            tracker: Arc::clone(&self.tracker),
        }))
    }
}

struct FakeBrowser {
    tracker: Arc<Tracker>,
}

#[async_trait]
impl BrowserInstance for FakeBrowser {
    async fn open_page(&self, viewport: Viewport) -> Result<Box<dyn PageContext>> {
        let behaviour = self.tracker.behaviour.lock().unwrap().clone();
        if behaviour == PageBehaviour::FailOpen {
            return Err(PrerenderError::Navigation("target crashed".to_string()));
        }

        *self.tracker.last_viewport.lock().unwrap() = Some(viewport);
        self.tracker.pages_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakePage {
            tracker: Arc::clone(&self.tracker),
            behaviour,
            url: Mutex::new(String::new()),
        }))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.tracker.browser_closes.fetch_add(1, Ordering::SeqCst);
        if self.tracker.fail_close.load(Ordering::SeqCst) {
            return Err(PrerenderError::Cleanup("browser already gone".to_string()));
        }
        Ok(())
    }
}

struct FakePage {
    tracker: Arc<Tracker>,
    behaviour: PageBehaviour,
    url: Mutex<String>,
}

#[async_trait]
impl PageContext for FakePage {
    async fn navigate(&self, url: &str, _network_idle: Duration) -> Result<()> {
        match self.behaviour {
            PageBehaviour::HangNavigation => std::future::pending::<()>().await,
            PageBehaviour::SlowNavigation(delay) => tokio::time::sleep(delay).await,
            _ => {}
        }
        *self.url.lock().unwrap() = url.to_string();
        Ok(())
    }

    async fn eval_bool(&self, _expression: &str) -> Result<bool> {
        Ok(true)
    }

    async fn content(&self) -> Result<String> {
        match self.behaviour {
            PageBehaviour::Empty => Ok("   ".to_string()),
            PageBehaviour::FailExtraction => {
                Err(PrerenderError::Extraction("execution context destroyed".to_string()))
            }
            _ => Ok(rendered_html(&self.url.lock().unwrap())),
        }
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.tracker.pages_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// The document the fake browser produces for `url`.
pub fn rendered_html(url: &str) -> String {
    format!(
        "<html><head><title>{}</title></head><body>rendered {}</body></html>",
        url, url
    )
}

/// Render options with bounds short enough for tests.
pub fn fast_options() -> RenderOptions {
    RenderOptions {
        navigation_timeout: Duration::from_millis(100),
        network_idle: Duration::ZERO,
        ready_timeout: Duration::from_millis(50),
        title_timeout: Duration::from_millis(50),
        poll_interval: Duration::from_millis(5),
        ..RenderOptions::default()
    }
}

pub fn manager(max_entries: usize, ttl_seconds: u64) -> (Arc<BrowserSessionManager>, Arc<Tracker>) {
    let (engine, tracker) = FakeEngine::new();
    let manager = BrowserSessionManager::new(
        engine,
        RenderCache::new(max_entries, ttl_seconds),
        fast_options(),
    );
    (Arc::new(manager), tracker)
}
