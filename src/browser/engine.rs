//! Browser Automation Seam
//!
//! The session manager only talks to these traits, so the Chromium backend can
//! be swapped for an in-memory engine in tests.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Fixed window size pages are rendered at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1365,
            height: 768,
        }
    }
}

/// Starts browser processes.
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    /// Launches the automation connection and a headless browser.
    ///
    /// On error nothing is left running.
    async fn launch(&self) -> Result<Box<dyn BrowserInstance>>;
}

/// A running browser together with the connection driving it.
#[async_trait]
pub trait BrowserInstance: Send + Sync {
    /// Opens a page inside a fresh isolated context (own cookies and storage).
    async fn open_page(&self, viewport: Viewport) -> Result<Box<dyn PageContext>>;

    /// Closes the browser and stops its connection.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// One page living in its own browsing context.
///
/// A page holds whatever it needs to tear itself down, so it can outlive the
/// lock that was held while opening it.
#[async_trait]
pub trait PageContext: Send + Sync {
    /// Navigates and returns once the load event fired and the network has
    /// been quiet for `network_idle`. Callers bound this with their own timeout.
    async fn navigate(&self, url: &str, network_idle: Duration) -> Result<()>;

    /// Evaluates a JavaScript expression that yields a boolean.
    async fn eval_bool(&self, expression: &str) -> Result<bool>;

    /// Serializes the current DOM.
    async fn content(&self) -> Result<String>;

    /// Closes the page and disposes its context.
    async fn close(self: Box<Self>) -> Result<()>;
}
