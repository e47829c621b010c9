//! SEO Prerender - bot-aware server-side rendering for a single-page application
//!
//! Serves the SPA normally, but renders pages through headless Chromium for
//! search-engine and link-preview crawlers, caching results with a TTL.

pub mod api;
pub mod browser;
pub mod cache;
pub mod classifier;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod models;

pub use api::{create_router, AppState};
pub use browser::{BrowserSessionManager, ChromiumEngine};
pub use config::Config;
pub use error::{PrerenderError, Result};
