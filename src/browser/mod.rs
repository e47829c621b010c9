//! Browser Module
//!
//! Headless rendering: the automation seam, the Chromium backend, the render
//! pipeline and the session manager that ties them to the render cache.

mod chromium;
mod engine;
mod pipeline;
mod session;

pub use chromium::ChromiumEngine;
pub use engine::{BrowserEngine, BrowserInstance, PageContext, Viewport};
pub use pipeline::{
    render_page, wait_for_condition, RenderOptions, READY_SIGNAL_EXPRESSION, TITLE_EXPRESSION,
};
pub use session::{BrowserSessionManager, SessionState};
