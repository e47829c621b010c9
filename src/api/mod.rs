//! API Module
//!
//! HTTP surface: the prerender interceptor, the server's own JSON endpoints,
//! and the router serving the single-page application.
//!
//! # Endpoints
//! - `GET /api/health` - Health check endpoint
//! - `GET /api/prerender/stats` - Prerender cache statistics
//! - fallback - SPA files, `index.html` for unknown paths

pub mod handlers;
pub mod interceptor;
pub mod routes;

pub use handlers::*;
pub use interceptor::{prerender_middleware, PRERENDERED_HEADER};
pub use routes::create_router;
