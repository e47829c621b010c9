//! Prerender Interceptor
//!
//! Middleware deciding, per request, whether a crawler gets a headless render
//! or the request continues to the regular handlers untouched.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use super::handlers::AppState;
use crate::classifier::is_bot;

/// Response header marking a prerendered document.
pub const PRERENDERED_HEADER: &str = "x-prerendered";

/// Extensions served as static files, never prerendered.
const ASSET_EXTENSIONS: &[&str] = &[
    ".css", ".js", ".png", ".jpg", ".jpeg", ".webp", ".svg", ".ico", ".map", ".json", ".txt",
    ".woff", ".woff2", ".ttf", ".eot",
];

/// What the interceptor does with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Path is never prerendered, whatever the flags say
    Bypass,
    /// Feature is off for this deployment
    Disabled,
    /// Neither a crawler nor a forced render
    NotRequested,
    Render,
}

/// Paths that always go straight to their handler: the API, robots, sitemaps,
/// machine-readable files and static assets.
pub fn is_hard_bypass(path: &str) -> bool {
    let p = path.to_ascii_lowercase();
    p.starts_with("/api")
        || p == "/robots.txt"
        || p.starts_with("/sitemap")
        || p.ends_with(".xml")
        || p.ends_with(".txt")
        || p.ends_with(".json")
        || p.starts_with("/assets")
        || p.starts_with("/static")
}

/// Whether a path looks like a page of the application: the root, an
/// `.html` document, or a last segment without extension.
pub fn is_page_path(path: &str) -> bool {
    let p = path.to_ascii_lowercase();
    if ASSET_EXTENSIONS.iter().any(|ext| p.ends_with(ext)) {
        return false;
    }
    if p == "/" || p.ends_with(".html") {
        return true;
    }
    let last_segment = p.rsplit('/').next().unwrap_or("");
    !last_segment.contains('.')
}

/// `?prerender=1` or the legacy `_escaped_fragment_` parameter.
pub fn is_forced(query: Option<&str>) -> bool {
    let Some(query) = query else {
        return false;
    };
    url::form_urlencoded::parse(query.as_bytes())
        .any(|(key, value)| (key == "prerender" && value == "1") || key == "_escaped_fragment_")
}

/// Applies the bypass rules, feature gate and eligibility check in order.
pub fn decide(method: &Method, uri: &Uri, user_agent: &str, enabled: bool) -> Decision {
    let path = uri.path();
    if !matches!(*method, Method::GET | Method::HEAD) || is_hard_bypass(path) || !is_page_path(path)
    {
        return Decision::Bypass;
    }
    if !enabled {
        return Decision::Disabled;
    }
    if is_forced(uri.query()) || is_bot(user_agent) {
        Decision::Render
    } else {
        Decision::NotRequested
    }
}

/// Public URL of the request: base + path + query string.
pub fn absolute_url(base: &str, uri: &Uri) -> String {
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    format!("{}{}", base.trim_end_matches('/'), path_and_query)
}

/// Middleware entry point.
///
/// A failed or empty render falls through to `next`, so crawlers get the
/// regular SPA shell instead of an error.
pub async fn prerender_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let decision = decide(
        request.method(),
        request.uri(),
        user_agent,
        state.prerender_active,
    );
    if decision != Decision::Render {
        return next.run(request).await;
    }

    let url = absolute_url(&state.public_base_url, request.uri());
    debug!(url = %url, user_agent, "prerendering for crawler");

    match state.prerender.render(&url).await {
        Ok(html) => prerendered_response(html),
        Err(e) => {
            warn!(url = %url, error = %e, "prerender failed, serving regular response");
            next.run(request).await
        }
    }
}

fn prerendered_response(html: String) -> Response {
    (
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/html; charset=utf-8"),
            ),
            (
                header::HeaderName::from_static(PRERENDERED_HEADER),
                HeaderValue::from_static("1"),
            ),
        ],
        Body::from(html),
    )
        .into_response()
}
