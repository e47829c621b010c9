//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::browser::RenderOptions;
use crate::cache::{DEFAULT_MAX_ENTRIES, DEFAULT_TTL_SECONDS};

/// Deployment mode. Prerendering is only ever allowed in production.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Dev,
    Prod,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Ok(Mode::Prod),
            "dev" | "development" => Ok(Mode::Dev),
            other => Err(format!("unknown ENV value '{}'", other)),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Deployment mode (`ENV`)
    pub mode: Mode,
    /// Secondary feature gate (`ENABLE_PRERENDER`)
    pub enable_prerender: bool,
    /// Public origin used to rebuild absolute URLs, without trailing slash
    pub public_base_url: String,
    /// Seconds a rendered page stays fresh in the cache
    pub ttl_seconds: u64,
    /// Maximum number of rendered pages kept in memory
    pub max_entries: usize,
    /// Navigation and readiness bounds for the render pipeline
    pub render: RenderOptions,
    /// Explicit browser binary, auto-detected when absent
    pub chrome_executable: Option<PathBuf>,
    /// HTTP server port
    pub server_port: u16,
    /// Directory holding the single-page-application shell and assets
    pub frontend_dir: PathBuf,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `ENV` - `dev` or `prod` (default: dev)
    /// - `ENABLE_PRERENDER` - truthy string (default: false)
    /// - `PUBLIC_BASE_URL` - public origin (default: http://127.0.0.1:8000)
    /// - `PRERENDER_TTL_SECONDS` - cache TTL (default: 60)
    /// - `PRERENDER_MAX_ENTRIES` - cache capacity (default: 200)
    /// - `PRERENDER_NAV_TIMEOUT_MS` - navigation bound (default: 45000)
    /// - `PRERENDER_READY_TIMEOUT_MS` - readiness signal wait (default: 12000)
    /// - `PRERENDER_TITLE_TIMEOUT_MS` - document title wait (default: 5000)
    /// - `CHROME_EXECUTABLE` - browser binary (default: auto-detect)
    /// - `SERVER_PORT` - HTTP server port (default: 8000)
    /// - `FRONTEND_DIR` - SPA directory (default: frontend)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let render_defaults = RenderOptions::default();

        let mode = match env::var("ENV") {
            Ok(raw) => raw.parse().unwrap_or_else(|err| {
                tracing::warn!("{}, falling back to dev", err);
                Mode::Dev
            }),
            Err(_) => defaults.mode,
        };

        Self {
            mode,
            enable_prerender: env::var("ENABLE_PRERENDER")
                .map(|v| is_truthy(&v))
                .unwrap_or(defaults.enable_prerender),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .map(|v| normalize_base_url(&v))
                .unwrap_or(defaults.public_base_url),
            ttl_seconds: parse_var("PRERENDER_TTL_SECONDS").unwrap_or(defaults.ttl_seconds),
            max_entries: parse_var("PRERENDER_MAX_ENTRIES").unwrap_or(defaults.max_entries),
            render: RenderOptions {
                navigation_timeout: parse_var("PRERENDER_NAV_TIMEOUT_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(render_defaults.navigation_timeout),
                ready_timeout: parse_var("PRERENDER_READY_TIMEOUT_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(render_defaults.ready_timeout),
                title_timeout: parse_var("PRERENDER_TITLE_TIMEOUT_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(render_defaults.title_timeout),
                ..render_defaults
            },
            chrome_executable: env::var("CHROME_EXECUTABLE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            frontend_dir: env::var("FRONTEND_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.frontend_dir),
        }
    }

    /// Both gates: production mode and the feature flag.
    pub fn prerender_active(&self) -> bool {
        self.mode == Mode::Prod && self.enable_prerender
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Dev,
            enable_prerender: false,
            public_base_url: "http://127.0.0.1:8000".to_string(),
            ttl_seconds: DEFAULT_TTL_SECONDS,
            max_entries: DEFAULT_MAX_ENTRIES,
            render: RenderOptions::default(),
            chrome_executable: None,
            server_port: 8000,
            frontend_dir: PathBuf::from("frontend"),
        }
    }
}

/// Boolean-like environment strings: `1`, `true`, `yes`, `on`.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn normalize_base_url(value: &str) -> String {
    value.trim().trim_end_matches('/').to_string()
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
