//! Error types for the prerender server
//!
//! Provides unified error handling using thiserror. None of these ever reach an
//! HTTP client: the interceptor treats every variant as "could not prerender".

use std::time::Duration;

use thiserror::Error;

// == Prerender Error Enum ==
/// Unified error type for the prerender subsystem.
#[derive(Error, Debug)]
pub enum PrerenderError {
    /// Automation engine or browser failed to launch
    #[error("Browser session failed to start: {0}")]
    SessionStart(String),

    /// Page did not finish loading within the navigation bound
    #[error("Navigation to {url} timed out after {timeout:?}")]
    NavigationTimeout { url: String, timeout: Duration },

    /// Navigation failed for a reason other than a timeout
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// The DOM could not be serialized
    #[error("Content extraction failed: {0}")]
    Extraction(String),

    /// Extraction succeeded but produced no content
    #[error("Rendered content was empty for {0}")]
    EmptyContent(String),

    /// Closing a page, context, browser or engine failed
    #[error("Cleanup failed: {0}")]
    Cleanup(String),
}

impl PrerenderError {
    /// Whether this error came from a time bound being exceeded.
    pub fn is_timeout(&self) -> bool {
        matches!(self, PrerenderError::NavigationTimeout { .. })
    }
}

// == Result Type Alias ==
/// Convenience Result type for the prerender server.
pub type Result<T> = std::result::Result<T, PrerenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_timeout_display() {
        let err = PrerenderError::NavigationTimeout {
            url: "http://localhost/a".to_string(),
            timeout: Duration::from_secs(45),
        };
        let msg = err.to_string();
        assert!(msg.contains("http://localhost/a"));
        assert!(msg.contains("45s"));
        assert!(err.is_timeout());
    }

    #[test]
    fn test_other_errors_are_not_timeouts() {
        assert!(!PrerenderError::SessionStart("boom".to_string()).is_timeout());
        assert!(!PrerenderError::EmptyContent("u".to_string()).is_timeout());
    }
}
