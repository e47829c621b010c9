//! Cache Entry Module
//!
//! Defines a single rendered page held by the render cache.

use std::time::{SystemTime, UNIX_EPOCH};

// == Cache Entry ==
/// A rendered HTML document and the moment its render completed.
///
/// Entries are never edited after insertion; a re-render replaces the entry
/// under the same key.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    content: String,
    created_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry stamped with the current time.
    pub fn new(content: String) -> Self {
        Self::created_at(content, current_timestamp_ms())
    }

    /// Creates an entry with an explicit creation timestamp (Unix milliseconds).
    pub fn created_at(content: String, created_at: u64) -> Self {
        Self {
            content,
            created_at,
        }
    }

    /// The rendered document.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Creation timestamp (Unix milliseconds).
    pub fn timestamp(&self) -> u64 {
        self.created_at
    }

    // == Age ==
    /// Milliseconds elapsed between creation and `now`, saturating at zero
    /// if the clock moved backwards.
    pub fn age_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.created_at)
    }

    // == Is Stale ==
    /// An entry stays fresh while its age is at most `ttl_seconds`; it is
    /// stale once the age strictly exceeds it.
    pub fn is_stale(&self, ttl_seconds: u64, now: u64) -> bool {
        self.age_ms(now) > ttl_seconds.saturating_mul(1000)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
