//! Render Cache Module
//!
//! URL-keyed store of rendered documents with lazy TTL expiry and
//! oldest-entry eviction at capacity.

use std::collections::HashMap;

use tracing::debug;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheEntry, CacheStats};

// == Render Cache ==
/// In-memory map from absolute URL (query string included) to rendered HTML.
///
/// Expiry is checked on read only; there is no background sweep.
#[derive(Debug)]
pub struct RenderCache {
    entries: HashMap<String, CacheEntry>,
    stats: CacheStats,
    max_entries: usize,
    ttl_seconds: u64,
}

impl RenderCache {
    // == Constructor ==
    /// Creates an empty cache.
    ///
    /// # Arguments
    /// * `max_entries` - Capacity bound; `0` disables storage entirely
    /// * `ttl_seconds` - Maximum age of a servable entry
    pub fn new(max_entries: usize, ttl_seconds: u64) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            max_entries,
            ttl_seconds,
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    // == Get ==
    /// Returns the cached document if present and fresh.
    pub fn get(&mut self, key: &str) -> Option<String> {
        self.get_at(key, current_timestamp_ms())
    }

    /// [`get`](Self::get) evaluated at an explicit time (Unix milliseconds).
    ///
    /// A stale entry is removed before returning `None`.
    pub fn get_at(&mut self, key: &str, now: u64) -> Option<String> {
        let stale = match self.entries.get(key) {
            Some(entry) if !entry.is_stale(self.ttl_seconds, now) => {
                self.stats.record_hit();
                return Some(entry.content().to_string());
            }
            Some(_) => true,
            None => false,
        };

        if stale {
            self.entries.remove(key);
            self.stats.record_expiration();
            self.stats.set_total_entries(self.entries.len());
            debug!(key, "render cache entry expired");
        } else {
            self.stats.record_miss();
        }
        None
    }

    // == Put ==
    /// Stores a rendered document, stamping it with the current time.
    pub fn put(&mut self, key: String, content: String) {
        self.put_at(key, content, current_timestamp_ms());
    }

    /// [`put`](Self::put) evaluated at an explicit time (Unix milliseconds).
    ///
    /// Inserting a new key into a full cache first evicts the entry with the
    /// smallest creation time. Overwriting an existing key never evicts.
    pub fn put_at(&mut self, key: String, content: String, now: u64) {
        if self.max_entries == 0 {
            return;
        }

        if !self.entries.contains_key(&key) {
            while self.entries.len() >= self.max_entries {
                match self.oldest_key() {
                    Some(oldest) => {
                        self.entries.remove(&oldest);
                        self.stats.record_eviction();
                        debug!(key = %oldest, "render cache evicted oldest entry");
                    }
                    None => break,
                }
            }
        }

        self.entries.insert(key, CacheEntry::created_at(content, now));
        self.stats.set_total_entries(self.entries.len());
    }

    fn oldest_key(&self) -> Option<String> {
        self.entries
            .iter()
            .min_by_key(|(_, entry)| entry.timestamp())
            .map(|(key, _)| key.clone())
    }

    // == Clear ==
    /// Removes every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.set_total_entries(0);
    }

    /// Whether `key` is stored, fresh or not. Does not touch the counters.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
