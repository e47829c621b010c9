//! Cache Module
//!
//! In-memory render cache with TTL expiry and oldest-entry eviction.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use stats::CacheStats;
pub use store::RenderCache;

// == Public Constants ==
/// Default seconds a rendered page stays servable
pub const DEFAULT_TTL_SECONDS: u64 = 60;

/// Default number of rendered pages kept in memory
pub const DEFAULT_MAX_ENTRIES: usize = 200;
