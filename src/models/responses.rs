//! Response DTOs for the server's own endpoints

use serde::Serialize;

use crate::browser::SessionState;
use crate::cache::CacheStats;

/// Response body for GET /api/prerender/stats
#[derive(Debug, Clone, Serialize)]
pub struct PrerenderStatsResponse {
    /// Whether this deployment prerenders at all
    pub active: bool,
    pub session: SessionState,
    /// Browser launches since boot
    pub launches: u64,
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub evictions: u64,
    pub total_entries: usize,
    /// hits / (hits + misses)
    pub hit_rate: f64,
    pub max_entries: usize,
    pub ttl_seconds: u64,
}

impl PrerenderStatsResponse {
    pub fn new(
        active: bool,
        session: SessionState,
        launches: u64,
        stats: CacheStats,
        max_entries: usize,
        ttl_seconds: u64,
    ) -> Self {
        Self {
            active,
            session,
            launches,
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
            evictions: stats.evictions,
            total_entries: stats.total_entries,
            max_entries,
            ttl_seconds,
        }
    }
}

/// Response body for the health endpoint (GET /api/health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_response_serialize() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            expirations: 1,
            evictions: 0,
            total_entries: 2,
        };
        let resp = PrerenderStatsResponse::new(true, SessionState::Running, 1, stats, 200, 60);
        assert!((resp.hit_rate - 0.75).abs() < 0.001);

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["session"], "running");
        assert_eq!(json["active"], true);
        assert_eq!(json["total_entries"], 2);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
