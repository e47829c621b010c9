//! Response models for the server's own JSON endpoints

pub mod responses;

pub use responses::{HealthResponse, PrerenderStatsResponse};
