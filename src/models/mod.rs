//! Response models for the auxiliary endpoints
//!
//! Cached endpoints return the upstream JSON untouched; these DTOs cover
//! `/health`, `/stats` and error bodies.

pub mod responses;

// Re-export commonly used types
pub use responses::{ErrorResponse, HealthResponse, StatsResponse};
