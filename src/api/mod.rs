//! API Module
//!
//! HTTP handlers and routing for the caching proxy.
//!
//! # Endpoints
//! - `GET /currencies`, `GET /fact` - Cached upstream payloads (one route per endpoint)
//! - `GET /stats` - Fetcher statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
