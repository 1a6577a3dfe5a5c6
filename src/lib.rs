//! Cache Proxy - caches upstream API responses in a key-value store
//!
//! Each endpoint serves its cached JSON when present, otherwise fetches it
//! from a fixed upstream URL, stores it with a TTL, and returns it.

pub mod api;
pub mod cache;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod models;
pub mod store;
pub mod tasks;
pub mod upstream;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
