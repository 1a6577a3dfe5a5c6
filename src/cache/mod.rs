//! Cache Module
//!
//! Cache-aside fetching over a key-value store, with hit/miss accounting.

mod fetcher;
mod stats;


// Re-export public types
pub use fetcher::CacheAsideFetcher;
pub use stats::{CacheStats, FetcherStats};
