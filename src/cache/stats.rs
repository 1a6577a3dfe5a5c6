//! Cache Statistics Module
//!
//! Tracks fetcher outcomes: hits, misses, upstream errors and write failures.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Fetcher Counters ==
/// Lock-free counters shared by concurrent requests.
#[derive(Debug, Default)]
pub struct FetcherStats {
    hits: AtomicU64,
    misses: AtomicU64,
    upstream_errors: AtomicU64,
    write_failures: AtomicU64,
}

impl FetcherStats {
    /// Creates a counter set with every value at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_upstream_error(&self) {
        self.upstream_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Reads every counter into a plain value.
    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            upstream_errors: self.upstream_errors.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
        }
    }
}

// == Cache Stats ==
/// Point-in-time copy of the fetcher counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Requests answered from the store
    pub hits: u64,
    /// Requests that went upstream
    pub misses: u64,
    /// Misses whose upstream fetch failed
    pub upstream_errors: u64,
    /// Fetched payloads that could not be written back
    pub write_failures: u64,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
