//! Store Module
//!
//! Key-value store seam used by the cache-aside fetcher, with a Redis
//! backend for production and an in-memory TTL backend.

mod entry;
mod memory;
mod redis_store;

use async_trait::async_trait;

use crate::error::StoreError;

pub use entry::StoredValue;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

// == Key-Value Store Trait ==
/// String key-value store with per-entry expiry.
///
/// Implementations own expiry: a value returned by `get` is always
/// unexpired, and callers never compare timestamps themselves. Values come
/// back as raw bytes; whether they are valid UTF-8 or JSON is the caller's
/// concern, not a store failure.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Returns the unexpired value under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Writes `value` under `key`, expiring `ttl_secs` after the write.
    ///
    /// `ttl_secs` must be at least 1. A zero TTL is rejected with
    /// `StoreError::InvalidTtl` by every backend and nothing is written.
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;
}
