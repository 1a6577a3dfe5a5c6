//! Cache-Aside Fetcher
//!
//! Serves a JSON payload from the store when present, otherwise fetches it
//! upstream and writes it back with a TTL.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::cache::{CacheStats, FetcherStats};
use crate::error::{ProxyError, Result};
use crate::store::KeyValueStore;

// == Cache-Aside Fetcher ==
/// Read-through cache over a [`KeyValueStore`].
///
/// Concurrent misses on the same key are not coalesced: each one calls
/// upstream and writes the key, last write wins.
pub struct CacheAsideFetcher {
    store: Arc<dyn KeyValueStore>,
    stats: FetcherStats,
}

impl CacheAsideFetcher {
    /// Creates a fetcher over the shared store.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            stats: FetcherStats::new(),
        }
    }

    /// The store this fetcher reads and fills.
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Snapshot of hit/miss counters.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    // == Get ==
    /// Returns the payload cached under `key`, or the result of
    /// `fetch_upstream` after storing it for `ttl_secs`.
    ///
    /// # Errors
    /// - `StoreUnavailable` if the store cannot be read
    /// - `CacheCorruption` if the cached string is not JSON (the entry is left in place)
    /// - whatever `fetch_upstream` fails with; nothing is written in that case
    ///
    /// A failed write-back is logged and counted, never returned.
    pub async fn get<F, Fut>(&self, key: &str, ttl_secs: u64, fetch_upstream: F) -> Result<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        if let Some(raw) = self.store.get(key).await? {
            self.stats.record_hit();
            debug!(key, "cache hit");
            // Invalid UTF-8 is rejected here too, as corruption
            return serde_json::from_slice(&raw).map_err(|source| {
                error!(key, error = %source, "cached value is not valid JSON");
                ProxyError::CacheCorruption {
                    key: key.to_string(),
                    source,
                }
            });
        }

        self.stats.record_miss();
        debug!(key, "cache miss, fetching upstream");

        let data = fetch_upstream().await.map_err(|e| {
            self.stats.record_upstream_error();
            error!(key, error = %e, "upstream fetch failed");
            e
        })?;

        // Serializing a Value cannot fail (string keys only)
        let serialized = data.to_string();
        if let Err(e) = self.store.set_ex(key, &serialized, ttl_secs).await {
            self.stats.record_write_failure();
            warn!(key, error = %e, "cache write-back failed, serving fetched data");
        }

        Ok(data)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Reads succeed (always a miss), writes always fail.
    struct ReadOnlyStore;

    #[async_trait]
    impl KeyValueStore for ReadOnlyStore {
        async fn get(&self, _key: &str) -> std::result::Result<Option<Vec<u8>>, StoreError> {
            Ok(None)
        }

        async fn set_ex(
            &self,
            _key: &str,
            _value: &str,
            _ttl_secs: u64,
        ) -> std::result::Result<(), StoreError> {
            Err(StoreError::Unavailable("read-only".to_string()))
        }

        async fn ping(&self) -> std::result::Result<(), StoreError> {
            Ok(())
        }

        fn backend(&self) -> &'static str {
            "read-only"
        }
    }

    /// Every operation fails.
    struct DownStore;

    #[async_trait]
    impl KeyValueStore for DownStore {
        async fn get(&self, _key: &str) -> std::result::Result<Option<Vec<u8>>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }

        async fn set_ex(
            &self,
            _key: &str,
            _value: &str,
            _ttl_secs: u64,
        ) -> std::result::Result<(), StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }

        async fn ping(&self) -> std::result::Result<(), StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }

        fn backend(&self) -> &'static str {
            "down"
        }
    }

    fn memory_fetcher() -> (Arc<MemoryStore>, CacheAsideFetcher) {
        let store = Arc::new(MemoryStore::new());
        let fetcher = CacheAsideFetcher::new(store.clone());
        (store, fetcher)
    }

    #[tokio::test]
    async fn test_miss_fetches_and_fills_store() {
        let (store, fetcher) = memory_fetcher();
        let calls = AtomicUsize::new(0);

        let value = fetcher
            .get("currencies", 3600, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(json!({"data": [{"id": "USD"}]}))
            })
            .await
            .unwrap();

        assert_eq!(value, json!({"data": [{"id": "USD"}]}));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            store.get("currencies").await.unwrap().as_deref(),
            Some(br#"{"data":[{"id":"USD"}]}"#.as_slice())
        );
        let ttl = store.ttl("currencies").await.unwrap();
        assert!(ttl > 3590 && ttl <= 3600);
    }

    #[tokio::test]
    async fn test_hit_skips_upstream() {
        let (store, fetcher) = memory_fetcher();
        store
            .set_ex("fact", r#"{"fact":"Cats sleep 70% of their lives."}"#, 60)
            .await
            .unwrap();

        let value = fetcher
            .get("fact", 60, || async {
                Err(ProxyError::Internal("upstream called on a hit".to_string()))
            })
            .await
            .unwrap();

        assert_eq!(value, json!({"fact": "Cats sleep 70% of their lives."}));
        assert_eq!(fetcher.stats().hits, 1);
        assert_eq!(fetcher.stats().misses, 0);
    }

    #[tokio::test]
    async fn test_second_get_within_ttl_is_hit() {
        let (_store, fetcher) = memory_fetcher();
        let calls = AtomicUsize::new(0);
        let fetch = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({"n": 1}))
        };

        let first = fetcher.get("k", 60, fetch).await.unwrap();
        let second = fetcher.get("k", 60, fetch).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_fresh_miss() {
        let (_store, fetcher) = memory_fetcher();
        let calls = AtomicUsize::new(0);
        let fetch = || async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({ "n": n }))
        };

        assert_eq!(fetcher.get("k", 1, fetch).await.unwrap(), json!({"n": 0}));
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(fetcher.get("k", 1, fetch).await.unwrap(), json!({"n": 1}));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_write_failure_still_returns_data() {
        let fetcher = CacheAsideFetcher::new(Arc::new(ReadOnlyStore));

        let value = fetcher
            .get("fact", 60, || async { Ok(json!({"fact": "x"})) })
            .await
            .unwrap();

        assert_eq!(value, json!({"fact": "x"}));
        assert_eq!(fetcher.stats().write_failures, 1);
    }

    #[tokio::test]
    async fn test_upstream_failure_propagates_and_writes_nothing() {
        let (store, fetcher) = memory_fetcher();

        let result = fetcher
            .get("fact", 60, || async {
                Err(ProxyError::UpstreamUnavailable {
                    url: "https://catfact.ninja/fact".to_string(),
                    reason: "502 Bad Gateway".to_string(),
                })
            })
            .await;

        assert!(matches!(result, Err(ProxyError::UpstreamUnavailable { .. })));
        assert!(store.is_empty().await);
        assert_eq!(fetcher.stats().upstream_errors, 1);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_error_not_miss() {
        let (store, fetcher) = memory_fetcher();
        store.set_ex("fact", "not json {", 60).await.unwrap();

        let result = fetcher
            .get("fact", 60, || async {
                Err(ProxyError::Internal("upstream called on corruption".to_string()))
            })
            .await;

        assert!(matches!(result, Err(ProxyError::CacheCorruption { .. })));
        // Left in place
        assert_eq!(store.get("fact").await.unwrap().as_deref(), Some(b"not json {".as_slice()));
    }

    /// Holds one fixed raw value under every key.
    struct RawBytesStore(Vec<u8>);

    #[async_trait]
    impl KeyValueStore for RawBytesStore {
        async fn get(&self, _key: &str) -> std::result::Result<Option<Vec<u8>>, StoreError> {
            Ok(Some(self.0.clone()))
        }

        async fn set_ex(
            &self,
            _key: &str,
            _value: &str,
            _ttl_secs: u64,
        ) -> std::result::Result<(), StoreError> {
            Ok(())
        }

        async fn ping(&self) -> std::result::Result<(), StoreError> {
            Ok(())
        }

        fn backend(&self) -> &'static str {
            "raw"
        }
    }

    #[tokio::test]
    async fn test_invalid_utf8_entry_is_corruption() {
        let fetcher = CacheAsideFetcher::new(Arc::new(RawBytesStore(vec![0xff, 0xfe, b'{'])));

        let err = fetcher
            .get("currencies", 60, || async {
                Err(ProxyError::Internal("upstream called on corruption".to_string()))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ProxyError::CacheCorruption { .. }));
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_store_read_failure_is_fatal() {
        let fetcher = CacheAsideFetcher::new(Arc::new(DownStore));

        let result = fetcher
            .get("fact", 60, || async { Ok(json!({})) })
            .await;

        assert!(matches!(result, Err(ProxyError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_concurrent_misses_are_not_coalesced() {
        let (_store, fetcher) = memory_fetcher();
        let fetcher = Arc::new(fetcher);
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(tokio::sync::Barrier::new(2));

        let mut handles = Vec::new();
        for _ in 0..2 {
            let fetcher = fetcher.clone();
            let calls = calls.clone();
            let barrier = barrier.clone();
            handles.push(tokio::spawn(async move {
                fetcher
                    .get("k", 60, || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        // Both requests are past the lookup before either writes
                        barrier.wait().await;
                        Ok(json!({"v": true}))
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), json!({"v": true}));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
