//! Endpoint Table
//!
//! Static pairing of route path, cache key, upstream URL and TTL.

/// One cached GET route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    /// Route path, e.g. `/currencies`
    pub path: String,
    /// Store key the payload is cached under
    pub cache_key: String,
    /// Upstream URL fetched on a miss
    pub upstream_url: String,
    /// Cache lifetime in seconds
    pub ttl_secs: u64,
}

impl EndpointConfig {
    /// `ttl_secs` below 1 is raised to 1; stores reject a zero TTL.
    pub fn new(
        path: impl Into<String>,
        cache_key: impl Into<String>,
        upstream_url: impl Into<String>,
        ttl_secs: u64,
    ) -> Self {
        Self {
            path: path.into(),
            cache_key: cache_key.into(),
            upstream_url: upstream_url.into(),
            ttl_secs: ttl_secs.max(1),
        }
    }
}

/// Coinbase currency list, cached for an hour
pub const CURRENCIES_URL: &str = "https://api.coinbase.com/v2/currencies";

/// Random cat fact, cached for a minute
pub const FACT_URL: &str = "https://catfact.ninja/fact";

/// The endpoints served by the binary.
pub fn default_endpoints() -> Vec<EndpointConfig> {
    vec![
        EndpointConfig::new("/currencies", "currencies", CURRENCIES_URL, 3600),
        EndpointConfig::new("/fact", "fact", FACT_URL, 60),
    ]
}
