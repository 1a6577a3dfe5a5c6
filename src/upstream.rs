//! Upstream HTTP client
//!
//! One shared `reqwest::Client` used for every outbound fetch.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::error::{ProxyError, Result};

/// User-Agent sent on every upstream request
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Client for fetching JSON payloads from upstream APIs
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
}

impl UpstreamClient {
    /// Builds the client, with an optional per-request timeout in seconds.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ProxyError::Internal(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// GETs `url` and parses the body as JSON.
    ///
    /// # Returns
    /// * `Ok(Value)` - The parsed response body
    /// * `Err(ProxyError::UpstreamUnavailable)` - Connect failure, non-2xx
    ///   status, or a body that is not JSON
    pub async fn fetch_json(&self, url: &str) -> Result<Value> {
        let unavailable = |e: reqwest::Error| ProxyError::UpstreamUnavailable {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?;

        response.json::<Value>().await.map_err(unavailable)
    }
}
