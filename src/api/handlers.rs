//! API Handlers
//!
//! HTTP request handlers for cached endpoints and the auxiliary routes.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde_json::Value;
use tracing::warn;

use crate::cache::CacheAsideFetcher;
use crate::endpoints::EndpointConfig;
use crate::error::Result;
use crate::models::{HealthResponse, StatsResponse};
use crate::store::KeyValueStore;
use crate::upstream::UpstreamClient;

/// Application state shared across all handlers.
///
/// Holds the process-wide store connection (inside the fetcher) and the
/// outbound HTTP client. Both are created once at startup.
#[derive(Clone)]
pub struct AppState {
    /// Cache-aside fetcher over the shared store
    pub fetcher: Arc<CacheAsideFetcher>,
    /// Shared upstream client
    pub upstream: UpstreamClient,
}

impl AppState {
    /// Creates a new AppState over the given store and client.
    pub fn new(store: Arc<dyn KeyValueStore>, upstream: UpstreamClient) -> Self {
        Self {
            fetcher: Arc::new(CacheAsideFetcher::new(store)),
            upstream,
        }
    }
}

/// Handler behind every cached `GET` route.
///
/// Returns the payload stored under the endpoint's key, or fetches it
/// from the endpoint's upstream URL and caches it for the endpoint's TTL.
pub async fn cached_endpoint_handler(
    State(state): State<AppState>,
    endpoint: Arc<EndpointConfig>,
) -> Result<Json<Value>> {
    let upstream = &state.upstream;
    let data = state
        .fetcher
        .get(&endpoint.cache_key, endpoint.ttl_secs, || {
            upstream.fetch_json(&endpoint.upstream_url)
        })
        .await?;

    Ok(Json(data))
}

/// Handler for GET /stats
///
/// Returns fetcher hit/miss counters.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.fetcher.stats()))
}

/// Handler for GET /health
///
/// Pings the store; 503 with a `degraded` body when it does not answer.
pub async fn health_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let store = state.fetcher.store();
    match store.ping().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse::healthy(store.backend()))),
        Err(e) => {
            warn!(error = %e, "health check: store ping failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse::degraded(store.backend())),
            )
        }
    }
}
