//! Error types for the caching proxy
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Store Error Enum ==
/// Failures raised by a key-value store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Redis command or connection failure
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Backend-specific failure with no richer type
    #[error("{0}")]
    Unavailable(String),

    /// Write attempted with a zero TTL
    #[error("TTL must be at least 1 second for key '{0}'")]
    InvalidTtl(String),
}

// == Proxy Error Enum ==
/// Unified error type for request handling.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Cached value under the key is not parseable JSON
    #[error("Cached value for '{key}' is not valid JSON: {source}")]
    CacheCorruption {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Upstream unreachable, non-2xx, or returned a non-JSON body
    #[error("Upstream {url} unavailable: {reason}")]
    UpstreamUnavailable { url: String, reason: String },

    /// Store could not be read while resolving a request
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    /// HTTP status this error is surfaced with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::CacheCorruption { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
            ProxyError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the proxy.
pub type Result<T> = std::result::Result<T, ProxyError>;
