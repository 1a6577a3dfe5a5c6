//! API Routes
//!
//! Configures the Axum router: one cached route per endpoint plus the
//! auxiliary endpoints.

use std::sync::Arc;

use axum::{extract::State, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{cached_endpoint_handler, health_handler, stats_handler, AppState};
use crate::endpoints::EndpointConfig;

/// Creates the main router.
///
/// # Endpoints
/// - `GET <endpoint.path>` - Cached upstream payload, one per endpoint
/// - `GET /stats` - Fetcher statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState, endpoints: Vec<EndpointConfig>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router: Router<AppState> = Router::new();
    for endpoint in endpoints {
        let path = endpoint.path.clone();
        let endpoint = Arc::new(endpoint);
        router = router.route(
            &path,
            get(move |state: State<AppState>| cached_endpoint_handler(state, endpoint.clone())),
        );
    }

    router
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
