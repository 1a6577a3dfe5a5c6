//! Cache Proxy - caches upstream API responses in a key-value store
//!
//! Serves `/currencies` and `/fact` from Redis (or the in-memory store),
//! falling back to the upstream API on a miss.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache_proxy::api::{create_router, AppState};
use cache_proxy::config::{Config, StoreBackend};
use cache_proxy::endpoints::default_endpoints;
use cache_proxy::spawn_cleanup_task;
use cache_proxy::store::{KeyValueStore, MemoryStore, RedisStore};
use cache_proxy::upstream::UpstreamClient;

/// Main entry point for the caching proxy.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the store (and start the sweep task for the memory backend)
/// 4. Build the shared upstream HTTP client
/// 5. Create Axum router with one route per endpoint
/// 6. Serve until SIGINT/SIGTERM, then release shared clients
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cache_proxy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Cache Proxy");

    let config = Config::from_env();
    info!(
        "Configuration loaded: store={:?}, redis={}:{}, port={}, upstream_timeout={:?}",
        config.store_backend,
        config.redis_host,
        config.redis_port,
        config.server_port,
        config.upstream_timeout
    );

    let (store, cleanup_handle) = init_store(&config).await?;
    info!("Store initialized: backend={}", store.backend());

    let upstream =
        UpstreamClient::new(config.upstream_timeout).context("failed to build upstream client")?;
    let state = AppState::new(store, upstream);

    let endpoints = default_endpoints();
    for endpoint in &endpoints {
        info!(
            "Serving GET {} -> {} (key={}, ttl={}s)",
            endpoint.path, endpoint.upstream_url, endpoint.cache_key, endpoint.ttl_secs
        );
    }
    let app = create_router(state, endpoints);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    // The router owns the state; it is dropped when serve returns, which
    // closes the store connection and the HTTP client.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Store connection and HTTP client released");
    info!("Server shutdown complete");
    Ok(())
}

/// Builds the configured store. Redis must answer a PING before the
/// server starts accepting requests.
async fn init_store(
    config: &Config,
) -> anyhow::Result<(Arc<dyn KeyValueStore>, Option<JoinHandle<()>>)> {
    match config.store_backend {
        StoreBackend::Redis => {
            let url = config.redis_url();
            let store = RedisStore::connect(&url)
                .await
                .with_context(|| format!("failed to connect to Redis at {}", url))?;
            store.ping().await.context("Redis did not answer PING")?;
            let store: Arc<dyn KeyValueStore> = Arc::new(store);
            Ok((store, None))
        }
        StoreBackend::Memory => {
            let memory = Arc::new(MemoryStore::new());
            let handle = spawn_cleanup_task(memory.clone(), config.cleanup_interval);
            info!("Background expiry sweep started");
            let store: Arc<dyn KeyValueStore> = memory;
            Ok((store, Some(handle)))
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the sweep task (if any) and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Expiry sweep task aborted");
    }
}
