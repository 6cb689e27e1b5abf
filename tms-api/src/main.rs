//! TMS API server
//!
//! Composition root: reads configuration, constructs the configured stores
//! and notifier, and serves the router until interrupted.

use std::sync::Arc;

use axum::Router;
use tms_api::{
    create_api_router, init_tracing, ApiConfig, ApiError, ApiResult, AppState, CacheBackend,
    DbClient, DbConfig, HttpNotifier, NoopNotifier, Notifier, StoreBackend, TelemetryConfig,
};
use tms_storage::{
    CacheStore, GraphStore, HistoryStore, InMemoryCacheStore, InMemoryGraphStore,
    InMemoryHistoryStore, LmdbCacheStore,
};

#[tokio::main]
async fn main() -> ApiResult<()> {
    init_tracing(&TelemetryConfig::default())?;

    let api_config = ApiConfig::from_env()?;
    let state = build_state(&api_config).await?;
    let app: Router = create_api_router(state);

    let addr = api_config.bind_addr()?;
    tracing::info!(%addr, "Starting TMS API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

async fn build_state(config: &ApiConfig) -> ApiResult<AppState> {
    let cache: Arc<dyn CacheStore> = match config.cache_backend {
        CacheBackend::Memory => Arc::new(InMemoryCacheStore::new()),
        CacheBackend::Lmdb => {
            let store = LmdbCacheStore::new(&config.lmdb_path, config.lmdb_max_size_mb)
                .map_err(|e| ApiError::internal_error(format!("Failed to open LMDB cache: {}", e)))?;
            tracing::info!(path = %config.lmdb_path.display(), "LMDB cache opened");
            Arc::new(store)
        }
    };

    let (history, graph): (Arc<dyn HistoryStore>, Arc<dyn GraphStore>) = match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory history and graph stores; data is lost on restart");
            (
                Arc::new(InMemoryHistoryStore::new()),
                Arc::new(InMemoryGraphStore::new()),
            )
        }
        StoreBackend::Postgres => {
            let db = DbClient::from_config(&DbConfig::from_env())?;
            db.ensure_schema().await?;
            (Arc::new(db.clone()), Arc::new(db))
        }
    };

    let notifier: Arc<dyn Notifier> = match &config.risk_endpoint {
        Some(endpoint) => {
            tracing::info!(endpoint = %endpoint, "Risk service notifications enabled");
            Arc::new(HttpNotifier::new(endpoint.clone(), config.notify_timeout)?)
        }
        None => {
            tracing::warn!("TMS_RISK_ENDPOINT not set; notifications are dropped");
            Arc::new(NoopNotifier)
        }
    };

    tracing::info!(
        cache_ttl_secs = config.correlation.cache_ttl_secs,
        key_mode = ?config.correlation.key_mode,
        "Correlation configured"
    );

    Ok(AppState::new(
        cache,
        history,
        graph,
        notifier,
        config.correlation.clone(),
    ))
}
