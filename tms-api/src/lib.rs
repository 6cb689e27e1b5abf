//! TMS API - ISO20022 transaction ingestion over HTTP
//!
//! Receives quote requests, quote responses, credit transfers and status
//! reports, derives tenant-scoped pseudonym keys, persists history and the
//! relationship graph, and forwards each accepted transaction to the
//! downstream risk service.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod notifier;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;

// Re-export commonly used types
pub use config::{ApiConfig, CacheBackend, StoreBackend};
pub use db::{DbClient, DbConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use middleware::{tenant_middleware, Tenant, TENANT_HEADER};
pub use notifier::{
    spawn_notification, HttpNotifier, NoopNotifier, NotificationPayload, Notifier,
    RecordingNotifier,
};
pub use routes::create_api_router;
pub use state::{ApiEngine, AppState};
pub use telemetry::{init_tracing, TelemetryConfig};
