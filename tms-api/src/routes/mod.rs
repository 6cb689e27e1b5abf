//! REST API Routes Module
//!
//! Includes:
//! - ISO20022 evaluation routes, one per message kind
//! - Health check endpoints (Kubernetes-compatible)

pub mod health;
pub mod transaction;

use axum::{body::Body, http::Request, middleware::from_fn, Router};
use tower_http::trace::TraceLayer;

use crate::middleware::tenant_middleware;
use crate::state::AppState;

pub use health::create_router as health_router;
pub use transaction::create_router as transaction_router;

/// Create the full API router.
///
/// Evaluation routes run behind the tenant middleware; health routes do not
/// need tenant context.
pub fn create_api_router(state: AppState) -> Router {
    let evaluate = transaction::create_router(state.clone()).layer(from_fn(tenant_middleware));

    Router::new()
        .nest("/v1/evaluate/iso20022", evaluate)
        .nest("/health", health::create_router(state))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    tenant_id = tracing::field::Empty,
                )
            }),
        )
}
