//! ISO20022 evaluation routes
//!
//! One POST endpoint per message kind. Bodies are decoded into the typed
//! message model here; a body that does not match the model is a 400 with a
//! structured error.

use axum::{extract::State, routing::post, Json, Router};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tms_core::{MessageKind, Pacs002, Pacs008, Pain001, Pain013};

use crate::error::ApiResult;
use crate::middleware::Tenant;
use crate::services;
use crate::state::AppState;

/// Body returned for every accepted transaction.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionResponse<T> {
    pub message: &'static str,
    pub data: T,
}

impl<T> TransactionResponse<T> {
    fn valid(data: T) -> Json<Self> {
        Json(Self {
            message: "Transaction is valid",
            data,
        })
    }
}

fn decode<T: DeserializeOwned>(body: Value) -> ApiResult<T> {
    Ok(serde_json::from_value(body)?)
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /v1/evaluate/iso20022/pain.001.001.11
pub async fn quote_request(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Json(body): Json<Value>,
) -> ApiResult<Json<TransactionResponse<Pain001>>> {
    let msg = services::process_quote_request(&state, &tenant_id, decode(body)?).await?;
    Ok(TransactionResponse::valid(msg))
}

/// POST /v1/evaluate/iso20022/pain.013.001.09
pub async fn quote_response(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Json(body): Json<Value>,
) -> ApiResult<Json<TransactionResponse<Pain013>>> {
    let msg = services::process_quote_response(&state, &tenant_id, decode(body)?).await?;
    Ok(TransactionResponse::valid(msg))
}

/// POST /v1/evaluate/iso20022/pacs.008.001.10
pub async fn credit_transfer(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Json(body): Json<Value>,
) -> ApiResult<Json<TransactionResponse<Pacs008>>> {
    let msg = services::process_credit_transfer(&state, &tenant_id, decode(body)?).await?;
    Ok(TransactionResponse::valid(msg))
}

/// POST /v1/evaluate/iso20022/pacs.002.001.12
pub async fn status_report(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Json(body): Json<Value>,
) -> ApiResult<Json<TransactionResponse<Pacs002>>> {
    let msg = services::process_status_report(&state, &tenant_id, decode(body)?).await?;
    Ok(TransactionResponse::valid(msg))
}

// ============================================================================
// ROUTER
// ============================================================================

/// Routes relative to `/v1/evaluate/iso20022`.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(&path(MessageKind::Pain001), post(quote_request))
        .route(&path(MessageKind::Pain013), post(quote_response))
        .route(&path(MessageKind::Pacs008), post(credit_transfer))
        .route(&path(MessageKind::Pacs002), post(status_report))
        .with_state(state)
}

fn path(kind: MessageKind) -> String {
    format!("/{}", kind.tx_tp())
}
