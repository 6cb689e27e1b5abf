//! Property tests for tenant isolation through the HTTP surface
//!
//! **Property: tenant namespacing**
//!
//! For any tenant supplied in `x-tenant-id`, every relationship persisted for
//! a credit transfer and its status report carries that tenant, and both
//! endpoints are account keys prefixed with it.

use std::sync::Arc;

use axum::{body::Body, http::Request, http::StatusCode, Router};
use proptest::prelude::*;
use tms_api::{create_api_router, AppState, NoopNotifier, TENANT_HEADER};
use tms_core::{CorrelationConfig, PaymentMessage};
use tms_storage::{InMemoryCacheStore, InMemoryGraphStore, InMemoryHistoryStore};
use tms_test_utils::generators::{arb_pacs008, arb_tenant_id};
use tower::ServiceExt;

fn runtime() -> Result<tokio::runtime::Runtime, TestCaseError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| TestCaseError::fail(format!("Failed to create runtime: {}", e)))
}

async fn post(app: &Router, uri: &str, tenant: &str, body: String) -> Result<StatusCode, String> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header(TENANT_HEADER, tenant)
        .body(Body::from(body))
        .map_err(|e| e.to_string())?;
    let response = app
        .clone()
        .oneshot(request)
        .await
        .map_err(|e| format!("Request failed: {:?}", e))?;
    Ok(response.status())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_relationships_carry_request_tenant(tenant in arb_tenant_id(), msg in arb_pacs008()) {
        let rt = runtime()?;
        let graph = Arc::new(InMemoryGraphStore::new());
        let app = create_api_router(AppState::new(
            Arc::new(InMemoryCacheStore::new()),
            Arc::new(InMemoryHistoryStore::new()),
            graph.clone(),
            Arc::new(NoopNotifier),
            CorrelationConfig::default(),
        ));

        let e2e = msg.end_to_end_id().to_string();
        let transfer = serde_json::to_string(&msg).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let report = tms_test_utils::fixtures::pacs002_json(&e2e, "ACCC").to_string();

        let statuses = rt.block_on(async {
            let first = post(&app, "/v1/evaluate/iso20022/pacs.008.001.10", tenant.as_str(), transfer).await?;
            let second = post(&app, "/v1/evaluate/iso20022/pacs.002.001.12", tenant.as_str(), report).await?;
            Ok::<_, String>((first, second))
        }).map_err(TestCaseError::fail)?;

        prop_assert_eq!(statuses, (StatusCode::OK, StatusCode::OK));

        let relationships = graph.relationships();
        prop_assert_eq!(relationships.len(), 2);
        let prefix = format!("accounts/{}", tenant);
        for relationship in &relationships {
            prop_assert_eq!(relationship.tenant_id.as_str(), tenant.as_str());
            prop_assert!(relationship.from.starts_with(&prefix));
            prop_assert!(relationship.to.starts_with(&prefix));
        }
        prop_assert_eq!(&relationships[1].from, &relationships[0].to);
        prop_assert_eq!(&relationships[1].to, &relationships[0].from);
    }
}
