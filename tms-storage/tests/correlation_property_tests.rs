//! Property and scenario tests for DataCache correlation
//!
//! **Property 1: Direct path isolation**
//!
//! A well-formed cached entry is returned without touching history.
//!
//! **Property 2: Rebuild equivalence**
//!
//! An entry rebuilt from history carries exactly the keys derived directly
//! from the credit transfer, and is written back so the next lookup is direct.

use std::sync::Arc;

use proptest::prelude::*;
use tms_core::{
    CorrelationConfig, CorrelationError, DataCache, HistoryRecord, KeyError, KeyMode, PaymentMessage,
    TenantId, TmsError, TmsResult,
};
use tms_storage::{
    CacheStore, CorrelationEngine, HistoryStore, InMemoryCacheStore, InMemoryHistoryStore,
    LmdbCacheError, LmdbCacheStore, ResolutionPath,
};
use tms_test_utils::fixtures::{self, END_TO_END_ID, TENANT};
use tms_test_utils::generators::{arb_pacs008, arb_tenant_id};

type Engine = CorrelationEngine<InMemoryCacheStore, InMemoryHistoryStore>;

fn engine() -> (Engine, Arc<InMemoryCacheStore>, Arc<InMemoryHistoryStore>) {
    engine_with(CorrelationConfig::default())
}

fn engine_with(config: CorrelationConfig) -> (Engine, Arc<InMemoryCacheStore>, Arc<InMemoryHistoryStore>) {
    let cache = Arc::new(InMemoryCacheStore::new());
    let history = Arc::new(InMemoryHistoryStore::new());
    let engine = CorrelationEngine::new(Arc::clone(&cache), Arc::clone(&history), config);
    (engine, cache, history)
}

async fn append_transfer(history: &InMemoryHistoryStore, tenant: &TenantId, end_to_end_id: &str) -> TmsResult<()> {
    let mut msg = fixtures::pacs008(end_to_end_id);
    msg.set_tenant_id(tenant);
    history.append(&HistoryRecord::from_message(tenant, &msg)?).await
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[tokio::test]
async fn test_cache_hit_skips_history() -> TmsResult<()> {
    let (engine, _cache, history) = engine();
    let tenant = TenantId::new(TENANT);
    let entry = DataCache::from_credit_transfer(TENANT, &fixtures::pacs008(END_TO_END_ID), KeyMode::Tenant)?;
    engine.store(&tenant, END_TO_END_ID, &entry).await?;

    let resolved = engine.resolve(&tenant, END_TO_END_ID).await?;

    assert_eq!(resolved.path(), ResolutionPath::Direct);
    assert_eq!(resolved.into_value(), entry);
    assert_eq!(history.query_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_miss_rebuilds_and_writes_back() -> TmsResult<()> {
    let (engine, cache, history) = engine();
    let tenant = TenantId::new(TENANT);
    append_transfer(&history, &tenant, END_TO_END_ID).await?;

    let first = engine.resolve(&tenant, END_TO_END_ID).await?;
    assert_eq!(first.path(), ResolutionPath::Rebuild);
    assert!(first.written_back());
    assert!(cache.contains("tenant999:701b-ae14-46fd-a2cf-88dda2875fdd"));

    let expected = fixtures::expected_keys(TENANT);
    let entry = first.value();
    assert_eq!(entry.dbtr_id, "tenant999+07-197368463MSISDN");
    assert_eq!(entry.cdtr_id, expected.creditor_entity);
    assert_eq!(entry.dbtr_acct_id, expected.debtor_account);
    assert_eq!(entry.cdtr_acct_id, expected.creditor_account);
    assert_eq!(entry.xchg_rate, Some(0.0698));

    let second = engine.resolve(&tenant, END_TO_END_ID).await?;
    assert_eq!(second.path(), ResolutionPath::Direct);
    assert_eq!(second.value(), first.value());
    assert_eq!(history.query_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_empty_history_is_not_found() {
    let (engine, cache, _history) = engine();
    let tenant = TenantId::new(TENANT);

    let err = engine
        .resolve(&tenant, "unknown-e2e")
        .await
        .expect_err("nothing to correlate with");

    assert!(err.is_not_found());
    assert_eq!(
        err,
        TmsError::Correlation(CorrelationError::NotFound {
            tenant_id: TENANT.to_string(),
            correlation_id: "unknown-e2e".to_string(),
        })
    );
    assert_eq!(cache.set_count(), 0);
}

#[tokio::test]
async fn test_history_is_tenant_scoped() -> TmsResult<()> {
    let (engine, _cache, history) = engine();
    append_transfer(&history, &TenantId::new("tenantA"), END_TO_END_ID).await?;

    let err = engine
        .resolve(&TenantId::new("tenantB"), END_TO_END_ID)
        .await
        .expect_err("other tenant's transfer is invisible");
    assert!(err.is_not_found());
    Ok(())
}

#[tokio::test]
async fn test_malformed_cache_payload_falls_back_to_rebuild() -> TmsResult<()> {
    let (engine, cache, history) = engine();
    let tenant = TenantId::new(TENANT);
    append_transfer(&history, &tenant, END_TO_END_ID).await?;
    cache.seed("tenant999:701b-ae14-46fd-a2cf-88dda2875fdd", b"{\"stale\":true}", 60)?;

    let resolved = engine.resolve(&tenant, END_TO_END_ID).await?;

    assert_eq!(resolved.path(), ResolutionPath::Rebuild);
    assert_eq!(history.query_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_write_back_failure_still_resolves() -> TmsResult<()> {
    let (engine, cache, history) = engine();
    let tenant = TenantId::new(TENANT);
    append_transfer(&history, &tenant, END_TO_END_ID).await?;
    cache.fail_sets(true);

    let resolved = engine.resolve(&tenant, END_TO_END_ID).await?;

    assert_eq!(resolved.path(), ResolutionPath::Rebuild);
    assert!(!resolved.written_back());
    assert_eq!(resolved.value().dbtr_id, "tenant999+07-197368463MSISDN");
    Ok(())
}

#[tokio::test]
async fn test_cache_outage_propagates() {
    let (engine, cache, history) = engine();
    cache.fail_gets(true);

    let err = engine
        .resolve(&TenantId::new(TENANT), END_TO_END_ID)
        .await
        .expect_err("connectivity failure is surfaced");
    assert!(matches!(err, TmsError::Storage(_)));
    assert_eq!(history.query_count(), 0);
}

#[tokio::test]
async fn test_unparsable_history_records_are_skipped() -> TmsResult<()> {
    let (engine, _cache, history) = engine();
    let tenant = TenantId::new(TENANT);
    append_transfer(&history, &tenant, END_TO_END_ID).await?;

    let mut broken = HistoryRecord::from_message(&tenant, &fixtures::pacs008(END_TO_END_ID))?;
    broken.document = serde_json::json!({"FIToFICstmrCdtTrf": "truncated"});
    history.append(&broken).await?;

    let resolved = engine.resolve(&tenant, END_TO_END_ID).await?;
    assert_eq!(resolved.value().dbtr_id, "tenant999+07-197368463MSISDN");
    Ok(())
}

#[tokio::test]
async fn test_only_unparsable_history_is_not_found() -> TmsResult<()> {
    let (engine, _cache, history) = engine();
    let tenant = TenantId::new(TENANT);
    let mut broken = HistoryRecord::from_message(&tenant, &fixtures::pacs008(END_TO_END_ID))?;
    broken.document = serde_json::json!({});
    history.append(&broken).await?;

    let err = engine
        .resolve(&tenant, END_TO_END_ID)
        .await
        .expect_err("no usable record");
    assert!(err.is_not_found());
    Ok(())
}

#[tokio::test]
async fn test_rebuild_honours_legacy_key_mode() -> TmsResult<()> {
    let config = CorrelationConfig {
        key_mode: KeyMode::Legacy,
        ..Default::default()
    };
    let (engine, _cache, history) = engine_with(config);
    let tenant = TenantId::new(TENANT);
    append_transfer(&history, &tenant, END_TO_END_ID).await?;

    let rebuilt = engine.resolve(&tenant, END_TO_END_ID).await?.into_value();
    let direct =
        DataCache::from_credit_transfer(TENANT, &fixtures::pacs008(END_TO_END_ID), KeyMode::Legacy)?;
    assert_eq!(rebuilt, direct);
    assert_eq!(
        rebuilt.dbtr_acct_id,
        tms_core::hash_debtor_account("fsp001", "1010101010", "Mxx")
    );
    Ok(())
}

#[tokio::test]
async fn test_store_uses_configured_ttl() -> TmsResult<()> {
    let (engine, cache, _history) = engine();
    let tenant = TenantId::default_tenant();
    let entry = DataCache::from_credit_transfer("DEFAULT", &fixtures::pacs008("e2e-ttl"), KeyMode::Tenant)?;

    engine.store(&tenant, "e2e-ttl", &entry).await?;

    assert!(cache.get("DEFAULT:e2e-ttl").await?.is_some());
    assert_eq!(cache.set_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_tenant_with_separator_cannot_shadow_another_tenant() -> TmsResult<()> {
    let (engine, cache, history) = engine();
    let entry = DataCache::from_credit_transfer("acme:eu", &fixtures::pacs008("e2e-1"), KeyMode::Tenant)?;

    let stored = engine.store(&TenantId::new("acme:eu"), "e2e-1", &entry).await;
    assert!(matches!(stored, Err(TmsError::Key(KeyError::InvalidTenant { .. }))));
    assert_eq!(cache.set_count(), 0);

    let resolved = engine.resolve(&TenantId::new("acme"), "eu:e2e-1").await;
    assert!(matches!(resolved, Err(ref e) if e.is_not_found()));
    assert_eq!(cache.hit_count(), 0);
    assert_eq!(history.query_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_oversized_correlation_id_rebuilds_through_lmdb() -> TmsResult<()> {
    let dir = tempfile::TempDir::new().map_err(|e| TmsError::from(LmdbCacheError::Io(e)))?;
    let cache = Arc::new(LmdbCacheStore::new(dir.path(), 10)?);
    let history = Arc::new(InMemoryHistoryStore::new());
    let engine = CorrelationEngine::new(Arc::clone(&cache), Arc::clone(&history), CorrelationConfig::default());
    let tenant = TenantId::new(TENANT);
    let e2e = "e".repeat(600);
    append_transfer(&history, &tenant, &e2e).await?;

    let first = engine.resolve(&tenant, &e2e).await?;
    let second = engine.resolve(&tenant, &e2e).await?;

    assert_eq!(first.path(), ResolutionPath::Rebuild);
    assert_eq!(second.path(), ResolutionPath::Rebuild);
    assert_eq!(second.value().dbtr_id, "tenant999+07-197368463MSISDN");
    assert_eq!(history.query_count(), 2);
    Ok(())
}

// ============================================================================
// PROPERTIES
// ============================================================================

fn runtime() -> Result<tokio::runtime::Runtime, TestCaseError> {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(|e| TestCaseError::fail(format!("Failed to create runtime: {}", e)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_rebuild_equals_direct_derivation(tenant in arb_tenant_id(), msg in arb_pacs008()) {
        let rt = runtime()?;
        let (engine, _cache, history) = engine();
        let e2e = msg.end_to_end_id().to_string();

        let rebuilt = rt.block_on(async {
            history.append(&HistoryRecord::from_message(&tenant, &msg)?).await?;
            engine.resolve(&tenant, &e2e).await
        }).map_err(|e| TestCaseError::fail(e.to_string()))?;

        let direct = DataCache::from_credit_transfer(tenant.as_str(), &msg, KeyMode::Tenant)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(rebuilt.path(), ResolutionPath::Rebuild);
        prop_assert_eq!(rebuilt.into_value(), direct);
    }

    #[test]
    fn prop_direct_hit_never_queries_history(tenant in arb_tenant_id(), msg in arb_pacs008()) {
        let rt = runtime()?;
        let (engine, _cache, history) = engine();
        let e2e = msg.end_to_end_id().to_string();
        let entry = DataCache::from_credit_transfer(tenant.as_str(), &msg, KeyMode::Tenant)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        let resolved = rt.block_on(async {
            engine.store(&tenant, &e2e, &entry).await?;
            engine.resolve(&tenant, &e2e).await
        }).map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert!(resolved.was_cache_hit());
        prop_assert_eq!(history.query_count(), 0);
    }
}
