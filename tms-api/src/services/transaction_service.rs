//! Transaction Service
//!
//! Ingestion sequencing for the four ISO20022 message kinds. Each function
//! stamps the tenant onto the message, persists it, writes the party graph
//! and relationship edge, and hands the message to the notifier once
//! persistence has succeeded.

use std::sync::Arc;
use std::time::Instant;

use futures_util::future::try_join_all;
use tms_core::{
    DataCache, HistoryRecord, Pacs002, Pacs008, Pain001, Pain013, PartyBearing, PartyGraph,
    PartyKeys, PaymentMessage, TenantId, TransactionRelationship,
};
use tms_storage::{GraphStore, ResolutionPath};

use crate::error::ApiResult;
use crate::notifier::{spawn_notification, NotificationPayload};
use crate::state::AppState;

/// Process a quote request (pain.001).
pub async fn process_quote_request(
    state: &AppState,
    tenant_id: &TenantId,
    msg: Pain001,
) -> ApiResult<Pain001> {
    ingest_direct(state, tenant_id, msg, TransactionRelationship::for_quote_request).await
}

/// Process a quote response (pain.013).
pub async fn process_quote_response(
    state: &AppState,
    tenant_id: &TenantId,
    msg: Pain013,
) -> ApiResult<Pain013> {
    ingest_direct(state, tenant_id, msg, TransactionRelationship::for_quote_response).await
}

/// Process a credit transfer (pacs.008).
///
/// The DataCache entry is written once the history append has succeeded, so
/// a cached entry always has a durable transfer behind it. A cache write
/// failure fails the request.
pub async fn process_credit_transfer(
    state: &AppState,
    tenant_id: &TenantId,
    mut msg: Pacs008,
) -> ApiResult<Pacs008> {
    let start = Instant::now();
    msg.set_tenant_id(tenant_id);

    let keys = derive_keys(state, tenant_id, &msg)?;
    let data_cache = DataCache::assemble(keys.clone(), &msg);
    let record = HistoryRecord::from_message(tenant_id, &msg)?;

    state.history.append(&record).await?;
    state
        .engine
        .store(tenant_id, msg.end_to_end_id(), &data_cache)
        .await?;

    save_party_graph(state.graph.as_ref(), &PartyGraph::new(tenant_id, &keys, msg.cre_dt_tm())).await?;

    let relationship = TransactionRelationship::for_credit_transfer(tenant_id, &msg, &keys);
    save_relationship(state, &relationship).await?;

    tracing::info!(
        tenant_id = %tenant_id,
        end_to_end_id = msg.end_to_end_id(),
        "Credit transfer ingested"
    );
    notify(state, &msg, Some(data_cache), start)?;
    Ok(msg)
}

/// Process a status report (pacs.002).
///
/// The report carries no party identifiers; both relationship endpoints
/// come from the DataCache resolved for its original end-to-end id. Fails
/// with a correlation error when no originating credit transfer is known.
pub async fn process_status_report(
    state: &AppState,
    tenant_id: &TenantId,
    mut msg: Pacs002,
) -> ApiResult<Pacs002> {
    let start = Instant::now();
    msg.set_tenant_id(tenant_id);

    let resolved = state.engine.resolve(tenant_id, msg.end_to_end_id()).await?;
    if resolved.path() == ResolutionPath::Rebuild {
        tracing::info!(
            tenant_id = %tenant_id,
            end_to_end_id = msg.end_to_end_id(),
            written_back = resolved.written_back(),
            "DataCache rebuilt for status report"
        );
    }
    let data_cache = resolved.into_value();

    state
        .history
        .append(&HistoryRecord::from_message(tenant_id, &msg)?)
        .await?;

    let relationship = TransactionRelationship::for_status_report(tenant_id, &msg, &data_cache);
    save_relationship(state, &relationship).await?;

    tracing::info!(
        tenant_id = %tenant_id,
        end_to_end_id = msg.end_to_end_id(),
        tx_sts = msg.tx_sts(),
        "Status report ingested"
    );
    notify(state, &msg, Some(data_cache), start)?;
    Ok(msg)
}

// ============================================================================
// HELPERS
// ============================================================================

async fn ingest_direct<M, F>(
    state: &AppState,
    tenant_id: &TenantId,
    mut msg: M,
    build: F,
) -> ApiResult<M>
where
    M: PartyBearing,
    F: FnOnce(&TenantId, &M, &PartyKeys) -> TransactionRelationship + Send,
{
    let start = Instant::now();
    msg.set_tenant_id(tenant_id);

    let keys = derive_keys(state, tenant_id, &msg)?;
    state
        .history
        .append(&HistoryRecord::from_message(tenant_id, &msg)?)
        .await?;

    save_party_graph(state.graph.as_ref(), &PartyGraph::new(tenant_id, &keys, msg.cre_dt_tm())).await?;

    let relationship = build(tenant_id, &msg, &keys);
    save_relationship(state, &relationship).await?;

    tracing::info!(
        tenant_id = %tenant_id,
        tx_tp = M::KIND.tx_tp(),
        end_to_end_id = msg.end_to_end_id(),
        "Transaction ingested"
    );
    notify(state, &msg, None, start)?;
    Ok(msg)
}

fn derive_keys<M: PartyBearing>(
    state: &AppState,
    tenant_id: &TenantId,
    msg: &M,
) -> ApiResult<PartyKeys> {
    Ok(PartyKeys::derive(
        tenant_id.as_str(),
        &msg.parties()?,
        state.config().key_mode,
    ))
}

/// Entity, account and holder writes are independent; run them together.
async fn save_party_graph(graph: &dyn GraphStore, party_graph: &PartyGraph) -> ApiResult<()> {
    let writes = party_graph
        .entities
        .iter()
        .map(|entity| graph.save_entity(entity))
        .chain(party_graph.accounts.iter().map(|account| graph.save_account(account)))
        .chain(party_graph.holders.iter().map(|holder| graph.save_account_holder(holder)));

    try_join_all(writes).await?;
    Ok(())
}

async fn save_relationship(state: &AppState, relationship: &TransactionRelationship) -> ApiResult<()> {
    relationship.validate()?;
    state.graph.save_relationship(relationship).await?;
    Ok(())
}

fn notify<M: PaymentMessage>(
    state: &AppState,
    msg: &M,
    data_cache: Option<DataCache>,
    start: Instant,
) -> ApiResult<()> {
    let payload = NotificationPayload::new(serde_json::to_value(msg)?, data_cache, start.elapsed());
    spawn_notification(Arc::clone(&state.notifier), payload);
    Ok(())
}
