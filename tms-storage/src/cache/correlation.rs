//! Correlation and rebuild engine.
//!
//! Resolves the DataCache entry for a status report. The cache is tried
//! first (direct path); on a miss the entry is rebuilt from the credit
//! transfer in transaction history and written back so the next lookup hits.
//!
//! History is authoritative. A cold or evicted cache makes resolution slower,
//! never wrong.

use std::sync::Arc;

use serde_json::Value;
use tms_core::{
    flatten_documents, CorrelationConfig, CorrelationError, DataCache, MessageKind, Pacs008,
    TenantId, TmsResult,
};

use super::resolution::Resolved;
use super::tenant_key::TenantCacheKey;
use crate::traits::{CacheStore, HistoryStore};

/// DataCache resolver over a cache store and a history store.
///
/// # Type Parameters
///
/// - `C`: cache store holding serialized DataCache entries
/// - `H`: history store holding the original credit transfers
pub struct CorrelationEngine<C, H>
where
    C: CacheStore + ?Sized,
    H: HistoryStore + ?Sized,
{
    cache: Arc<C>,
    history: Arc<H>,
    config: CorrelationConfig,
}

impl<C, H> Clone for CorrelationEngine<C, H>
where
    C: CacheStore + ?Sized,
    H: HistoryStore + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            history: Arc::clone(&self.history),
            config: self.config.clone(),
        }
    }
}

impl<C, H> CorrelationEngine<C, H>
where
    C: CacheStore + ?Sized,
    H: HistoryStore + ?Sized,
{
    pub fn new(cache: Arc<C>, history: Arc<H>, config: CorrelationConfig) -> Self {
        Self {
            cache,
            history,
            config,
        }
    }

    pub fn config(&self) -> &CorrelationConfig {
        &self.config
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Resolve the DataCache entry for `correlation_id` within `tenant_id`.
    ///
    /// Fails with `CorrelationError::NotFound` when neither the cache nor
    /// history knows the originating credit transfer. Cache and history
    /// connectivity failures propagate; a failed write-back does not.
    pub async fn resolve(
        &self,
        tenant_id: &TenantId,
        correlation_id: &str,
    ) -> TmsResult<Resolved<DataCache>> {
        let key = TenantCacheKey::new(tenant_id, correlation_id)?;

        if let Some(bytes) = self.cache.get(key.as_str()).await? {
            match DataCache::from_bytes(&bytes) {
                Some(entry) => {
                    tracing::debug!(key = %key, "DataCache hit");
                    return Ok(Resolved::direct(entry));
                }
                None => {
                    tracing::warn!(key = %key, "Malformed DataCache payload, rebuilding from history");
                }
            }
        } else {
            tracing::debug!(key = %key, "DataCache miss, rebuilding from history");
        }

        let entry = self.rebuild(tenant_id, correlation_id).await?;
        let written_back = self.write_back(&key, &entry).await;
        Ok(Resolved::rebuilt(entry, written_back))
    }

    /// Write the DataCache for a freshly processed credit transfer.
    ///
    /// Unlike the rebuild write-back, failures here are returned.
    pub async fn store(
        &self,
        tenant_id: &TenantId,
        correlation_id: &str,
        entry: &DataCache,
    ) -> TmsResult<()> {
        let key = TenantCacheKey::new(tenant_id, correlation_id)?;
        let bytes = entry.to_bytes()?;
        self.cache
            .set(key.as_str(), &bytes, self.config.cache_ttl_secs)
            .await?;
        tracing::debug!(key = %key, ttl_secs = self.config.cache_ttl_secs, "DataCache stored");
        Ok(())
    }

    async fn rebuild(&self, tenant_id: &TenantId, correlation_id: &str) -> TmsResult<DataCache> {
        let raw = self
            .history
            .query_by_correlation_id(
                MessageKind::Pacs008.collection(),
                tenant_id.as_str(),
                correlation_id,
            )
            .await?;
        let documents = flatten_documents(Value::Array(raw));

        if documents.is_empty() {
            tracing::error!(
                tenant_id = %tenant_id,
                correlation_id,
                "No pacs008 transaction found for tenant {} with EndToEndId {}",
                tenant_id,
                correlation_id
            );
            return Err(not_found(tenant_id, correlation_id));
        }

        let total = documents.len();
        for (index, document) in documents.into_iter().enumerate() {
            match self.entry_from_document(tenant_id, document) {
                Ok(entry) => {
                    tracing::info!(
                        tenant_id = %tenant_id,
                        correlation_id,
                        skipped = index,
                        "DataCache rebuilt from history"
                    );
                    return Ok(entry);
                }
                Err(reason) => {
                    tracing::warn!(
                        tenant_id = %tenant_id,
                        correlation_id,
                        %reason,
                        "Skipping unusable pacs008 history record"
                    );
                }
            }
        }

        tracing::error!(
            tenant_id = %tenant_id,
            correlation_id,
            records = total,
            "No usable pacs008 transaction found for tenant {} with EndToEndId {}",
            tenant_id,
            correlation_id
        );
        Err(not_found(tenant_id, correlation_id))
    }

    fn entry_from_document(&self, tenant_id: &TenantId, document: Value) -> Result<DataCache, String> {
        let msg: Pacs008 = serde_json::from_value(document).map_err(|e| e.to_string())?;
        DataCache::from_credit_transfer(tenant_id.as_str(), &msg, self.config.key_mode)
            .map_err(|e| e.to_string())
    }

    /// Best-effort cache repair. Returns whether the entry was written.
    async fn write_back(&self, key: &TenantCacheKey, entry: &DataCache) -> bool {
        let bytes = match entry.to_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Could not encode rebuilt DataCache, skipping write-back");
                return false;
            }
        };

        match self
            .cache
            .set(key.as_str(), &bytes, self.config.cache_ttl_secs)
            .await
        {
            Ok(()) => {
                tracing::debug!(key = %key, "Rebuilt DataCache written back");
                true
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "DataCache write-back failed");
                false
            }
        }
    }
}

fn not_found(tenant_id: &TenantId, correlation_id: &str) -> tms_core::TmsError {
    CorrelationError::NotFound {
        tenant_id: tenant_id.to_string(),
        correlation_id: correlation_id.to_string(),
    }
    .into()
}
