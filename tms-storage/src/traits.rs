//! Store contracts consumed by the correlation engine and the handlers.
//!
//! Absence is never an error at these seams: a cold cache key is `Ok(None)`
//! and an unknown correlation id is an empty result. Only infrastructure
//! failures surface as `Err`.

use async_trait::async_trait;
use serde_json::Value;
use tms_core::{AccountHolder, AccountNode, EntityNode, HistoryRecord, TmsResult, TransactionRelationship};

/// Volatile key/value cache with per-entry TTL.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get the raw payload stored under `key`, if present and unexpired.
    async fn get(&self, key: &str) -> TmsResult<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any existing entry.
    async fn set(&self, key: &str, value: &[u8], ttl_secs: u64) -> TmsResult<()>;

    async fn stats(&self) -> TmsResult<CacheStats>;
}

/// Durable, append-only transaction history.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, record: &HistoryRecord) -> TmsResult<()>;

    /// Documents in `collection` for one tenant and correlation id, newest
    /// first. Elements may themselves be arrays; callers flatten.
    async fn query_by_correlation_id(
        &self,
        collection: &str,
        tenant_id: &str,
        correlation_id: &str,
    ) -> TmsResult<Vec<Value>>;

    /// Cheap connectivity check used by readiness.
    async fn ping(&self) -> TmsResult<()>;
}

/// Graph of entities, accounts and the edges between them.
///
/// Node and holder writes are insert-if-absent so that concurrent handlers
/// touching the same parties do not conflict.
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn save_entity(&self, entity: &EntityNode) -> TmsResult<()>;

    async fn save_account(&self, account: &AccountNode) -> TmsResult<()>;

    async fn save_account_holder(&self, holder: &AccountHolder) -> TmsResult<()>;

    /// Append a relationship edge. Never deduplicated.
    async fn save_relationship(&self, relationship: &TransactionRelationship) -> TmsResult<()>;
}

/// Cache usage counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    /// Entries currently stored, expired ones included until overwritten.
    pub entry_count: u64,
}

impl CacheStats {
    /// Hit rate in `0.0..=1.0`.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);

        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..Default::default()
        };
        assert_eq!(stats.hit_rate(), 0.75);
    }
}
