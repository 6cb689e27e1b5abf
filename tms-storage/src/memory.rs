//! In-memory stores
//!
//! Used by tests and for running the service without infrastructure. Each
//! store counts its calls so tests can assert which paths were taken.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tms_core::{
    sort_newest_first, AccountHolder, AccountNode, EntityNode, HistoryRecord, StorageError,
    TmsResult, TransactionRelationship,
};

use crate::traits::{CacheStats, CacheStore, GraphStore, HistoryStore};

fn unavailable(store: &str) -> StorageError {
    StorageError::Unavailable {
        store: store.to_string(),
        reason: "simulated outage".to_string(),
    }
}

// ============================================================================
// CACHE
// ============================================================================

/// Expiry for a TTL, saturating at the latest representable instant.
fn expires_at(now: DateTime<Utc>, ttl_secs: u64) -> DateTime<Utc> {
    i64::try_from(ttl_secs)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: DateTime<Utc>,
}

/// In-memory cache with TTL, call counters and failure switches.
#[derive(Debug, Default)]
pub struct InMemoryCacheStore {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    fail_gets: AtomicBool,
    fail_sets: AtomicBool,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `get` fail as if the cache were unreachable.
    pub fn fail_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::SeqCst);
    }

    /// Make every `set` fail as if the cache were unreachable.
    pub fn fail_sets(&self, fail: bool) {
        self.fail_sets.store(fail, Ordering::SeqCst);
    }

    /// Store a payload without touching the counters.
    pub fn seed(&self, key: &str, value: &[u8], ttl_secs: u64) -> TmsResult<()> {
        let mut entries = self.entries.write().map_err(|_| StorageError::LockPoisoned)?;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_vec(),
                expires_at: expires_at(Utc::now(), ttl_secs),
            },
        );
        Ok(())
    }

    /// Drop every entry, as an eviction or restart would.
    pub fn clear(&self) -> TmsResult<()> {
        self.entries
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .clear();
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .read()
            .map(|entries| entries.contains_key(key))
            .unwrap_or(false)
    }

    pub fn hit_count(&self) -> u64 {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn miss_count(&self) -> u64 {
        self.misses.load(Ordering::SeqCst)
    }

    pub fn set_count(&self) -> u64 {
        self.sets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> TmsResult<Option<Vec<u8>>> {
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(unavailable("cache").into());
        }

        let entries = self.entries.read().map_err(|_| StorageError::LockPoisoned)?;
        match entries.get(key) {
            Some(entry) if entry.expires_at > Utc::now() => {
                self.hits.fetch_add(1, Ordering::SeqCst);
                Ok(Some(entry.value.clone()))
            }
            _ => {
                self.misses.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl_secs: u64) -> TmsResult<()> {
        if self.fail_sets.load(Ordering::SeqCst) {
            return Err(unavailable("cache").into());
        }
        self.seed(key, value, ttl_secs)?;
        self.sets.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn stats(&self) -> TmsResult<CacheStats> {
        let entry_count = self
            .entries
            .read()
            .map_err(|_| StorageError::LockPoisoned)?
            .len() as u64;
        Ok(CacheStats {
            hits: self.hit_count(),
            misses: self.miss_count(),
            sets: self.set_count(),
            entry_count,
        })
    }
}

// ============================================================================
// HISTORY
// ============================================================================

/// In-memory transaction history.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    records: Arc<RwLock<Vec<HistoryRecord>>>,
    appends: AtomicU64,
    queries: AtomicU64,
    fail_appends: AtomicBool,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    pub fn append_count(&self) -> u64 {
        self.appends.load(Ordering::SeqCst)
    }

    pub fn query_count(&self) -> u64 {
        self.queries.load(Ordering::SeqCst)
    }

    /// Records appended to `collection`, in append order.
    pub fn records(&self, collection: &str) -> Vec<HistoryRecord> {
        self.records
            .read()
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.collection == collection)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(&self, record: &HistoryRecord) -> TmsResult<()> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(unavailable("history").into());
        }
        self.records
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .push(record.clone());
        self.appends.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn query_by_correlation_id(
        &self,
        collection: &str,
        tenant_id: &str,
        correlation_id: &str,
    ) -> TmsResult<Vec<Value>> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        let mut matching: Vec<HistoryRecord> = self
            .records
            .read()
            .map_err(|_| StorageError::LockPoisoned)?
            .iter()
            .filter(|r| {
                r.collection == collection
                    && r.tenant_id == tenant_id
                    && r.correlation_id == correlation_id
            })
            .cloned()
            .collect();
        sort_newest_first(&mut matching);

        Ok(matching.into_iter().map(|r| r.document).collect())
    }

    async fn ping(&self) -> TmsResult<()> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(unavailable("history").into());
        }
        Ok(())
    }
}

// ============================================================================
// GRAPH
// ============================================================================

/// In-memory graph with insert-if-absent nodes and append-only edges.
#[derive(Debug, Default)]
pub struct InMemoryGraphStore {
    entities: Arc<RwLock<HashMap<String, EntityNode>>>,
    accounts: Arc<RwLock<HashMap<String, AccountNode>>>,
    holders: Arc<RwLock<HashMap<(String, String), AccountHolder>>>,
    relationships: Arc<RwLock<Vec<TransactionRelationship>>>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn account_count(&self) -> usize {
        self.accounts.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn holder_count(&self) -> usize {
        self.holders.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn has_entity(&self, key: &str) -> bool {
        self.entities
            .read()
            .map(|m| m.contains_key(key))
            .unwrap_or(false)
    }

    pub fn has_account(&self, key: &str) -> bool {
        self.accounts
            .read()
            .map(|m| m.contains_key(key))
            .unwrap_or(false)
    }

    pub fn relationships(&self) -> Vec<TransactionRelationship> {
        self.relationships
            .read()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn save_entity(&self, entity: &EntityNode) -> TmsResult<()> {
        self.entities
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .entry(entity.key.clone())
            .or_insert_with(|| entity.clone());
        Ok(())
    }

    async fn save_account(&self, account: &AccountNode) -> TmsResult<()> {
        self.accounts
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .entry(account.key.clone())
            .or_insert_with(|| account.clone());
        Ok(())
    }

    async fn save_account_holder(&self, holder: &AccountHolder) -> TmsResult<()> {
        self.holders
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .entry((holder.from.clone(), holder.to.clone()))
            .or_insert_with(|| holder.clone());
        Ok(())
    }

    async fn save_relationship(&self, relationship: &TransactionRelationship) -> TmsResult<()> {
        self.relationships
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .push(relationship.clone());
        Ok(())
    }
}
