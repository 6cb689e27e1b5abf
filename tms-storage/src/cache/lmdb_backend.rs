//! LMDB-backed cache store.
//!
//! Uses heed (LMDB bindings) as a local memory-mapped cache for DataCache
//! entries. Values are stored as `[expires_at_ms: 8 bytes LE][payload]`;
//! entries past their expiry read as absent and are overwritten on the next
//! `set`. Keys beyond LMDB's key size limit are never cached: `get` reports a
//! miss and `set` is skipped, leaving history to serve the rebuild.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use heed::types::{Bytes, Str};
use heed::{Database, Env, EnvOpenOptions};
use tms_core::{StorageError, TmsError, TmsResult};

use crate::traits::{CacheStats, CacheStore};

const STORE: &str = "lmdb";
const EXPIRY_LEN: usize = 8;
/// LMDB's default maximum key size in bytes.
const MAX_KEY_LEN: usize = 511;

/// Error type for opening the LMDB environment.
#[derive(Debug, thiserror::Error)]
pub enum LmdbCacheError {
    #[error("Failed to open LMDB environment: {0}")]
    EnvOpen(String),

    #[error("Failed to open database: {0}")]
    DbOpen(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LmdbCacheError> for TmsError {
    fn from(e: LmdbCacheError) -> Self {
        TmsError::Storage(StorageError::Unavailable {
            store: STORE.to_string(),
            reason: e.to_string(),
        })
    }
}

/// LMDB cache store with per-entry expiry.
pub struct LmdbCacheStore {
    env: Env,
    db: Database<Str, Bytes>,
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
}

impl LmdbCacheStore {
    /// Open (or create) a cache at `path` with a map size of `max_size_mb`.
    pub fn new<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, LmdbCacheError> {
        std::fs::create_dir_all(&path)?;

        // SAFETY: the environment is opened once per path by this process.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(max_size_mb * 1024 * 1024)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(|e| LmdbCacheError::EnvOpen(e.to_string()))?;

        let mut wtxn = env
            .write_txn()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;
        let db: Database<Str, Bytes> = env
            .create_database(&mut wtxn, None)
            .map_err(|e| LmdbCacheError::DbOpen(e.to_string()))?;
        wtxn.commit()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        Ok(Self {
            env,
            db,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            sets: AtomicU64::new(0),
        })
    }

    fn read_failed(e: heed::Error) -> TmsError {
        StorageError::QueryFailed {
            store: STORE.to_string(),
            reason: e.to_string(),
        }
        .into()
    }

    fn write_failed(e: heed::Error) -> TmsError {
        StorageError::WriteFailed {
            store: STORE.to_string(),
            reason: e.to_string(),
        }
        .into()
    }

    fn miss(&self) -> TmsResult<Option<Vec<u8>>> {
        self.misses.fetch_add(1, Ordering::Relaxed);
        Ok(None)
    }
}

/// Split a stored value into its expiry and payload.
fn decode_entry(bytes: &[u8]) -> Option<(i64, &[u8])> {
    if bytes.len() < EXPIRY_LEN {
        return None;
    }
    let (expiry, payload) = bytes.split_at(EXPIRY_LEN);
    let expiry: [u8; EXPIRY_LEN] = expiry.try_into().ok()?;
    Some((i64::from_le_bytes(expiry), payload))
}

fn encode_entry(expires_at_ms: i64, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(EXPIRY_LEN + payload.len());
    out.extend_from_slice(&expires_at_ms.to_le_bytes());
    out.extend_from_slice(payload);
    out
}

#[async_trait]
impl CacheStore for LmdbCacheStore {
    async fn get(&self, key: &str) -> TmsResult<Option<Vec<u8>>> {
        if key.len() > MAX_KEY_LEN {
            tracing::debug!(key_len = key.len(), "Key exceeds LMDB limit, treating as miss");
            return self.miss();
        }

        let rtxn = self.env.read_txn().map_err(Self::read_failed)?;
        let stored = self.db.get(&rtxn, key).map_err(Self::read_failed)?;

        let Some((expires_at_ms, payload)) = stored.and_then(decode_entry) else {
            return self.miss();
        };
        if expires_at_ms <= Utc::now().timestamp_millis() {
            return self.miss();
        }

        self.hits.fetch_add(1, Ordering::Relaxed);
        Ok(Some(payload.to_vec()))
    }

    async fn set(&self, key: &str, value: &[u8], ttl_secs: u64) -> TmsResult<()> {
        if key.len() > MAX_KEY_LEN {
            tracing::warn!(key_len = key.len(), "Key exceeds LMDB limit, not caching");
            return Ok(());
        }

        let ttl_ms = i64::try_from(ttl_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
        let expires_at_ms = Utc::now().timestamp_millis().saturating_add(ttl_ms);
        let entry = encode_entry(expires_at_ms, value);

        let mut wtxn = self.env.write_txn().map_err(Self::write_failed)?;
        self.db
            .put(&mut wtxn, key, &entry)
            .map_err(Self::write_failed)?;
        wtxn.commit().map_err(Self::write_failed)?;

        self.sets.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn stats(&self) -> TmsResult<CacheStats> {
        let rtxn = self.env.read_txn().map_err(Self::read_failed)?;
        let entry_count = self.db.len(&rtxn).map_err(Self::read_failed)?;
        Ok(CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            entry_count,
        })
    }
}
