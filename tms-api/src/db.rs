//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling using deadpool-postgres, and the
//! PostgreSQL-backed history and graph stores. Node and account-holder
//! inserts use `ON CONFLICT DO NOTHING` so concurrent handlers touching the
//! same parties never conflict.

use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use serde_json::Value as JsonValue;
use std::time::Duration;
use tms_core::{
    AccountHolder, AccountNode, EntityNode, HistoryRecord, StorageError, TmsError, TmsResult,
    TransactionRelationship,
};
use tms_storage::{GraphStore, HistoryStore};
use tokio_postgres::NoTls;

use crate::error::{ApiError, ApiResult};

const STORE: &str = "postgres";

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS transaction_history (
    id              UUID PRIMARY KEY,
    collection      TEXT NOT NULL,
    tenant_id       TEXT NOT NULL,
    correlation_id  TEXT NOT NULL,
    cre_dt_tm       TEXT NOT NULL,
    recorded_at     TIMESTAMPTZ NOT NULL,
    document        JSONB NOT NULL
);
CREATE INDEX IF NOT EXISTS transaction_history_correlation_idx
    ON transaction_history (collection, tenant_id, correlation_id);

CREATE TABLE IF NOT EXISTS entities (
    key        TEXT PRIMARY KEY,
    tenant_id  TEXT NOT NULL,
    cre_dt_tm  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS accounts (
    key        TEXT PRIMARY KEY,
    tenant_id  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS account_holders (
    from_node  TEXT NOT NULL,
    to_node    TEXT NOT NULL,
    cre_dt_tm  TEXT NOT NULL,
    tenant_id  TEXT NOT NULL,
    PRIMARY KEY (from_node, to_node)
);

CREATE TABLE IF NOT EXISTS transaction_relationships (
    id             BIGSERIAL PRIMARY KEY,
    tenant_id      TEXT NOT NULL,
    from_node      TEXT NOT NULL,
    to_node        TEXT NOT NULL,
    tx_tp          TEXT NOT NULL,
    end_to_end_id  TEXT NOT NULL,
    edge           JSONB NOT NULL
);
"#;

// ============================================================================
// DATABASE CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Connection timeout
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "tms".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from `TMS_DB_*` variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("TMS_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("TMS_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("TMS_DB_NAME").unwrap_or_else(|_| "tms".to_string()),
            user: std::env::var("TMS_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("TMS_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("TMS_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("TMS_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());
        cfg.connect_timeout = Some(self.timeout);

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        cfg.pool = Some(deadpool_postgres::PoolConfig::new(self.max_size));

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// DATABASE CLIENT
// ============================================================================

/// Pool-backed client implementing the history and graph store contracts.
#[derive(Clone)]
pub struct DbClient {
    pool: Pool,
}

impl DbClient {
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        Ok(Self {
            pool: config.create_pool()?,
        })
    }

    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create tables and indexes if they do not exist.
    pub async fn ensure_schema(&self) -> ApiResult<()> {
        let conn = self.pool.get().await?;
        conn.batch_execute(SCHEMA).await?;
        tracing::info!("Database schema ready");
        Ok(())
    }

    async fn get_conn(&self) -> TmsResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(|e| {
            StorageError::Unavailable {
                store: STORE.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    async fn execute(
        &self,
        statement: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> TmsResult<u64> {
        let conn = self.get_conn().await?;
        conn.execute(statement, params).await.map_err(write_failed)
    }
}

fn write_failed(e: tokio_postgres::Error) -> TmsError {
    tracing::error!("Database error: {:?}", e);
    StorageError::WriteFailed {
        store: STORE.to_string(),
        reason: e.to_string(),
    }
    .into()
}

fn query_failed(e: tokio_postgres::Error) -> TmsError {
    tracing::error!("Database error: {:?}", e);
    StorageError::QueryFailed {
        store: STORE.to_string(),
        reason: e.to_string(),
    }
    .into()
}

fn encode(what: &str, value: &impl serde::Serialize) -> TmsResult<JsonValue> {
    serde_json::to_value(value).map_err(|e| {
        StorageError::Serialization {
            what: what.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

#[async_trait]
impl HistoryStore for DbClient {
    async fn append(&self, record: &HistoryRecord) -> TmsResult<()> {
        self.execute(
            "INSERT INTO transaction_history \
             (id, collection, tenant_id, correlation_id, cre_dt_tm, recorded_at, document) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
            &[
                &record.id,
                &record.collection,
                &record.tenant_id,
                &record.correlation_id,
                &record.cre_dt_tm,
                &record.recorded_at,
                &record.document,
            ],
        )
        .await?;
        Ok(())
    }

    async fn query_by_correlation_id(
        &self,
        collection: &str,
        tenant_id: &str,
        correlation_id: &str,
    ) -> TmsResult<Vec<JsonValue>> {
        let conn = self.get_conn().await?;
        // UUIDv7 ids compare in creation order.
        let rows = conn
            .query(
                "SELECT document FROM transaction_history \
                 WHERE collection = $1 AND tenant_id = $2 AND correlation_id = $3 \
                 ORDER BY id DESC",
                &[&collection, &tenant_id, &correlation_id],
            )
            .await
            .map_err(query_failed)?;

        Ok(rows.iter().map(|row| row.get::<_, JsonValue>(0)).collect())
    }

    async fn ping(&self) -> TmsResult<()> {
        let conn = self.get_conn().await?;
        conn.simple_query("SELECT 1").await.map_err(query_failed)?;
        Ok(())
    }
}

#[async_trait]
impl GraphStore for DbClient {
    async fn save_entity(&self, entity: &EntityNode) -> TmsResult<()> {
        self.execute(
            "INSERT INTO entities (key, tenant_id, cre_dt_tm) VALUES ($1, $2, $3) \
             ON CONFLICT DO NOTHING",
            &[&entity.key, &entity.tenant_id, &entity.cre_dt_tm],
        )
        .await?;
        Ok(())
    }

    async fn save_account(&self, account: &AccountNode) -> TmsResult<()> {
        self.execute(
            "INSERT INTO accounts (key, tenant_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            &[&account.key, &account.tenant_id],
        )
        .await?;
        Ok(())
    }

    async fn save_account_holder(&self, holder: &AccountHolder) -> TmsResult<()> {
        self.execute(
            "INSERT INTO account_holders (from_node, to_node, cre_dt_tm, tenant_id) \
             VALUES ($1, $2, $3, $4) ON CONFLICT DO NOTHING",
            &[&holder.from, &holder.to, &holder.cre_dt_tm, &holder.tenant_id],
        )
        .await?;
        Ok(())
    }

    async fn save_relationship(&self, relationship: &TransactionRelationship) -> TmsResult<()> {
        let edge = encode("transaction relationship", relationship)?;
        self.execute(
            "INSERT INTO transaction_relationships \
             (tenant_id, from_node, to_node, tx_tp, end_to_end_id, edge) \
             VALUES ($1, $2, $3, $4, $5, $6)",
            &[
                &relationship.tenant_id,
                &relationship.from,
                &relationship.to,
                &relationship.tx_tp,
                &relationship.end_to_end_id,
                &edge,
            ],
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DbConfig::default();
        assert_eq!(config.port, 5432);
        assert_eq!(config.dbname, "tms");
        assert_eq!(config.max_size, 16);
    }

    #[test]
    fn test_create_pool_is_lazy() {
        // deadpool connects on first checkout, so building a pool needs no server.
        assert!(DbConfig::default().create_pool().is_ok());
    }

    #[test]
    fn test_schema_declares_idempotent_tables() {
        for table in [
            "transaction_history",
            "entities",
            "accounts",
            "account_holders",
            "transaction_relationships",
        ] {
            assert!(SCHEMA.contains(&format!("CREATE TABLE IF NOT EXISTS {}", table)));
        }
    }
}
