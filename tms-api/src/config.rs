//! API Configuration Module
//!
//! Process configuration for the ingestion service. Everything is read from
//! environment variables with defaults suitable for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use tms_core::CorrelationConfig;

use crate::error::{ApiError, ApiResult};

// ============================================================================
// BACKEND SELECTION
// ============================================================================

/// Which cache store backs the DataCache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Memory,
    Lmdb,
}

/// Which stores back history and the relationship graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres,
}

impl CacheBackend {
    fn parse(raw: &str) -> ApiResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "lmdb" => Ok(Self::Lmdb),
            other => Err(ApiError::invalid_input(format!(
                "Invalid TMS_CACHE_BACKEND '{}', expected 'memory' or 'lmdb'",
                other
            ))),
        }
    }
}

impl StoreBackend {
    fn parse(raw: &str) -> ApiResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "postgres" => Ok(Self::Postgres),
            other => Err(ApiError::invalid_input(format!(
                "Invalid TMS_STORE_BACKEND '{}', expected 'memory' or 'postgres'",
                other
            ))),
        }
    }
}

// ============================================================================
// API CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_host: String,
    pub port: u16,

    /// Downstream risk-scoring endpoint. Notification is skipped when unset.
    pub risk_endpoint: Option<String>,
    pub notify_timeout: Duration,

    pub cache_backend: CacheBackend,
    pub lmdb_path: PathBuf,
    pub lmdb_max_size_mb: usize,

    pub store_backend: StoreBackend,

    pub correlation: CorrelationConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 3000,
            risk_endpoint: None,
            notify_timeout: Duration::from_secs(10),
            cache_backend: CacheBackend::Memory,
            lmdb_path: PathBuf::from("./data/tms-cache"),
            lmdb_max_size_mb: 256,
            store_backend: StoreBackend::Memory,
            correlation: CorrelationConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `TMS_API_BIND` / `PORT` / `TMS_API_PORT`: listen address
    /// - `TMS_RISK_ENDPOINT`: downstream risk service URL
    /// - `TMS_NOTIFY_TIMEOUT_SECS`: notification request timeout
    /// - `TMS_CACHE_BACKEND`: `memory` or `lmdb`
    /// - `TMS_LMDB_PATH`, `TMS_LMDB_MAX_SIZE_MB`: LMDB cache location and map size
    /// - `TMS_STORE_BACKEND`: `memory` or `postgres`
    /// - `TMS_CACHE_TTL_SECS`, `TMS_KEY_MODE`: correlation settings
    pub fn from_env() -> ApiResult<Self> {
        let defaults = Self::default();

        let port = match std::env::var("PORT").or_else(|_| std::env::var("TMS_API_PORT")) {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", raw)))?,
            Err(_) => defaults.port,
        };

        let cache_backend = match std::env::var("TMS_CACHE_BACKEND") {
            Ok(raw) => CacheBackend::parse(&raw)?,
            Err(_) => defaults.cache_backend,
        };

        let store_backend = match std::env::var("TMS_STORE_BACKEND") {
            Ok(raw) => StoreBackend::parse(&raw)?,
            Err(_) => defaults.store_backend,
        };

        Ok(Self {
            bind_host: std::env::var("TMS_API_BIND").unwrap_or(defaults.bind_host),
            port,
            risk_endpoint: std::env::var("TMS_RISK_ENDPOINT")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            notify_timeout: std::env::var("TMS_NOTIFY_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.notify_timeout),
            cache_backend,
            lmdb_path: std::env::var("TMS_LMDB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.lmdb_path),
            lmdb_max_size_mb: std::env::var("TMS_LMDB_MAX_SIZE_MB")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.lmdb_max_size_mb),
            store_backend,
            correlation: CorrelationConfig::from_env()?,
        })
    }

    pub fn bind_addr(&self) -> ApiResult<SocketAddr> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_runs_without_infrastructure() {
        let config = ApiConfig::default();
        assert_eq!(config.cache_backend, CacheBackend::Memory);
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert!(config.risk_endpoint.is_none());
        assert_eq!(config.correlation.cache_ttl_secs, 300);
    }

    #[test]
    fn test_bind_addr() -> ApiResult<()> {
        let config = ApiConfig {
            bind_host: "127.0.0.1".to_string(),
            port: 8080,
            ..Default::default()
        };
        assert_eq!(config.bind_addr()?.port(), 8080);
        Ok(())
    }

    #[test]
    fn test_invalid_bind_addr() {
        let config = ApiConfig {
            bind_host: "not a host".to_string(),
            ..Default::default()
        };
        assert!(config.bind_addr().is_err());
    }

    #[test]
    fn test_backend_parsing() {
        assert_eq!(CacheBackend::parse("LMDB").ok(), Some(CacheBackend::Lmdb));
        assert_eq!(StoreBackend::parse(" postgres ").ok(), Some(StoreBackend::Postgres));
        assert!(CacheBackend::parse("redis").is_err());
        assert!(StoreBackend::parse("arangodb").is_err());
    }
}
