//! Error types for TMS operations

use thiserror::Error;

/// Storage layer errors.
///
/// Only genuine infrastructure failures live here. Semantic absence (a cold
/// cache, an empty history query) is modelled as `Option`/empty results by the
/// store contracts, never as an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("{store} store unavailable: {reason}")]
    Unavailable { store: String, reason: String },

    #[error("Write to {store} failed: {reason}")]
    WriteFailed { store: String, reason: String },

    #[error("Query against {store} failed: {reason}")]
    QueryFailed { store: String, reason: String },

    #[error("Serialization failed for {what}: {reason}")]
    Serialization { what: String, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Minimal-shape validation errors for inbound messages.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Key parsing errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("Invalid tenant key format: {key}")]
    InvalidFormat { key: String },

    #[error("Tenant id must not contain the cache key separator: {tenant_id}")]
    InvalidTenant { tenant_id: String },
}

/// Correlation errors raised while resolving a status report.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CorrelationError {
    #[error("No pacs.008 transaction found for tenant {tenant_id} with EndToEndId {correlation_id}")]
    NotFound {
        tenant_id: String,
        correlation_id: String,
    },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all TMS errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TmsError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Key error: {0}")]
    Key(#[from] KeyError),

    #[error("Correlation error: {0}")]
    Correlation(#[from] CorrelationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl TmsError {
    /// True when the error means "no originating transfer is known".
    pub fn is_not_found(&self) -> bool {
        matches!(self, TmsError::Correlation(CorrelationError::NotFound { .. }))
    }
}

/// Result type alias for TMS operations.
pub type TmsResult<T> = Result<T, TmsError>;

// =============================================================================
// TESTS
// =============================================================================
