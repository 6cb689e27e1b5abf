//! TMS Core - message types, key derivation and relationship building
//!
//! Pure data and functions with no I/O. The storage and API crates depend on
//! this crate for everything they persist.

pub mod config;
pub mod data_cache;
pub mod error;
pub mod graph;
pub mod history;
pub mod keys;
pub mod message;
pub mod relationship;
pub mod tenant;

pub use config::{CorrelationConfig, DEFAULT_CACHE_TTL_SECS};
pub use data_cache::{CacheAmount, DataCache};
pub use error::{
    ConfigError, CorrelationError, KeyError, StorageError, TmsError, TmsResult, ValidationError,
};
pub use graph::{AccountHolder, AccountNode, EntityNode, PartyGraph};
pub use history::{flatten_documents, sort_newest_first, HistoryRecord};
pub use keys::{
    extract_tenant_from_key, generate_creditor_account_key, generate_creditor_entity_key,
    generate_debtor_account_key, generate_debtor_entity_key, generate_tenant_cache_key,
    hash_creditor_account, hash_debtor_account, KeyMode, PartyKeys,
};
pub use message::{MessageKind, Pacs002, Pacs008, Pain001, Pain013, PartyBearing, PaymentMessage};
pub use relationship::{account_node, TransactionRelationship};
pub use tenant::{TenantId, DEFAULT_TENANT_ID};
