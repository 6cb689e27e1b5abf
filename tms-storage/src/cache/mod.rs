//! DataCache layer: tenant-scoped keys, the LMDB store and the correlation
//! engine that falls back to history on a miss.
//!
//! Every lookup goes through [`TenantCacheKey`], so a key cannot be built
//! without a tenant. Reads return [`Resolved<T>`], which records whether the
//! value came straight from the cache or was rebuilt.

pub mod correlation;
pub mod lmdb_backend;
pub mod resolution;
pub mod tenant_key;

pub use correlation::CorrelationEngine;
pub use lmdb_backend::{LmdbCacheError, LmdbCacheStore};
pub use resolution::{ResolutionPath, Resolved};
pub use tenant_key::TenantCacheKey;
