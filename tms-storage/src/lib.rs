//! TMS Storage - store contracts, stores and DataCache correlation
//!
//! The PostgreSQL history and graph stores live in tms-api next to the
//! connection pool.

pub mod cache;
pub mod memory;
pub mod traits;

pub use cache::{
    CorrelationEngine, LmdbCacheError, LmdbCacheStore, ResolutionPath, Resolved, TenantCacheKey,
};
pub use memory::{InMemoryCacheStore, InMemoryGraphStore, InMemoryHistoryStore};
pub use traits::{CacheStats, CacheStore, GraphStore, HistoryStore};
