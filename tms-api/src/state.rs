//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use tms_core::CorrelationConfig;
use tms_storage::{
    CacheStore, CorrelationEngine, GraphStore, HistoryStore, InMemoryCacheStore,
    InMemoryGraphStore, InMemoryHistoryStore,
};

use crate::notifier::{NoopNotifier, Notifier};

/// Correlation engine over whichever stores the process was configured with.
pub type ApiEngine = CorrelationEngine<dyn CacheStore, dyn HistoryStore>;

/// Application-wide state shared across all routes.
///
/// Stores are constructed once by the composition root and shared by
/// reference; handlers never reach for process-global clients.
#[derive(Clone)]
pub struct AppState {
    pub engine: ApiEngine,
    pub history: Arc<dyn HistoryStore>,
    pub graph: Arc<dyn GraphStore>,
    pub notifier: Arc<dyn Notifier>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        history: Arc<dyn HistoryStore>,
        graph: Arc<dyn GraphStore>,
        notifier: Arc<dyn Notifier>,
        config: CorrelationConfig,
    ) -> Self {
        Self {
            engine: CorrelationEngine::new(cache, Arc::clone(&history), config),
            history,
            graph,
            notifier,
            start_time: Instant::now(),
        }
    }

    /// State backed entirely by in-memory stores, with notifications dropped.
    pub fn in_memory(config: CorrelationConfig) -> Self {
        Self::new(
            Arc::new(InMemoryCacheStore::new()),
            Arc::new(InMemoryHistoryStore::new()),
            Arc::new(InMemoryGraphStore::new()),
            Arc::new(NoopNotifier),
            config,
        )
    }

    pub fn config(&self) -> &CorrelationConfig {
        self.engine.config()
    }
}
