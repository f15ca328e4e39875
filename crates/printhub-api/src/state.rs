//! Application state shared across all handlers.

use std::sync::Arc;

use printhub_core::config::AppConfig;
use printhub_core::traits::storage::StorageProvider;
use printhub_service::PrintQueueService;

/// Application state passed to every handler via `State<AppState>`.
///
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration snapshot.
    pub config: Arc<AppConfig>,
    /// Print queue use cases.
    pub queue: Arc<PrintQueueService>,
    /// Payload storage, for health reporting.
    pub storage: Arc<dyn StorageProvider>,
}

impl AppState {
    /// Bundle the shared dependencies.
    pub fn new(
        config: Arc<AppConfig>,
        queue: Arc<PrintQueueService>,
        storage: Arc<dyn StorageProvider>,
    ) -> Self {
        Self {
            config,
            queue,
            storage,
        }
    }
}
