//! # printhub-database
//!
//! The [`JobStore`] abstraction plus its PostgreSQL and in-memory
//! implementations.

pub mod memory;
pub mod pool;
pub mod repositories;
pub mod store;

use std::sync::Arc;

use tracing::info;

use printhub_core::config::DatabaseConfig;
use printhub_core::result::AppResult;

pub use memory::MemoryJobStore;
pub use repositories::PgJobStore;
pub use store::{JobStore, PrinterJobs};

/// Open the job store selected by configuration.
///
/// `url = "memory"` yields a process-local store; anything else is treated as
/// a PostgreSQL URL, connected, and migrated.
pub async fn open_job_store(config: &DatabaseConfig) -> AppResult<Arc<dyn JobStore>> {
    if config.is_memory() {
        info!("Using in-memory job store; jobs are lost on restart");
        return Ok(Arc::new(MemoryJobStore::new()));
    }

    let pool = pool::open(config).await?;
    Ok(Arc::new(PgJobStore::new(pool)))
}
