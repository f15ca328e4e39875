//! Per-printer dispatch locks.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use printhub_entity::job::PrinterType;

/// One async mutex per printer, created on first use.
///
/// Different printers never contend with each other.
#[derive(Debug, Default)]
pub struct PrinterLocks {
    locks: DashMap<PrinterType, Arc<Mutex<()>>>,
}

impl PrinterLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a printer's queue.
    pub async fn acquire(&self, printer: PrinterType) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the DashMap shard guard is released before awaiting.
        let lock = self.locks.entry(printer).or_default().clone();
        lock.lock_owned().await
    }
}
