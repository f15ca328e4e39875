//! Read-only queue projection.

use chrono::{DateTime, Utc};
use serde::Serialize;

use printhub_core::result::AppResult;
use printhub_core::types::JobId;
use printhub_database::JobStore;
use printhub_entity::job::{Job, PrinterType};

/// State of one printer's queue.
#[derive(Debug, Clone, Serialize)]
pub struct PrinterQueue {
    /// The printer.
    pub printer: PrinterType,
    /// Job currently printing.
    pub active: Option<Job>,
    /// Waiting jobs in dispatch order.
    pub queued: Vec<Job>,
    /// Most recently finished jobs, newest first.
    pub recent: Vec<Job>,
}

impl PrinterQueue {
    /// 1-based position of a job in the waiting list.
    pub fn position_of(&self, id: JobId) -> Option<usize> {
        self.queued.iter().position(|job| job.id == id).map(|i| i + 1)
    }

    /// Whether nothing is printing or waiting.
    pub fn is_idle(&self) -> bool {
        self.active.is_none() && self.queued.is_empty()
    }
}

/// Queue state of every printer.
#[derive(Debug, Clone, Serialize)]
pub struct QueueSnapshot {
    /// One entry per printer, in [`PrinterType::ALL`] order.
    pub printers: Vec<PrinterQueue>,
    /// When the snapshot was taken.
    pub generated_at: DateTime<Utc>,
}

impl QueueSnapshot {
    /// Read the current state of every printer from the store.
    pub async fn capture(store: &dyn JobStore, recent_limit: usize) -> AppResult<Self> {
        let mut printers = Vec::with_capacity(PrinterType::ALL.len());
        for printer in PrinterType::ALL {
            let jobs = store.printer_queue(printer, recent_limit).await?;
            printers.push(PrinterQueue {
                printer,
                active: jobs.active,
                queued: jobs.queued,
                recent: jobs.recent,
            });
        }
        Ok(Self {
            printers,
            generated_at: Utc::now(),
        })
    }

    /// The entry for one printer.
    pub fn printer(&self, printer: PrinterType) -> Option<&PrinterQueue> {
        self.printers.iter().find(|queue| queue.printer == printer)
    }
}
