//! Per-printer dispatch.
//!
//! [`Dispatcher::try_dispatch`] is the only place a job moves from `queued`
//! to `active`. Each lock scope covers one check-and-promote cycle; the
//! launch itself runs after the lock is released.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use printhub_core::result::AppResult;
use printhub_core::traits::storage::StorageProvider;
use printhub_database::JobStore;
use printhub_entity::job::{Job, JobStatus, PrinterType};

use crate::launcher::{LaunchRequest, Launcher};
use crate::locks::PrinterLocks;

/// Advances each printer's queue.
#[derive(Debug)]
pub struct Dispatcher {
    store: Arc<dyn JobStore>,
    storage: Arc<dyn StorageProvider>,
    launcher: Arc<dyn Launcher>,
    locks: PrinterLocks,
}

impl Dispatcher {
    /// Create a dispatcher over the given collaborators.
    pub fn new(
        store: Arc<dyn JobStore>,
        storage: Arc<dyn StorageProvider>,
        launcher: Arc<dyn Launcher>,
    ) -> Self {
        Self {
            store,
            storage,
            launcher,
            locks: PrinterLocks::new(),
        }
    }

    /// Start the next queued job of `printer` if the printer is idle.
    ///
    /// Returns the job that was started, or `None` when the printer is busy
    /// or has nothing queued. Jobs whose launch fails are marked `failed`
    /// with the diagnostic in their notes and the next job is tried. Only
    /// store errors are returned as `Err`.
    pub async fn try_dispatch(&self, printer: PrinterType) -> AppResult<Option<Job>> {
        loop {
            let Some(job) = self.promote_next(printer).await? else {
                return Ok(None);
            };

            let request = LaunchRequest {
                job_id: job.id,
                printer,
                file_path: self.storage.local_path(&job.payload_ref),
                file_name: job.file_name.clone(),
            };

            match self.launcher.launch(&request).await {
                Ok(report) => {
                    info!(
                        job_id = %job.id,
                        printer = %printer,
                        duration_ms = report.duration_ms,
                        "Print launched"
                    );
                    return Ok(Some(job));
                }
                Err(launch_err) => {
                    warn!(
                        job_id = %job.id,
                        printer = %printer,
                        error = %launch_err,
                        "Print launch failed, moving to next job"
                    );
                    self.mark_launch_failed(&job, &launch_err.diagnostic())
                        .await?;
                }
            }
        }
    }

    /// Run [`Dispatcher::try_dispatch`] once for every printer.
    ///
    /// Used at startup so jobs queued while the server was down get going.
    pub async fn dispatch_all(&self) -> AppResult<Vec<Job>> {
        let mut started = Vec::new();
        for printer in PrinterType::ALL {
            if let Some(job) = self.try_dispatch(printer).await? {
                started.push(job);
            }
        }
        Ok(started)
    }

    /// One locked check-and-promote cycle.
    async fn promote_next(&self, printer: PrinterType) -> AppResult<Option<Job>> {
        let _guard = self.locks.acquire(printer).await;

        loop {
            if let Some(active) = self.store.find_active(printer).await? {
                debug!(printer = %printer, active_job = %active.id, "Printer busy");
                return Ok(None);
            }

            let Some(next) = self.store.find_oldest_queued(printer).await? else {
                debug!(printer = %printer, "Queue empty");
                return Ok(None);
            };

            let promoted = self
                .store
                .transition(next.id, JobStatus::Queued, JobStatus::Active, Utc::now(), None)
                .await
                .inspect_err(|e| error!(job_id = %next.id, error = %e, "Promotion failed"))?;

            match promoted {
                Some(job) => {
                    info!(job_id = %job.id, printer = %printer, file = %job.file_name, "Job promoted to active");
                    return Ok(Some(job));
                }
                // Deleted or promoted elsewhere since we looked; look again.
                None => debug!(job_id = %next.id, printer = %printer, "Promotion lost a race"),
            }
        }
    }

    async fn mark_launch_failed(&self, job: &Job, diagnostic: &str) -> AppResult<()> {
        let failed = self
            .store
            .transition(
                job.id,
                JobStatus::Active,
                JobStatus::Failed,
                Utc::now(),
                Some(diagnostic),
            )
            .await
            .inspect_err(|e| error!(job_id = %job.id, error = %e, "Could not record launch failure"))?;

        if failed.is_none() {
            // An operator finished the job while the launch was running.
            debug!(job_id = %job.id, "Job left active before launch failure was recorded");
        }
        Ok(())
    }
}
