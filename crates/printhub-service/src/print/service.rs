//! Job lifecycle actions: complete, fail, delete, and manual dispatch.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use printhub_core::config::{AppConfig, QueueConfig};
use printhub_core::error::AppError;
use printhub_core::result::AppResult;
use printhub_core::traits::storage::StorageProvider;
use printhub_core::types::JobId;
use printhub_database::{JobStore, open_job_store};
use printhub_entity::job::{Job, JobStatus, PrinterType};
use printhub_storage::LocalStorageProvider;
use printhub_worker::{CommandLauncher, Dispatcher};

use super::outcome::ActionOutcome;
use super::snapshot::QueueSnapshot;

/// Orchestrates the print queue.
#[derive(Debug, Clone)]
pub struct PrintQueueService {
    /// Job store.
    pub(super) store: Arc<dyn JobStore>,
    /// Payload storage.
    pub(super) storage: Arc<dyn StorageProvider>,
    /// Per-printer dispatcher.
    pub(super) dispatcher: Arc<Dispatcher>,
    /// Submission and snapshot settings.
    pub(super) config: Arc<QueueConfig>,
}

impl PrintQueueService {
    /// Creates a new print queue service.
    pub fn new(
        store: Arc<dyn JobStore>,
        storage: Arc<dyn StorageProvider>,
        dispatcher: Arc<Dispatcher>,
        config: Arc<QueueConfig>,
    ) -> Self {
        Self {
            store,
            storage,
            dispatcher,
            config,
        }
    }

    /// Wire the service from configuration: job store, local payload
    /// storage, and the command launcher.
    pub async fn from_config(config: &AppConfig) -> AppResult<Self> {
        let store = open_job_store(&config.database).await?;
        let storage: Arc<dyn StorageProvider> =
            Arc::new(LocalStorageProvider::new(&config.storage.root_path).await?);
        let launcher = Arc::new(CommandLauncher::new(Arc::new(config.launcher.clone())));
        let dispatcher = Arc::new(Dispatcher::new(store.clone(), storage.clone(), launcher));

        info!(
            storage = storage.provider_type(),
            printers = PrinterType::ALL.len(),
            "Print queue service ready"
        );
        Ok(Self::new(
            store,
            storage,
            dispatcher,
            Arc::new(config.queue.clone()),
        ))
    }

    /// Payload storage used by this service.
    pub fn storage(&self) -> Arc<dyn StorageProvider> {
        self.storage.clone()
    }

    /// Look up a single job.
    pub async fn get(&self, id: JobId) -> AppResult<Job> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Job #{id} not found")))
    }

    /// Current queue state of every printer.
    pub async fn snapshot(&self) -> AppResult<QueueSnapshot> {
        QueueSnapshot::capture(self.store.as_ref(), self.config.recent_limit).await
    }

    /// Mark the active job as printed and start the next one.
    pub async fn complete(&self, id: JobId) -> AppResult<ActionOutcome> {
        let job = self.finish(id, JobStatus::Done, None).await?;
        info!(job_id = %id, printer = %job.printer, "Job completed");

        let dispatched = self.dispatcher.try_dispatch(job.printer).await?;
        let message = match &dispatched {
            Some(next) => format!("Job #{id} marked done. Job #{} started.", next.id),
            None => format!("Job #{id} marked done."),
        };
        self.outcome(message, Some(job), dispatched).await
    }

    /// Mark the active job as failed and start the next one.
    ///
    /// A non-blank `reason` is appended to the job's notes.
    pub async fn fail(&self, id: JobId, reason: Option<&str>) -> AppResult<ActionOutcome> {
        let reason = reason.map(str::trim).filter(|r| !r.is_empty());
        let job = self.finish(id, JobStatus::Failed, reason).await?;
        info!(job_id = %id, printer = %job.printer, reason = reason.unwrap_or(""), "Job failed by operator");

        let dispatched = self.dispatcher.try_dispatch(job.printer).await?;
        let message = match &dispatched {
            Some(next) => format!("Job #{id} marked failed. Job #{} started.", next.id),
            None => format!("Job #{id} marked failed."),
        };
        self.outcome(message, Some(job), dispatched).await
    }

    /// Remove a job that is not printing, along with its payload.
    pub async fn delete(&self, id: JobId) -> AppResult<ActionOutcome> {
        let job = self.get(id).await?;
        if job.status == JobStatus::Active {
            return Err(AppError::conflict(format!(
                "Job #{id} is printing and cannot be deleted. Complete or fail it first."
            )));
        }

        let Some(deleted) = self.store.delete_inactive(id).await? else {
            // Gone or promoted between the lookup and the delete.
            return match self.store.find_by_id(id).await? {
                None => Err(AppError::not_found(format!("Job #{id} not found"))),
                Some(_) => Err(AppError::conflict(format!(
                    "Job #{id} started printing and cannot be deleted."
                ))),
            };
        };
        info!(job_id = %id, printer = %deleted.printer, status = %deleted.status, "Job deleted");

        let mut message = format!("Job #{id} deleted.");
        if let Err(e) = self.storage.delete(&deleted.payload_ref).await {
            warn!(job_id = %id, payload = %deleted.payload_ref, error = %e, "Failed to remove payload");
            message.push_str(&format!(" The uploaded file could not be removed: {}", e.message));
        }

        let dispatched = self.dispatcher.try_dispatch(deleted.printer).await?;
        self.outcome(message, Some(deleted), dispatched).await
    }

    /// Trigger dispatch for one printer.
    pub async fn dispatch(&self, printer: PrinterType) -> AppResult<ActionOutcome> {
        let dispatched = self.dispatcher.try_dispatch(printer).await?;
        let message = match &dispatched {
            Some(job) => format!("Job #{} started on {printer}.", job.id),
            None => format!("Nothing to start on {printer}."),
        };
        self.outcome(message, None, dispatched).await
    }

    /// Trigger dispatch for every printer; used once at startup.
    pub async fn dispatch_all(&self) -> AppResult<Vec<Job>> {
        self.dispatcher.dispatch_all().await
    }

    /// Move an active job into a terminal state.
    async fn finish(&self, id: JobId, to: JobStatus, note: Option<&str>) -> AppResult<Job> {
        let job = self.get(id).await?;
        if job.status != JobStatus::Active {
            return Err(AppError::conflict(format!(
                "Job #{id} is {}; only an active job can be marked {to}.",
                job.status
            )));
        }

        self.store
            .transition(id, JobStatus::Active, to, Utc::now(), note)
            .await?
            .ok_or_else(|| AppError::conflict(format!("Job #{id} is no longer active.")))
    }

    async fn outcome(
        &self,
        message: String,
        job: Option<Job>,
        dispatched: Option<Job>,
    ) -> AppResult<ActionOutcome> {
        Ok(ActionOutcome {
            message,
            job,
            dispatched,
            snapshot: self.snapshot().await?,
        })
    }
}
