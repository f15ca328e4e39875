//! Job store trait consumed by the dispatcher and the queue service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use printhub_core::error::AppError;
use printhub_core::result::AppResult;
use printhub_core::types::JobId;
use printhub_entity::job::{CreateJob, Job, JobStatus, PrinterType};

/// Everything one printer's queue view needs, read at a single point in time.
#[derive(Debug, Clone, Default)]
pub struct PrinterJobs {
    /// The job currently printing.
    pub active: Option<Job>,
    /// Waiting jobs in dispatch order.
    pub queued: Vec<Job>,
    /// Most recently finished jobs, newest completion first.
    pub recent: Vec<Job>,
}

/// Durable mapping from job id to job record.
///
/// Status changes go through [`JobStore::transition`], a compare-and-set on
/// the current status. Promotion into `active` additionally refuses while any
/// other job of the same printer is active, so the single-active invariant
/// holds even if two dispatchers race.
#[async_trait]
pub trait JobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a new job in `queued` and return it with its assigned id.
    async fn create(&self, data: &CreateJob) -> AppResult<Job>;

    /// Find a job by id.
    async fn find_by_id(&self, id: JobId) -> AppResult<Option<Job>>;

    /// The active job of a printer, if any.
    async fn find_active(&self, printer: PrinterType) -> AppResult<Option<Job>>;

    /// The queued job with the smallest `(submitted_at, id)`.
    async fn find_oldest_queued(&self, printer: PrinterType) -> AppResult<Option<Job>>;

    /// All queued jobs of a printer in dispatch order.
    async fn list_queued(&self, printer: PrinterType) -> AppResult<Vec<Job>>;

    /// The most recently finished jobs, newest completion first.
    async fn list_recent_terminal(
        &self,
        printer: PrinterType,
        limit: usize,
    ) -> AppResult<Vec<Job>>;

    /// Active, queued and recently finished jobs of a printer as one
    /// consistent read. A job moving between states while this runs shows
    /// up exactly once.
    async fn printer_queue(
        &self,
        printer: PrinterType,
        recent_limit: usize,
    ) -> AppResult<PrinterJobs>;

    /// Move a job from `from` to `to` if it is still in `from`.
    ///
    /// Stamps `started_at` when entering `active` and `completed_at` when
    /// entering a terminal state, and appends `note` to the job's notes.
    /// Returns `None` when the job is missing, no longer in `from`, or (for
    /// promotions) its printer already has an active job.
    async fn transition(
        &self,
        id: JobId,
        from: JobStatus,
        to: JobStatus,
        at: DateTime<Utc>,
        note: Option<&str>,
    ) -> AppResult<Option<Job>>;

    /// Delete a job unless it is active. Returns the deleted record.
    async fn delete_inactive(&self, id: JobId) -> AppResult<Option<Job>>;
}

/// Reject transitions that would move a job backwards.
pub(crate) fn ensure_forward(id: JobId, from: JobStatus, to: JobStatus) -> AppResult<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(AppError::internal(format!(
            "Illegal status transition for job {id}: {from} -> {to}"
        )))
    }
}

/// Timestamps a transition into `to` writes.
pub(crate) fn stamps_for(
    to: JobStatus,
    at: DateTime<Utc>,
) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    match to {
        JobStatus::Active => (Some(at), None),
        JobStatus::Done | JobStatus::Failed => (None, Some(at)),
        JobStatus::Queued => (None, None),
    }
}

/// Normalize an optional note: blank notes are not appended.
pub(crate) fn clean_note(note: Option<&str>) -> Option<&str> {
    note.map(str::trim).filter(|n| !n.is_empty())
}
