//! In-memory job store.
//!
//! Used for single-node deployments without PostgreSQL and by tests. Every
//! operation takes the state lock once, so each call is atomic with respect
//! to every other call.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use printhub_core::result::AppResult;
use printhub_core::types::JobId;
use printhub_entity::job::{CreateJob, Job, JobStatus, PrinterType, append_note};

use crate::store::{JobStore, PrinterJobs, clean_note, ensure_forward, stamps_for};

#[derive(Debug, Default)]
struct MemoryState {
    jobs: BTreeMap<JobId, Job>,
    last_id: i64,
}

impl MemoryState {
    fn of_printer(&self, printer: PrinterType) -> impl Iterator<Item = &Job> {
        self.jobs.values().filter(move |job| job.printer == printer)
    }

    fn has_active(&self, printer: PrinterType) -> bool {
        self.of_printer(printer)
            .any(|job| job.status == JobStatus::Active)
    }

    fn active(&self, printer: PrinterType) -> Option<Job> {
        self.of_printer(printer)
            .find(|job| job.status == JobStatus::Active)
            .cloned()
    }

    fn queued(&self, printer: PrinterType) -> Vec<Job> {
        let mut queued: Vec<Job> = self
            .of_printer(printer)
            .filter(|job| job.status == JobStatus::Queued)
            .cloned()
            .collect();
        queued.sort_by_key(Job::queue_key);
        queued
    }

    fn recent(&self, printer: PrinterType, limit: usize) -> Vec<Job> {
        let mut finished: Vec<Job> = self
            .of_printer(printer)
            .filter(|job| job.status.is_terminal())
            .cloned()
            .collect();
        finished.sort_by(|a, b| {
            b.completed_at
                .cmp(&a.completed_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        finished.truncate(limit);
        finished
    }

    fn insert(&mut self, data: &CreateJob, submitted_at: DateTime<Utc>) -> Job {
        self.last_id += 1;
        let job = Job {
            id: JobId(self.last_id),
            printer: data.printer,
            file_name: data.file_name.clone(),
            payload_ref: data.payload_ref.clone(),
            owner_ref: data.owner_ref.clone(),
            status: JobStatus::Queued,
            notes: clean_note(data.notes.as_deref()).map(str::to_string),
            submitted_at,
            started_at: None,
            completed_at: None,
        };
        self.jobs.insert(job.id, job.clone());
        job
    }
}

/// Job store kept in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryJobStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryJobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every job currently stored, in id order.
    pub async fn all(&self) -> Vec<Job> {
        self.state.read().await.jobs.values().cloned().collect()
    }

    /// Insert a job with an explicit submission time.
    pub async fn create_at(&self, data: &CreateJob, submitted_at: DateTime<Utc>) -> Job {
        self.state.write().await.insert(data, submitted_at)
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create(&self, data: &CreateJob) -> AppResult<Job> {
        // Stamp under the lock so submission time never disagrees with id order.
        let mut state = self.state.write().await;
        Ok(state.insert(data, Utc::now()))
    }

    async fn find_by_id(&self, id: JobId) -> AppResult<Option<Job>> {
        Ok(self.state.read().await.jobs.get(&id).cloned())
    }

    async fn find_active(&self, printer: PrinterType) -> AppResult<Option<Job>> {
        Ok(self.state.read().await.active(printer))
    }

    async fn find_oldest_queued(&self, printer: PrinterType) -> AppResult<Option<Job>> {
        let state = self.state.read().await;
        Ok(state
            .of_printer(printer)
            .filter(|job| job.status == JobStatus::Queued)
            .min_by_key(|job| job.queue_key())
            .cloned())
    }

    async fn list_queued(&self, printer: PrinterType) -> AppResult<Vec<Job>> {
        Ok(self.state.read().await.queued(printer))
    }

    async fn list_recent_terminal(
        &self,
        printer: PrinterType,
        limit: usize,
    ) -> AppResult<Vec<Job>> {
        Ok(self.state.read().await.recent(printer, limit))
    }

    async fn printer_queue(
        &self,
        printer: PrinterType,
        recent_limit: usize,
    ) -> AppResult<PrinterJobs> {
        let state = self.state.read().await;
        Ok(PrinterJobs {
            active: state.active(printer),
            queued: state.queued(printer),
            recent: state.recent(printer, recent_limit),
        })
    }

    async fn transition(
        &self,
        id: JobId,
        from: JobStatus,
        to: JobStatus,
        at: DateTime<Utc>,
        note: Option<&str>,
    ) -> AppResult<Option<Job>> {
        ensure_forward(id, from, to)?;
        let mut state = self.state.write().await;

        let Some(printer) = state
            .jobs
            .get(&id)
            .filter(|job| job.status == from)
            .map(|job| job.printer)
        else {
            return Ok(None);
        };
        if to == JobStatus::Active && state.has_active(printer) {
            return Ok(None);
        }

        let (started_at, completed_at) = stamps_for(to, at);
        let Some(job) = state.jobs.get_mut(&id) else {
            return Ok(None);
        };
        job.status = to;
        job.started_at = started_at.or(job.started_at);
        job.completed_at = completed_at.or(job.completed_at);
        if let Some(note) = clean_note(note) {
            job.notes = append_note(job.notes.as_deref(), note);
        }
        Ok(Some(job.clone()))
    }

    async fn delete_inactive(&self, id: JobId) -> AppResult<Option<Job>> {
        let mut state = self.state.write().await;
        match state.jobs.get(&id) {
            Some(job) if job.status.is_deletable() => Ok(state.jobs.remove(&id)),
            _ => Ok(None),
        }
    }
}
