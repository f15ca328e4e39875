//! PostgreSQL job store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use tracing::debug;

use printhub_core::error::{AppError, ErrorKind};
use printhub_core::result::AppResult;
use printhub_core::types::JobId;
use printhub_entity::job::{CreateJob, Job, JobStatus, PrinterType};

use crate::store::{JobStore, PrinterJobs, clean_note, ensure_forward, stamps_for};

/// SQLSTATE for `unique_violation`, raised by `uq_print_jobs_one_active`.
const UNIQUE_VIOLATION: &str = "23505";

/// Job store backed by the `print_jobs` table.
#[derive(Debug, Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    /// Create a new job store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn create(&self, data: &CreateJob) -> AppResult<Job> {
        sqlx::query_as::<_, Job>(
            "INSERT INTO print_jobs (printer, file_name, payload_ref, owner_ref, notes, status, submitted_at) \
             VALUES ($1, $2, $3, $4, $5, 'queued', NOW()) RETURNING *",
        )
        .bind(data.printer)
        .bind(&data.file_name)
        .bind(&data.payload_ref)
        .bind(&data.owner_ref)
        .bind(clean_note(data.notes.as_deref()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create job", e))
    }

    async fn find_by_id(&self, id: JobId) -> AppResult<Option<Job>> {
        sqlx::query_as::<_, Job>("SELECT * FROM print_jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find job", e))
    }

    async fn find_active(&self, printer: PrinterType) -> AppResult<Option<Job>> {
        select_active(&self.pool, printer).await
    }

    async fn find_oldest_queued(&self, printer: PrinterType) -> AppResult<Option<Job>> {
        sqlx::query_as::<_, Job>(
            "SELECT * FROM print_jobs WHERE printer = $1 AND status = 'queued' \
             ORDER BY submitted_at ASC, id ASC LIMIT 1",
        )
        .bind(printer)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find queued job", e))
    }

    async fn list_queued(&self, printer: PrinterType) -> AppResult<Vec<Job>> {
        select_queued(&self.pool, printer).await
    }

    async fn list_recent_terminal(
        &self,
        printer: PrinterType,
        limit: usize,
    ) -> AppResult<Vec<Job>> {
        select_recent(&self.pool, printer, limit).await
    }

    async fn printer_queue(
        &self,
        printer: PrinterType,
        recent_limit: usize,
    ) -> AppResult<PrinterJobs> {
        let snapshot_err = |e: sqlx::Error| {
            AppError::with_source(ErrorKind::Database, "Failed to read printer queue", e)
        };

        let mut tx = self.pool.begin().await.map_err(snapshot_err)?;
        // All three selects see the same snapshot.
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(snapshot_err)?;

        let jobs = PrinterJobs {
            active: select_active(&mut *tx, printer).await?,
            queued: select_queued(&mut *tx, printer).await?,
            recent: select_recent(&mut *tx, printer, recent_limit).await?,
        };
        tx.commit().await.map_err(snapshot_err)?;
        Ok(jobs)
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
        let (started_at, completed_at) = stamps_for(to, at);

        let result = sqlx::query_as::<_, Job>(
            "UPDATE print_jobs SET status = $3, \
                started_at = COALESCE($4, started_at), \
                completed_at = COALESCE($5, completed_at), \
                notes = CASE \
                    WHEN $6::TEXT IS NULL THEN notes \
                    WHEN notes IS NULL OR notes = '' THEN $6 \
                    ELSE notes || E'\\n' || $6 END \
             WHERE id = $1 AND status = $2 \
               AND (NOT $7 OR NOT EXISTS ( \
                    SELECT 1 FROM print_jobs other \
                    WHERE other.printer = print_jobs.printer AND other.status = 'active')) \
             RETURNING *",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(started_at)
        .bind(completed_at)
        .bind(clean_note(note))
        .bind(to == JobStatus::Active)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(job) => Ok(job),
            // Another process promoted a job for this printer between our
            // check and the update; the partial unique index caught it.
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                debug!(job_id = %id, "Promotion lost to a concurrent dispatcher");
                Ok(None)
            }
            Err(e) => Err(AppError::with_source(
                ErrorKind::Database,
                format!("Failed to move job {id} from {from} to {to}"),
                e,
            )),
        }
    }

    async fn delete_inactive(&self, id: JobId) -> AppResult<Option<Job>> {
        sqlx::query_as::<_, Job>(
            "DELETE FROM print_jobs WHERE id = $1 AND status <> 'active' RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete job", e))
    }
}

async fn select_active<'e>(
    executor: impl PgExecutor<'e>,
    printer: PrinterType,
) -> AppResult<Option<Job>> {
    sqlx::query_as::<_, Job>(
        "SELECT * FROM print_jobs WHERE printer = $1 AND status = 'active' LIMIT 1",
    )
    .bind(printer)
    .fetch_optional(executor)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find active job", e))
}

async fn select_queued<'e>(
    executor: impl PgExecutor<'e>,
    printer: PrinterType,
) -> AppResult<Vec<Job>> {
    sqlx::query_as::<_, Job>(
        "SELECT * FROM print_jobs WHERE printer = $1 AND status = 'queued' \
         ORDER BY submitted_at ASC, id ASC",
    )
    .bind(printer)
    .fetch_all(executor)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list queued jobs", e))
}

async fn select_recent<'e>(
    executor: impl PgExecutor<'e>,
    printer: PrinterType,
    limit: usize,
) -> AppResult<Vec<Job>> {
    sqlx::query_as::<_, Job>(
        "SELECT * FROM print_jobs WHERE printer = $1 AND status IN ('done', 'failed') \
         ORDER BY completed_at DESC NULLS LAST, id DESC LIMIT $2",
    )
    .bind(printer)
    .bind(i64::try_from(limit).unwrap_or(i64::MAX))
    .fetch_all(executor)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list finished jobs", e))
}
