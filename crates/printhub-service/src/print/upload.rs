//! Job submission.

use bytes::Bytes;
use tracing::{info, warn};

use printhub_core::error::AppError;
use printhub_core::result::AppResult;
use printhub_entity::job::{CreateJob, JobStatus, PrinterType};
use printhub_storage::payload_key;

use super::outcome::ActionOutcome;
use super::service::PrintQueueService;

/// A new print job as received from a transport.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    /// Printer code, matched case-insensitively.
    pub printer: String,
    /// Submitting member.
    pub owner_ref: String,
    /// Original upload name.
    pub file_name: String,
    /// File contents.
    pub data: Bytes,
    /// Optional remarks from the submitter.
    pub notes: Option<String>,
}

/// Submission after validation.
struct ValidSubmission {
    printer: PrinterType,
    owner_ref: String,
    file_name: String,
    notes: Option<String>,
}

impl PrintQueueService {
    /// Store the upload, queue the job, and try to start it.
    pub async fn submit(&self, request: SubmitRequest) -> AppResult<ActionOutcome> {
        let valid = self.validate(&request)?;
        let payload_ref = payload_key(&valid.file_name);

        self.storage.write(&payload_ref, request.data).await?;

        let created = self
            .store
            .create(&CreateJob {
                printer: valid.printer,
                file_name: valid.file_name,
                payload_ref: payload_ref.clone(),
                owner_ref: valid.owner_ref,
                notes: valid.notes,
            })
            .await;
        let job = match created {
            Ok(job) => job,
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&payload_ref).await {
                    warn!(payload = %payload_ref, error = %cleanup, "Failed to remove orphaned payload");
                }
                return Err(e);
            }
        };
        info!(
            job_id = %job.id,
            printer = %job.printer,
            owner = %job.owner_ref,
            file = %job.file_name,
            "Job submitted"
        );

        let dispatched = self.dispatcher.try_dispatch(job.printer).await?;
        let job = self.store.find_by_id(job.id).await?.unwrap_or(job);
        let snapshot = self.snapshot().await?;

        let message = match job.status {
            JobStatus::Active => format!("Job #{} is printing on {}.", job.id, job.printer),
            JobStatus::Queued => {
                let position = snapshot
                    .printer(job.printer)
                    .and_then(|queue| queue.position_of(job.id))
                    .unwrap_or(1);
                format!(
                    "Job #{} queued for {} at position {position}.",
                    job.id, job.printer
                )
            }
            JobStatus::Failed => format!(
                "Job #{} could not be started on {} and was marked failed.",
                job.id, job.printer
            ),
            JobStatus::Done => format!("Job #{} is already done.", job.id),
        };

        Ok(ActionOutcome {
            message,
            job: Some(job),
            dispatched,
            snapshot,
        })
    }

    fn validate(&self, request: &SubmitRequest) -> AppResult<ValidSubmission> {
        let printer: PrinterType = request.printer.parse().map_err(AppError::validation)?;

        let owner_ref = request.owner_ref.trim();
        if owner_ref.is_empty() {
            return Err(AppError::validation("Please choose who is submitting the job."));
        }

        let file_name = request.file_name.trim();
        if file_name.is_empty() || request.data.is_empty() {
            return Err(AppError::validation("Please attach a print file."));
        }
        if !self.config.accepts_file_name(file_name) {
            return Err(AppError::validation(format!(
                "Unsupported file type for '{file_name}'. Allowed: {}",
                self.config.allowed_extensions.join(", ")
            )));
        }
        if request.data.len() as u64 > self.config.max_upload_bytes {
            return Err(AppError::validation(format!(
                "File is too large ({} bytes, limit {} bytes).",
                request.data.len(),
                self.config.max_upload_bytes
            )));
        }

        Ok(ValidSubmission {
            printer,
            owner_ref: owner_ref.to_string(),
            file_name: file_name.to_string(),
            notes: request
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        })
    }
}
