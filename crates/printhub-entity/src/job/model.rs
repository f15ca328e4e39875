//! Print job entity model.

use chrono::{DateTime, Utc};
use printhub_core::types::JobId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::printer::PrinterType;
use super::status::JobStatus;

/// A print job bound to exactly one printer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Job {
    /// Store-assigned identifier; increases with every insert.
    pub id: JobId,
    /// Printer this job runs on.
    pub printer: PrinterType,
    /// Original upload name.
    pub file_name: String,
    /// Opaque payload storage reference owned by this job.
    pub payload_ref: String,
    /// Member who submitted the job.
    pub owner_ref: String,
    /// Current status.
    pub status: JobStatus,
    /// Append-only notes: submitter remarks followed by failure reasons.
    pub notes: Option<String>,
    /// When the job was submitted.
    pub submitted_at: DateTime<Utc>,
    /// When the job became active.
    pub started_at: Option<DateTime<Utc>>,
    /// When the job reached `done` or `failed`.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Key that totally orders queued jobs of one printer.
    pub fn queue_key(&self) -> (DateTime<Utc>, JobId) {
        (self.submitted_at, self.id)
    }

    /// Wall time spent active, if the job has both timestamps.
    pub fn run_duration(&self) -> Option<chrono::Duration> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}

/// Data required to create a new queued job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJob {
    /// Target printer.
    pub printer: PrinterType,
    /// Original upload name.
    pub file_name: String,
    /// Payload storage reference.
    pub payload_ref: String,
    /// Submitting member.
    pub owner_ref: String,
    /// Optional submitter remarks.
    pub notes: Option<String>,
}

/// Append one line to a notes field without touching earlier entries.
pub fn append_note(existing: Option<&str>, note: &str) -> Option<String> {
    let note = note.trim();
    match (existing.filter(|s| !s.is_empty()), note.is_empty()) {
        (None, true) => None,
        (Some(prev), true) => Some(prev.to_string()),
        (None, false) => Some(note.to_string()),
        (Some(prev), false) => Some(format!("{prev}\n{note}")),
    }
}
