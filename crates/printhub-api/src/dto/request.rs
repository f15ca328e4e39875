//! Request DTOs.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/jobs/{id}/fail`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FailJobRequest {
    /// Why the print failed; appended to the job's notes.
    #[serde(default)]
    pub reason: Option<String>,
}
