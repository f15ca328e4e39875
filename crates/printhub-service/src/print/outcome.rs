//! Result of a queue action.

use serde::Serialize;

use printhub_entity::job::Job;

use super::snapshot::QueueSnapshot;

/// What a successful action did, plus the queue state afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    /// Human-readable summary.
    pub message: String,
    /// The job the action targeted, as it stands after the action.
    pub job: Option<Job>,
    /// The job the follow-up dispatch started, if any.
    pub dispatched: Option<Job>,
    /// Queue state after the action.
    pub snapshot: QueueSnapshot,
}
