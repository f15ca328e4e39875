//! Print queue services: submission, lifecycle actions, snapshots.

pub mod outcome;
pub mod service;
pub mod snapshot;
pub mod upload;

pub use outcome::ActionOutcome;
pub use service::PrintQueueService;
pub use snapshot::{PrinterQueue, QueueSnapshot};
pub use upload::SubmitRequest;
