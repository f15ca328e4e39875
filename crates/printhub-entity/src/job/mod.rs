//! Print job domain entities.

pub mod model;
pub mod printer;
pub mod status;

pub use model::{CreateJob, Job, append_note};
pub use printer::PrinterType;
pub use status::JobStatus;
