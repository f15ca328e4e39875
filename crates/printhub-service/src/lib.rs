//! # printhub-service
//!
//! Print queue use cases. [`PrintQueueService`] is the single interface the
//! HTTP API, the CLI, and the server bootstrap talk to; it validates input,
//! mutates the job store, and triggers dispatch at the defined points.
//!
//! Services follow constructor injection: all dependencies are provided at
//! construction time via `Arc` references.

pub mod print;

pub use print::{ActionOutcome, PrintQueueService, PrinterQueue, QueueSnapshot, SubmitRequest};
