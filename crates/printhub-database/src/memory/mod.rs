//! In-process job store.

pub mod job;

pub use job::MemoryJobStore;
