//! PostgreSQL repository implementations.

pub mod job;

pub use job::PgJobStore;
