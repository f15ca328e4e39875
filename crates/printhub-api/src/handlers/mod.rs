//! Route handlers.

pub mod health;
pub mod jobs;
pub mod queue;
