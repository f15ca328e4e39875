//! Core type definitions used across the PrintHub workspace.

pub mod id;

pub use id::JobId;
