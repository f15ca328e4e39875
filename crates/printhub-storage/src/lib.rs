//! # printhub-storage
//!
//! Payload storage for uploaded print files. Jobs keep only the reference
//! returned by [`payload_key`]; providers map references to bytes.

pub mod payload;
pub mod providers;

pub use payload::payload_key;
pub use providers::local::LocalStorageProvider;
