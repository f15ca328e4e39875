//! Core traits defined in `printhub-core` and implemented by other crates.

pub mod storage;

pub use storage::StorageProvider;
