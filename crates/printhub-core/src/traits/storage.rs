//! Storage provider trait for uploaded print files.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Trait for payload storage backends.
///
/// Jobs only hold the opaque reference passed to [`StorageProvider::write`];
/// the provider is the single place that knows how it maps to bytes.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Write bytes under the given reference.
    async fn write(&self, path: &str, data: Bytes) -> AppResult<()>;

    /// Delete the payload stored under the given reference.
    async fn delete(&self, path: &str) -> AppResult<()>;

    /// Check whether a payload exists.
    async fn exists(&self, path: &str) -> AppResult<bool>;

    /// Filesystem path external commands can open for this reference.
    fn local_path(&self, path: &str) -> PathBuf;
}
