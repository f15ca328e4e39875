//! Payload storage configuration.

use serde::{Deserialize, Serialize};

/// Local filesystem storage for uploaded print files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory that payload references are resolved against.
    #[serde(default = "default_root_path")]
    pub root_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
        }
    }
}

fn default_root_path() -> String {
    "./data/uploads".to_string()
}
