//! Queue and submission configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Settings for job submission and queue snapshots.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Number of finished jobs shown per printer in a snapshot.
    #[serde(default = "default_recent_limit")]
    #[validate(range(min = 1, max = 100))]
    pub recent_limit: usize,

    /// Accepted upload extensions, lowercase without the dot.
    #[serde(default = "default_allowed_extensions")]
    #[validate(length(min = 1))]
    pub allowed_extensions: Vec<String>,

    /// Maximum upload size in bytes (default 200 MB).
    #[serde(default = "default_max_upload_bytes")]
    #[validate(range(min = 1))]
    pub max_upload_bytes: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
            allowed_extensions: default_allowed_extensions(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl QueueConfig {
    /// Whether a file name carries one of the allowed extensions.
    pub fn accepts_file_name(&self, file_name: &str) -> bool {
        let Some((_, ext)) = file_name.rsplit_once('.') else {
            return false;
        };
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}

fn default_recent_limit() -> usize {
    8
}

fn default_allowed_extensions() -> Vec<String> {
    vec!["3mf".to_string(), "gcode".to_string()]
}

fn default_max_upload_bytes() -> u64 {
    209_715_200 // 200 MB
}
