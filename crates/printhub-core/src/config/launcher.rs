//! Printer command launcher configuration.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Command templates per printer plus process limits.
///
/// Templates may reference `{file_path}`, `{file_name}` and `{job_id}`.
/// A printer without a template is a valid state: jobs dispatched to it
/// fail with a configuration diagnostic instead of crashing the server.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// Command line template keyed by printer code (`H2S`, `P1S`).
    /// Codes are matched ignoring case, so each may appear only once.
    #[serde(default)]
    #[validate(custom(function = "unique_printer_codes"))]
    pub commands: HashMap<String, String>,

    /// Seconds to wait for the command to exit (0 = wait forever).
    #[serde(default = "default_timeout_seconds")]
    #[validate(range(max = 86400))]
    pub timeout_seconds: u64,

    /// Maximum number of characters of process output kept as diagnostic.
    #[serde(default = "default_max_diagnostic_chars")]
    #[validate(range(min = 16, max = 10000))]
    pub max_diagnostic_chars: usize,

    /// Working directory for launched commands.
    #[serde(default)]
    pub working_dir: Option<String>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            commands: HashMap::new(),
            timeout_seconds: default_timeout_seconds(),
            max_diagnostic_chars: default_max_diagnostic_chars(),
            working_dir: None,
        }
    }
}

impl LauncherConfig {
    /// Look up the template for a printer code, ignoring case and blank entries.
    pub fn command_for(&self, printer_code: &str) -> Option<&str> {
        self.commands
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(printer_code))
            .map(|(_, template)| template.trim())
            .filter(|template| !template.is_empty())
    }
}

fn unique_printer_codes(commands: &HashMap<String, String>) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for code in commands.keys() {
        if !seen.insert(code.to_ascii_uppercase()) {
            let mut err = ValidationError::new("duplicate_printer_code");
            err.message = Some(format!("printer code {code} is configured more than once").into());
            return Err(err);
        }
    }
    Ok(())
}

fn default_timeout_seconds() -> u64 {
    120
}

fn default_max_diagnostic_chars() -> usize {
    500
}
