//! Printer command launcher.
//!
//! Runs the configured command for a printer as a child process and
//! classifies the outcome. Every failure mode is a [`LaunchError`]; the
//! dispatcher records it on the job instead of propagating it.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

use printhub_core::config::LauncherConfig;
use printhub_core::types::JobId;
use printhub_entity::job::PrinterType;

use crate::template;

/// Everything a launcher needs to start one job.
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    /// Job being launched.
    pub job_id: JobId,
    /// Printer the job runs on.
    pub printer: PrinterType,
    /// Absolute path of the stored payload.
    pub file_path: PathBuf,
    /// Original upload name.
    pub file_name: String,
}

/// Details of a successful launch.
#[derive(Debug, Clone, Serialize)]
pub struct LaunchReport {
    /// Program that was executed.
    pub program: String,
    /// Exit code reported by the process.
    pub exit_code: Option<i32>,
    /// Wall time until the process exited.
    pub duration_ms: u64,
}

/// Why a launch did not succeed.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// No command template exists for the printer.
    #[error("no launch command configured for printer {0}")]
    NotConfigured(PrinterType),

    /// The template could not be parsed into arguments.
    #[error("invalid launch command for printer {printer}: {reason}")]
    InvalidTemplate {
        /// Printer whose template is broken.
        printer: PrinterType,
        /// Parser message.
        reason: String,
    },

    /// The process could not be started.
    #[error("could not start '{program}': {reason}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Operating system message.
        reason: String,
    },

    /// The process did not exit in time and was killed.
    #[error("launch command timed out after {0} seconds")]
    Timeout(u64),

    /// The process exited unsuccessfully.
    #[error("launch command exited with code {code}: {output}")]
    NonZeroExit {
        /// Exit code, or -1 when terminated by a signal.
        code: i32,
        /// Bounded stderr (or stdout when stderr is empty).
        output: String,
    },
}

impl LaunchError {
    /// Line appended to the job's notes.
    pub fn diagnostic(&self) -> String {
        format!("launch failed: {self}")
    }
}

/// Starts a print for a job.
#[async_trait]
pub trait Launcher: Send + Sync + std::fmt::Debug + 'static {
    /// Launch the job and wait for the command to finish.
    async fn launch(&self, request: &LaunchRequest) -> Result<LaunchReport, LaunchError>;
}

/// Launcher running the per-printer command template from configuration.
#[derive(Debug, Clone)]
pub struct CommandLauncher {
    config: Arc<LauncherConfig>,
}

impl CommandLauncher {
    /// Create a launcher over a configuration snapshot.
    pub fn new(config: Arc<LauncherConfig>) -> Self {
        Self { config }
    }

    /// Build the argv for a request without running anything.
    pub fn command_line(&self, request: &LaunchRequest) -> Result<Vec<String>, LaunchError> {
        let printer = request.printer;
        let template = self
            .config
            .command_for(printer.as_str())
            .ok_or(LaunchError::NotConfigured(printer))?;

        let words = template::split(template)
            .map_err(|reason| LaunchError::InvalidTemplate { printer, reason })?;
        if words.is_empty() {
            return Err(LaunchError::NotConfigured(printer));
        }

        let file_path = request.file_path.to_string_lossy();
        let job_id = request.job_id.to_string();
        let vars = [
            ("file_path", file_path.as_ref()),
            ("file_name", request.file_name.as_str()),
            ("job_id", job_id.as_str()),
        ];
        Ok(words
            .iter()
            .map(|word| template::expand(word, &vars))
            .collect())
    }

    /// Trim and bound process output for storage in job notes.
    fn bounded(&self, stdout: &[u8], stderr: &[u8]) -> String {
        let stderr = String::from_utf8_lossy(stderr);
        let stdout = String::from_utf8_lossy(stdout);
        let text = match stderr.trim() {
            "" => stdout.trim(),
            err => err,
        };
        if text.is_empty() {
            return "(no output)".to_string();
        }
        text.chars().take(self.config.max_diagnostic_chars).collect()
    }
}

#[async_trait]
impl Launcher for CommandLauncher {
    async fn launch(&self, request: &LaunchRequest) -> Result<LaunchReport, LaunchError> {
        let argv = self.command_line(request)?;
        let (program, args) = argv
            .split_first()
            .ok_or(LaunchError::NotConfigured(request.printer))?;

        info!(
            job_id = %request.job_id,
            printer = %request.printer,
            program = %program,
            "Launching print command"
        );

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.config.working_dir {
            cmd.current_dir(dir);
        }

        let start = Instant::now();
        let output = match self.config.timeout_seconds {
            0 => cmd.output().await,
            secs => tokio::time::timeout(Duration::from_secs(secs), cmd.output())
                .await
                .map_err(|_| LaunchError::Timeout(secs))?,
        }
        .map_err(|e| LaunchError::Spawn {
            program: program.clone(),
            reason: e.to_string(),
        })?;
        let duration_ms = start.elapsed().as_millis() as u64;

        if !output.status.success() {
            return Err(LaunchError::NonZeroExit {
                code: output.status.code().unwrap_or(-1),
                output: self.bounded(&output.stdout, &output.stderr),
            });
        }

        debug!(job_id = %request.job_id, duration_ms, "Print command exited cleanly");
        Ok(LaunchReport {
            program: program.clone(),
            exit_code: output.status.code(),
            duration_ms,
        })
    }
}
