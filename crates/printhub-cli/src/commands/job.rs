//! Job CLI commands.

use clap::{Args, Subcommand};

use printhub_core::error::AppError;
use printhub_core::types::JobId;
use printhub_service::{ActionOutcome, PrintQueueService};

use crate::output::{self, OutputFormat};

/// Arguments for job commands
#[derive(Debug, Args)]
pub struct JobArgs {
    /// Job subcommand
    #[command(subcommand)]
    pub command: JobCommand,
}

/// Job subcommands
#[derive(Debug, Subcommand)]
pub enum JobCommand {
    /// Show a job
    Show {
        /// Job id
        id: JobId,
    },
    /// Mark the active job as printed
    Complete {
        /// Job id
        id: JobId,
    },
    /// Mark the active job as failed
    Fail {
        /// Job id
        id: JobId,
        /// Reason appended to the job's notes
        #[arg(short, long)]
        reason: Option<String>,
    },
    /// Delete a job that is not printing
    Delete {
        /// Job id
        id: JobId,
    },
}

/// Execute job commands
pub async fn execute(
    args: &JobArgs,
    service: &PrintQueueService,
    format: OutputFormat,
) -> Result<(), AppError> {
    let outcome = match &args.command {
        JobCommand::Show { id } => {
            let job = service.get(*id).await?;
            match format {
                OutputFormat::Json => output::print_item(&job, format),
                OutputFormat::Table => output::print_job(&job),
            }
            return Ok(());
        }
        JobCommand::Complete { id } => service.complete(*id).await?,
        JobCommand::Fail { id, reason } => service.fail(*id, reason.as_deref()).await?,
        JobCommand::Delete { id } => service.delete(*id).await?,
    };

    report(&outcome, format);
    Ok(())
}

fn report(outcome: &ActionOutcome, format: OutputFormat) {
    match format {
        OutputFormat::Json => output::print_item(outcome, format),
        OutputFormat::Table => {
            output::print_success(&outcome.message);
            if let Some(next) = &outcome.dispatched {
                output::print_kv("Now printing", &format!("#{} {}", next.id, next.file_name));
            }
        }
    }
}
