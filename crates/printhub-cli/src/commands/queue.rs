//! Queue CLI commands.

use clap::{Args, Subcommand};

use printhub_core::error::AppError;
use printhub_entity::job::PrinterType;
use printhub_service::PrintQueueService;

use crate::output::{self, JobRow, OutputFormat};

/// Arguments for queue commands
#[derive(Debug, Args)]
pub struct QueueArgs {
    /// Queue subcommand
    #[command(subcommand)]
    pub command: QueueCommand,
}

/// Queue subcommands
#[derive(Debug, Subcommand)]
pub enum QueueCommand {
    /// Show active, waiting, and recently finished jobs per printer
    Status,
    /// Start the next queued job on an idle printer
    Dispatch {
        /// Printer code (H2S, P1S)
        printer: String,
    },
}

/// Execute queue commands
pub async fn execute(
    args: &QueueArgs,
    service: &PrintQueueService,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        QueueCommand::Status => {
            let snapshot = service.snapshot().await?;
            if format == OutputFormat::Json {
                output::print_item(&snapshot, format);
                return Ok(());
            }

            for queue in &snapshot.printers {
                println!("{}:", queue.printer);
                let rows: Vec<JobRow> = queue
                    .active
                    .iter()
                    .chain(&queue.queued)
                    .chain(&queue.recent)
                    .map(JobRow::from)
                    .collect();
                output::print_list(&rows, format);
                println!();
            }
        }
        QueueCommand::Dispatch { printer } => {
            let printer: PrinterType = printer.parse().map_err(AppError::validation)?;
            let outcome = service.dispatch(printer).await?;
            output::print_success(&outcome.message);
        }
    }

    Ok(())
}
