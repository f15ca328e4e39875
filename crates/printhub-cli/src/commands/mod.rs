//! CLI command definitions and dispatch.

pub mod job;
pub mod queue;

use clap::{Parser, Subcommand};

use printhub_core::config::AppConfig;
use printhub_core::error::AppError;
use printhub_service::PrintQueueService;

use crate::output::OutputFormat;

/// PrintHub: shared 3D printer queue
#[derive(Debug, Parser)]
#[command(name = "printhub", version, about, long_about = None)]
pub struct Cli {
    /// Explicit configuration file (overrides the environment layering)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Configuration environment overlay (`config/{env}.toml`)
    #[arg(short, long, env = "PRINTHUB_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Queue inspection and manual dispatch
    Queue(queue::QueueArgs),
    /// Single job actions
    Job(job::JobArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = self.load_config()?;
        let service = connect(&config).await?;
        match &self.command {
            Commands::Queue(args) => queue::execute(args, &service, self.format).await,
            Commands::Job(args) => job::execute(args, &service, self.format).await,
        }
    }

    fn load_config(&self) -> Result<AppConfig, AppError> {
        match &self.config {
            Some(path) => AppConfig::from_file(path),
            None => AppConfig::load(&self.env),
        }
    }
}

/// Helper: build the queue service against the shared job store
async fn connect(config: &AppConfig) -> Result<PrintQueueService, AppError> {
    if config.database.is_memory() {
        return Err(AppError::configuration(
            "database.url is 'memory'; the CLI needs the PostgreSQL store the server uses",
        ));
    }
    PrintQueueService::from_config(config).await
}
