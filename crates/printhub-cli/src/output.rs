//! Table and JSON output formatting for CLI commands.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::{Table, Tabled};

use printhub_entity::job::Job;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// One job as a table row.
#[derive(Debug, Serialize, Tabled)]
pub struct JobRow {
    /// Job id
    #[tabled(rename = "ID")]
    pub id: i64,
    /// Status
    #[tabled(rename = "Status")]
    pub status: String,
    /// Upload name
    #[tabled(rename = "File")]
    pub file_name: String,
    /// Submitter
    #[tabled(rename = "Owner")]
    pub owner: String,
    /// Submission time
    #[tabled(rename = "Submitted")]
    pub submitted: String,
    /// Start or finish time, whichever is latest
    #[tabled(rename = "Updated")]
    pub updated: String,
}

impl From<&Job> for JobRow {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id.into_inner(),
            status: job.status.to_string(),
            file_name: job.file_name.clone(),
            owner: job.owner_ref.clone(),
            submitted: timestamp(Some(job.submitted_at)),
            updated: timestamp(job.completed_at.or(job.started_at)),
        }
    }
}

fn timestamp(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("  (no jobs)");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string());
            println!("{json}");
        }
    }
}

/// Print a single item in the selected format
pub fn print_item<T: Serialize + std::fmt::Debug>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{item:#?}"),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(item).unwrap_or_else(|_| "{}".to_string());
            println!("{json}");
        }
    }
}

/// Print every field of a job as key-value pairs
pub fn print_job(job: &Job) {
    println!("Job #{}:", job.id);
    print_kv("Printer", job.printer.as_str());
    print_kv("Status", job.status.as_str());
    print_kv("File", &job.file_name);
    print_kv("Owner", &job.owner_ref);
    print_kv("Submitted", &timestamp(Some(job.submitted_at)));
    print_kv("Started", &timestamp(job.started_at));
    print_kv("Completed", &timestamp(job.completed_at));
    if let Some(duration) = job.run_duration() {
        print_kv("Run time", &format!("{} min", duration.num_minutes()));
    }
    if let Some(notes) = &job.notes {
        println!("  Notes:");
        for line in notes.lines() {
            println!("    {line}");
        }
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{key}:"), value);
}
