//! PostgreSQL pool setup for the job store.

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::info;

use printhub_core::config::DatabaseConfig;
use printhub_core::error::{AppError, ErrorKind};
use printhub_core::result::AppResult;

/// Connect to PostgreSQL and bring the `print_jobs` schema up to date.
pub async fn open(config: &DatabaseConfig) -> AppResult<PgPool> {
    let options = connect_options(&config.url)?;
    let target = describe(&options);
    info!(
        target_db = %target,
        max_connections = config.max_connections,
        "Connecting to job database"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
        .connect_with(options)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to connect to job database {target}"),
                e,
            )
        })?;

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to migrate job database", e)
        })?;

    info!(target_db = %target, "Job database ready");
    Ok(pool)
}

/// Parse the configured URL. A malformed URL is a configuration mistake.
fn connect_options(url: &str) -> AppResult<PgConnectOptions> {
    PgConnectOptions::from_str(url).map_err(|e| {
        AppError::with_source(
            ErrorKind::Configuration,
            "database.url is not a valid PostgreSQL URL",
            e,
        )
    })
}

/// `host:port/database` for logs; credentials never leave the options.
fn describe(options: &PgConnectOptions) -> String {
    format!(
        "{}:{}/{}",
        options.get_host(),
        options.get_port(),
        options.get_database().unwrap_or("-")
    )
}
