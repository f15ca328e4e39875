//! PrintHub Server: shared 3D printer queue.
//!
//! Main entry point that wires all crates together and starts the server.

use std::future::IntoFuture;
use std::sync::Arc;

use tokio::sync::Notify;
use tracing_subscriber::{EnvFilter, fmt};

use printhub_api::{AppState, build_router};
use printhub_core::config::AppConfig;
use printhub_core::error::AppError;
use printhub_service::PrintQueueService;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    match std::env::var("PRINTHUB_CONFIG") {
        Ok(path) => AppConfig::from_file(&path),
        Err(_) => {
            let env = std::env::var("PRINTHUB_ENV").unwrap_or_else(|_| "development".to_string());
            AppConfig::load(&env)
        }
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting PrintHub v{}", env!("CARGO_PKG_VERSION"));
    let config = Arc::new(config);

    // ── Step 1: Job store, payload storage, launcher ─────────────
    let service = Arc::new(PrintQueueService::from_config(&config).await?);

    // ── Step 2: Start anything queued while we were down ─────────
    let started = service.dispatch_all().await?;
    tracing::info!(started = started.len(), "Startup dispatch pass complete");

    // ── Step 3: Build and start HTTP server ──────────────────────
    let state = AppState::new(Arc::clone(&config), Arc::clone(&service), service.storage());
    let app = build_router(state);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        AppError::with_source(
            printhub_core::error::ErrorKind::Internal,
            format!("Failed to bind {addr}"),
            e,
        )
    })?;
    tracing::info!("PrintHub server listening on {}", addr);

    // ── Step 4: Graceful shutdown, bounded by the grace period ───
    let signalled = Arc::new(Notify::new());
    let server = axum::serve(listener, app).with_graceful_shutdown({
        let signalled = Arc::clone(&signalled);
        async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, draining requests...");
            signalled.notify_one();
        }
    });
    let grace_expired = async {
        signalled.notified().await;
        match config.server.shutdown_grace() {
            Some(grace) => tokio::time::sleep(grace).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        result = server.into_future() => result.map_err(|e| {
            AppError::with_source(printhub_core::error::ErrorKind::Internal, "Server error", e)
        })?,
        () = grace_expired => {
            tracing::warn!(
                grace_seconds = config.server.shutdown_grace_seconds,
                "Shutdown grace period elapsed, closing open connections"
            );
        }
    }

    tracing::info!("PrintHub server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
