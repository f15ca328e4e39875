//! # printhub-api
//!
//! HTTP API layer for PrintHub built on Axum.
//!
//! A thin adapter over [`printhub_service::PrintQueueService`]: handlers
//! parse requests, call the service, and map results and errors to JSON.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
