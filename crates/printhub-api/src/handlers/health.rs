//! Health check handler.

use axum::Json;
use axum::extract::State;

use printhub_core::traits::storage::StorageProvider;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let storage = match state.storage.health_check().await {
        Ok(true) => "available",
        Ok(false) => "unavailable",
        Err(e) => {
            tracing::warn!(error = %e, "Storage health check failed");
            "error"
        }
    };

    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: storage.to_string(),
    }))
}
