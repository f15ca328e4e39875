//! Queue snapshot handler.

use axum::Json;
use axum::extract::State;

use printhub_service::QueueSnapshot;

use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/queue
pub async fn snapshot(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<QueueSnapshot>>> {
    let snapshot = state.queue.snapshot().await?;
    Ok(Json(ApiResponse::ok(snapshot)))
}
