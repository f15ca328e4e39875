//! Print job handlers.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use bytes::Bytes;

use printhub_core::error::AppError;
use printhub_entity::job::Job;
use printhub_service::{ActionOutcome, SubmitRequest};

use crate::dto::request::FailJobRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::parse_job_id;
use crate::state::AppState;

type OutcomeResponse = Json<ApiResponse<ActionOutcome>>;

/// POST /api/jobs (multipart: printer, owner, notes, file)
pub async fn submit(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, OutcomeResponse)> {
    let mut printer = String::new();
    let mut owner = String::new();
    let mut notes: Option<String> = None;
    let mut file_name = String::new();
    let mut data = Bytes::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                file_name = field.file_name().unwrap_or("").to_string();
                data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
            }
            "printer" | "owner" | "notes" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                match name.as_str() {
                    "printer" => printer = text,
                    "owner" => owner = text,
                    _ => notes = Some(text),
                }
            }
            _ => {}
        }
    }

    let outcome = state
        .queue
        .submit(SubmitRequest {
            printer,
            owner_ref: owner,
            file_name,
            data,
            notes,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(outcome))))
}

/// GET /api/jobs/{id}
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Job>>> {
    let job = state.queue.get(parse_job_id(&id)?).await?;
    Ok(Json(ApiResponse::ok(job)))
}

/// POST /api/jobs/{id}/complete
pub async fn complete_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<OutcomeResponse> {
    let outcome = state.queue.complete(parse_job_id(&id)?).await?;
    Ok(Json(ApiResponse::ok(outcome)))
}

/// POST /api/jobs/{id}/fail
///
/// The JSON body `{ "reason": "..." }` is optional.
pub async fn fail_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<OutcomeResponse> {
    let id = parse_job_id(&id)?;
    let request: FailJobRequest = if body.iter().all(u8::is_ascii_whitespace) {
        FailJobRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::validation(format!("Invalid JSON body: {e}")))?
    };

    let outcome = state.queue.fail(id, request.reason.as_deref()).await?;
    Ok(Json(ApiResponse::ok(outcome)))
}

/// DELETE /api/jobs/{id}
pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<OutcomeResponse> {
    let outcome = state.queue.delete(parse_job_id(&id)?).await?;
    Ok(Json(ApiResponse::ok(outcome)))
}
