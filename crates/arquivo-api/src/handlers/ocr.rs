use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::Json,
};
use std::sync::Arc;
use uuid::Uuid;

use arquivo_core::models::{JobResponse, QueueSummary};
use arquivo_core::AppError;

#[utoipa::path(
    get,
    path = "/api/ocr/status",
    tag = "ocr",
    responses(
        (status = 200, description = "Queue counts by status", body = QueueSummary)
    )
)]
pub async fn queue_status(State(state): State<Arc<AppState>>) -> Json<QueueSummary> {
    Json(state.queue.summary().await)
}

#[utoipa::path(
    get,
    path = "/api/ocr/job/{job_id}",
    tag = "ocr",
    params(
        ("job_id" = String, Path, description = "Extraction job ID")
    ),
    responses(
        (status = 200, description = "Job record", body = JobResponse),
        (status = 404, description = "Job not found (unknown or already swept)", body = ErrorResponse)
    )
)]
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<JobResponse>, HttpAppError> {
    match state.queue.job(&job_id).await {
        Some(job) => Ok(Json(JobResponse::from(job))),
        None => Err(AppError::NotFound("Job not found".to_string()).into()),
    }
}

#[utoipa::path(
    post,
    path = "/api/documents/{id}/reprocess",
    tag = "ocr",
    params(
        ("id" = Uuid, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Extraction job enqueued"),
        (status = 404, description = "Document or file not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(document_id = %id))]
pub async fn reprocess_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, HttpAppError> {
    let document = state
        .repository
        .get(id)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    let exists = state
        .storage
        .exists(&document.storage_key)
        .await
        .map_err(HttpAppError::from)?;
    if !exists {
        return Err(AppError::NotFound("File not found on disk".to_string()).into());
    }

    let job_id = state
        .queue
        .enqueue(document.id, &document.storage_key, &document.content_type)
        .await;

    tracing::info!(job_id = %job_id, "Reprocess job enqueued");

    Ok(Json(serde_json::json!({
        "job_id": job_id,
        "status": "pending"
    })))
}
