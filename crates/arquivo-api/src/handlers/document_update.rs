use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use arquivo_core::models::{DocumentResponse, DocumentUpdate};
use arquivo_core::AppError;

#[utoipa::path(
    patch,
    path = "/api/documents/{id}",
    tag = "documents",
    params(
        ("id" = Uuid, Path, description = "Document ID")
    ),
    request_body = DocumentUpdate,
    responses(
        (status = 200, description = "Document updated", body = DocumentResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Document not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn update_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(update): ValidatedJson<DocumentUpdate>,
) -> Result<impl IntoResponse, HttpAppError> {
    if update.is_empty() {
        return Err(AppError::InvalidInput("No updatable fields provided".to_string()).into());
    }

    let document = state
        .repository
        .update(id, update)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    Ok(Json(DocumentResponse::from(document)))
}
