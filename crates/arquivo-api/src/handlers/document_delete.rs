use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use arquivo_core::AppError;

#[utoipa::path(
    delete,
    path = "/api/documents/{id}",
    tag = "documents",
    params(
        ("id" = Uuid, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Document deleted"),
        (status = 404, description = "Document not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let document = state
        .repository
        .get(id)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    let deleted = state.repository.delete(id).await.map_err(HttpAppError::from)?;
    if !deleted {
        return Err(AppError::NotFound("Document not found".to_string()).into());
    }

    // Remove the backing file after the row; a missing file is tolerated.
    if let Err(e) = state.storage.delete(&document.storage_key).await {
        tracing::warn!(
            error = %e,
            document_id = %id,
            storage_key = %document.storage_key,
            "Failed to delete stored file for deleted document"
        );
    }

    tracing::info!(document_id = %id, "Document deleted");

    Ok(Json(serde_json::json!({ "deleted": true })))
}
