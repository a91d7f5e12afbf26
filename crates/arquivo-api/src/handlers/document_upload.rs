use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use arquivo_core::models::{DocumentResponse, NewDocument};
use arquivo_core::validation::validate_metadata;
use arquivo_core::AppError;
use arquivo_db::documents::parse_document_date;
use arquivo_extract::Pass;
use arquivo_storage::keys;

/// JSON metadata part of the upload form. Applies to every file in the request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UploadMetadata {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    pub category: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Date-only string, e.g. "2024-06-30".
    #[serde(default)]
    pub document_date: Option<String>,
}

struct UploadFile {
    filename: String,
    content_type: String,
    data: Vec<u8>,
}

#[derive(Debug, serde::Serialize, ToSchema)]
pub struct UploadResponse {
    pub documents: Vec<DocumentResponse>,
}

#[utoipa::path(
    post,
    path = "/api/documents",
    tag = "documents",
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Documents uploaded successfully", body = UploadResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn upload_documents(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let mut metadata: Option<UploadMetadata> = None;
    let mut files: Vec<UploadFile> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        HttpAppError(AppError::InvalidInput(format!("Invalid multipart body: {}", e)))
    })? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "metadata" => {
                let raw = field.text().await.map_err(|e| {
                    HttpAppError(AppError::InvalidInput(format!(
                        "Failed to read metadata field: {}",
                        e
                    )))
                })?;
                let parsed: UploadMetadata = serde_json::from_str(&raw).map_err(|e| {
                    HttpAppError(AppError::InvalidInput(format!("Invalid metadata JSON: {}", e)))
                })?;
                metadata = Some(parsed);
            }
            "files" | "files[]" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| AppError::InvalidInput("File part has no filename".to_string()))?;
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| {
                        HttpAppError(AppError::InvalidInput(format!(
                            "Failed to read file '{}': {}",
                            filename, e
                        )))
                    })?
                    .to_vec();
                files.push(UploadFile {
                    filename,
                    content_type,
                    data,
                });
            }
            _ => {
                tracing::debug!(field = %name, "Ignoring unknown multipart field");
            }
        }
    }

    let metadata = metadata
        .ok_or_else(|| AppError::InvalidInput("Missing metadata field".to_string()))?;
    validate_metadata(&metadata.title, &metadata.category).map_err(HttpAppError::from)?;

    if files.is_empty() {
        return Err(AppError::InvalidInput("No files provided".to_string()).into());
    }

    let document_date = metadata
        .document_date
        .as_deref()
        .map(parse_document_date)
        .transpose()?;

    // Validate every file before storing any: a rejected upload creates no
    // partial document.
    for file in &files {
        state
            .validator
            .validate_file(&file.filename, &file.content_type, file.data.len())
            .map_err(HttpAppError::from)?;
    }

    let mut documents = Vec::with_capacity(files.len());
    for file in files {
        let document = store_one(&state, &metadata, document_date, file).await?;
        documents.push(DocumentResponse::from(document));
    }

    Ok(Json(UploadResponse { documents }))
}

/// Store one file: upload bytes, run the quick extraction pass, insert the
/// row, and queue the advanced pass for images with little quick-pass text.
async fn store_one(
    state: &Arc<AppState>,
    metadata: &UploadMetadata,
    document_date: Option<chrono::NaiveDate>,
    file: UploadFile,
) -> Result<arquivo_core::models::Document, HttpAppError> {
    let stored_filename = keys::stored_filename(&file.filename);
    let storage_key = keys::storage_key(&stored_filename);
    let file_size = file.data.len() as i64;

    state
        .storage
        .upload(&storage_key, file.data)
        .await
        .map_err(HttpAppError::from)?;

    // Quick pass. Failures never block the upload: a descriptive placeholder
    // is stored as the extracted text instead.
    let path = state.storage.local_path(&storage_key).map_err(HttpAppError::from)?;
    let extractor = state.extractor.clone();
    let content_type = file.content_type.clone();
    let quick_text = tokio::task::spawn_blocking(move || {
        extractor.extract(&path, &content_type, Pass::Quick)
    })
    .await
    .map_err(|e| HttpAppError(AppError::Internal(format!("Extraction task panicked: {}", e))))?
    .unwrap_or_else(|e| {
        tracing::warn!(error = %e, filename = %file.filename, "Quick extraction failed");
        format!("[Text extraction failed: {}]", e)
    });

    let new_document = NewDocument {
        title: metadata.title.clone(),
        description: metadata.description.clone(),
        subject: metadata.subject.clone(),
        category: metadata.category.clone(),
        department: metadata.department.clone(),
        tags: metadata.tags.clone(),
        document_date,
        original_filename: file.filename.clone(),
        stored_filename,
        content_type: file.content_type.clone(),
        file_size,
        storage_key: storage_key.clone(),
        extracted_text: Some(quick_text.clone()),
    };

    let document = match state.repository.create(new_document).await {
        Ok(document) => document,
        Err(e) => {
            // Cleanup storage on database failure
            let storage = state.storage.clone();
            let key = storage_key.clone();
            tokio::spawn(async move {
                if let Err(cleanup_err) = storage.delete(&key).await {
                    tracing::debug!(
                        error = %cleanup_err,
                        storage_key = %key,
                        "Failed to cleanup storage file after DB error"
                    );
                }
            });
            return Err(HttpAppError::from(e));
        }
    };

    if should_queue_advanced(
        &document.content_type,
        &quick_text,
        state.config.quick_text_queue_threshold,
    ) {
        let job_id = state
            .queue
            .enqueue(document.id, &document.storage_key, &document.content_type)
            .await;
        tracing::info!(
            document_id = %document.id,
            job_id = %job_id,
            quick_text_len = quick_text.trim().chars().count(),
            "Queued advanced extraction pass"
        );
    }

    Ok(document)
}

/// Only images with little quick-pass text get the advanced OCR pass at
/// upload time. Word documents and PDFs are never auto-queued.
fn should_queue_advanced(content_type: &str, quick_text: &str, threshold: usize) -> bool {
    content_type.starts_with("image/") && quick_text.trim().chars().count() < threshold
}
