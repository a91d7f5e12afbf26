//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use arquivo_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Arquivo API",
        version = "0.1.0",
        description = "Document management API: upload files with metadata, full-text and faceted search, background OCR extraction."
    ),
    paths(
        handlers::document_upload::upload_documents,
        handlers::document_get::get_document,
        handlers::document_get::search_documents,
        handlers::document_download::download_document,
        handlers::document_update::update_document,
        handlers::document_delete::delete_document,
        handlers::ocr::queue_status,
        handlers::ocr::get_job,
        handlers::ocr::reprocess_document,
    ),
    components(schemas(
        models::DocumentResponse,
        models::DocumentUpdate,
        models::JobResponse,
        models::QueueSummary,
        models::JobStatus,
        models::SortKey,
        handlers::document_upload::UploadMetadata,
        handlers::document_upload::UploadResponse,
        handlers::document_get::SearchResponse,
        error::ErrorResponse,
    )),
    tags(
        (name = "documents", description = "Document upload, search, and management"),
        (name = "ocr", description = "Background extraction queue")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
