use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use arquivo_core::models::{DocumentResponse, SearchFilters, SortKey};
use arquivo_core::AppError;
use arquivo_db::documents::parse_document_date;

#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    tag = "documents",
    params(
        ("id" = Uuid, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Document found", body = DocumentResponse),
        (status = 404, description = "Document not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let document = state
        .repository
        .get(id)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    Ok(Json(DocumentResponse::from(document)))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Free text matched across title, description, subject, and extracted text.
    pub query: Option<String>,
    pub category: Option<String>,
    pub department: Option<String>,
    /// Inclusive lower bound on document date, e.g. "2024-01-01".
    pub date_from: Option<String>,
    /// Inclusive upper bound on document date.
    pub date_to: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    /// One of: date_desc, date_asc, title, size, relevance.
    pub sort_by: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    10
}

#[derive(Debug, serde::Serialize, ToSchema)]
pub struct SearchResponse {
    pub documents: Vec<DocumentResponse>,
    pub total: i64,
}

/// Blank query parameters are treated as absent filters.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[utoipa::path(
    get,
    path = "/api/documents",
    tag = "documents",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching documents with total count", body = SearchResponse),
        (status = 400, description = "Invalid filter or sort key", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn search_documents(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let filters = SearchFilters {
        query: non_blank(query.query),
        category: non_blank(query.category),
        department: non_blank(query.department),
        date_from: non_blank(query.date_from)
            .as_deref()
            .map(parse_document_date)
            .transpose()?,
        date_to: non_blank(query.date_to)
            .as_deref()
            .map(parse_document_date)
            .transpose()?,
    };

    let sort = match non_blank(query.sort_by) {
        Some(s) => SortKey::from_str(&s)
            .map_err(|_| AppError::InvalidInput(format!("Invalid sort_by: '{}'", s)))?,
        None => SortKey::default(),
    };

    let (documents, total) = state
        .repository
        .search(&filters, query.page, query.page_size, sort)
        .await
        .map_err(HttpAppError::from)?;

    Ok(Json(SearchResponse {
        documents: documents.into_iter().map(DocumentResponse::from).collect(),
        total,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank_filters_empty_strings() {
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some("".to_string())), None);
        assert_eq!(non_blank(Some("   ".to_string())), None);
        assert_eq!(
            non_blank(Some("contrato".to_string())),
            Some("contrato".to_string())
        );
    }

    #[test]
    fn test_default_pagination() {
        assert_eq!(default_page(), 1);
        assert_eq!(default_page_size(), 10);
    }
}
