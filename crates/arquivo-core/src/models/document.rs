use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A stored document: upload metadata, file facts, and extraction state.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub subject: Option<String>,
    pub category: String,
    pub department: Option<String>,
    pub tags: Vec<String>,
    pub document_date: Option<NaiveDate>,
    pub original_filename: String,
    pub stored_filename: String,
    pub content_type: String,
    pub file_size: i64,
    pub storage_key: String,
    pub extracted_text: Option<String>,
    pub ocr_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// True for `image/*` content types, which are eligible for the advanced OCR pass.
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

/// Fields required to insert a new document row. The id and timestamps are
/// generated by the repository.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    pub description: Option<String>,
    pub subject: Option<String>,
    pub category: String,
    pub department: Option<String>,
    pub tags: Vec<String>,
    pub document_date: Option<NaiveDate>,
    pub original_filename: String,
    pub stored_filename: String,
    pub content_type: String,
    pub file_size: i64,
    pub storage_key: String,
    pub extracted_text: Option<String>,
}

/// Partial metadata update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DocumentUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub subject: Option<String>,
    pub category: Option<String>,
    pub department: Option<String>,
    pub tags: Option<Vec<String>>,
    /// Date-only string, e.g. "2024-06-30".
    pub document_date: Option<String>,
}

impl DocumentUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.subject.is_none()
            && self.category.is_none()
            && self.department.is_none()
            && self.tags.is_none()
            && self.document_date.is_none()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub subject: Option<String>,
    pub category: String,
    pub department: Option<String>,
    pub tags: Vec<String>,
    pub document_date: Option<NaiveDate>,
    pub filename: String,
    pub content_type: String,
    pub file_size: i64,
    pub extracted_text: Option<String>,
    pub ocr_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        DocumentResponse {
            id: doc.id,
            title: doc.title,
            description: doc.description,
            subject: doc.subject,
            category: doc.category,
            department: doc.department,
            tags: doc.tags,
            document_date: doc.document_date,
            filename: doc.original_filename,
            content_type: doc.content_type,
            file_size: doc.file_size,
            extracted_text: doc.extracted_text,
            ocr_completed: doc.ocr_completed,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_document(content_type: &str) -> Document {
        Document {
            id: Uuid::new_v4(),
            title: "Contract A".to_string(),
            description: Some("Signed service contract".to_string()),
            subject: None,
            category: "contrato".to_string(),
            department: Some("legal".to_string()),
            tags: vec!["2024".to_string(), "services".to_string()],
            document_date: NaiveDate::from_ymd_opt(2024, 6, 30),
            original_filename: "contract-a.pdf".to_string(),
            stored_filename: "1719744000000_contract-a.pdf".to_string(),
            content_type: content_type.to_string(),
            file_size: 2048,
            storage_key: "documents/1719744000000_contract-a.pdf".to_string(),
            extracted_text: None,
            ocr_completed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_document_response_from_document() {
        let doc = test_document("application/pdf");
        let id = doc.id;
        let created_at = doc.created_at;

        let response = DocumentResponse::from(doc);

        assert_eq!(response.id, id);
        assert_eq!(response.title, "Contract A");
        assert_eq!(response.category, "contrato");
        assert_eq!(response.filename, "contract-a.pdf");
        assert_eq!(response.content_type, "application/pdf");
        assert_eq!(response.file_size, 2048);
        assert_eq!(response.tags, vec!["2024", "services"]);
        assert!(!response.ocr_completed);
        assert_eq!(response.created_at, created_at);
    }

    #[test]
    fn test_is_image() {
        assert!(test_document("image/jpeg").is_image());
        assert!(test_document("image/png").is_image());
        assert!(!test_document("application/pdf").is_image());
        assert!(!test_document("application/msword").is_image());
    }

    #[test]
    fn test_document_update_is_empty() {
        assert!(DocumentUpdate::default().is_empty());

        let update = DocumentUpdate {
            title: Some("New title".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
