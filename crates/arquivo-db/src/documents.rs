//! Document repository
//!
//! All queries go through bound parameters. Search WHERE clauses are composed
//! dynamically from the filter set; the same clause list feeds both the page
//! query and the COUNT query so the total always matches the filters.

use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Row};
use uuid::Uuid;

use arquivo_core::models::{Document, DocumentUpdate, NewDocument, SearchFilters, SortKey};
use arquivo_core::AppError;

/// Values bound into a dynamically composed search query, in clause order.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchBind {
    Text(String),
    Date(NaiveDate),
}

/// Build WHERE clauses for the filter set, numbering placeholders from
/// `start_index`. All filters combine with AND; the free-text filter is an
/// OR across title, description, subject, and extracted text.
fn build_search_where(filters: &SearchFilters, start_index: usize) -> (Vec<String>, Vec<SearchBind>) {
    let mut clauses = Vec::new();
    let mut binds = Vec::new();
    let mut param_index = start_index;

    if let Some(ref query) = filters.query {
        clauses.push(format!(
            "(title ILIKE ${i} OR description ILIKE ${i} OR subject ILIKE ${i} OR extracted_text ILIKE ${i})",
            i = param_index
        ));
        binds.push(SearchBind::Text(format!("%{}%", query)));
        param_index += 1;
    }

    if let Some(ref category) = filters.category {
        clauses.push(format!("category = ${}", param_index));
        binds.push(SearchBind::Text(category.clone()));
        param_index += 1;
    }

    if let Some(ref department) = filters.department {
        clauses.push(format!("department = ${}", param_index));
        binds.push(SearchBind::Text(department.clone()));
        param_index += 1;
    }

    if let Some(date_from) = filters.date_from {
        clauses.push(format!("document_date >= ${}", param_index));
        binds.push(SearchBind::Date(date_from));
        param_index += 1;
    }

    if let Some(date_to) = filters.date_to {
        clauses.push(format!("document_date <= ${}", param_index));
        binds.push(SearchBind::Date(date_to));
    }

    (clauses, binds)
}

/// ORDER BY expression for a sort key. `Relevance` has no scoring; it is the
/// same newest-created-first order used when no key is given.
fn order_by(sort: SortKey) -> &'static str {
    match sort {
        SortKey::DateDesc => "document_date DESC NULLS LAST, created_at DESC",
        SortKey::DateAsc => "document_date ASC NULLS LAST, created_at DESC",
        SortKey::Title => "LOWER(title) ASC",
        SortKey::Size => "file_size DESC",
        SortKey::Relevance => "created_at DESC",
    }
}

#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Cheap connectivity check for the health endpoint.
    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, new), fields(db.table = "documents", db.operation = "insert"))]
    pub async fn create(&self, new: NewDocument) -> Result<Document, AppError> {
        let id = Uuid::new_v4();

        let document: Document = sqlx::query_as::<Postgres, Document>(
            r#"
            INSERT INTO documents (
                id, title, description, subject, category, department,
                tags, document_date,
                original_filename, stored_filename, content_type, file_size,
                storage_key, extracted_text, ocr_completed,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, FALSE, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.subject)
        .bind(&new.category)
        .bind(&new.department)
        .bind(&new.tags)
        .bind(new.document_date)
        .bind(&new.original_filename)
        .bind(&new.stored_filename)
        .bind(&new.content_type)
        .bind(new.file_size)
        .bind(&new.storage_key)
        .bind(&new.extracted_text)
        .fetch_one(&self.pool)
        .await?;

        Ok(document)
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select"))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Document>, AppError> {
        let document = sqlx::query_as::<Postgres, Document>(
            "SELECT * FROM documents WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(document)
    }

    /// Partial metadata update. Provided fields replace the stored values,
    /// absent fields are left unchanged, and `updated_at` always refreshes.
    /// A date supplied as a date-only string is parsed here.
    #[tracing::instrument(skip(self, update), fields(db.table = "documents", db.operation = "update"))]
    pub async fn update(
        &self,
        id: Uuid,
        update: DocumentUpdate,
    ) -> Result<Option<Document>, AppError> {
        if let Some(ref title) = update.title {
            if title.trim().is_empty() {
                return Err(AppError::InvalidInput("title must not be empty".to_string()));
            }
        }
        if let Some(ref category) = update.category {
            if category.trim().is_empty() {
                return Err(AppError::InvalidInput(
                    "category must not be empty".to_string(),
                ));
            }
        }

        let document_date = update
            .document_date
            .as_deref()
            .map(parse_document_date)
            .transpose()?;

        let document = sqlx::query_as::<Postgres, Document>(
            r#"
            UPDATE documents
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                subject = COALESCE($4, subject),
                category = COALESCE($5, category),
                department = COALESCE($6, department),
                tags = COALESCE($7, tags),
                document_date = COALESCE($8, document_date),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.description)
        .bind(&update.subject)
        .bind(&update.category)
        .bind(&update.department)
        .bind(&update.tags)
        .bind(document_date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(document)
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "delete"))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Write-back used by the background queue after a successful advanced
    /// pass. A failed job never calls this, leaving the document untouched.
    #[tracing::instrument(skip(self, text), fields(db.table = "documents", db.operation = "update"))]
    pub async fn set_extracted_text(
        &self,
        id: Uuid,
        text: &str,
        ocr_completed: bool,
    ) -> Result<Option<Document>, AppError> {
        let document = sqlx::query_as::<Postgres, Document>(
            r#"
            UPDATE documents
            SET extracted_text = $2, ocr_completed = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(text)
        .bind(ocr_completed)
        .fetch_optional(&self.pool)
        .await?;

        Ok(document)
    }

    /// Filtered, sorted, offset-paginated search. Returns the page of
    /// documents plus the total row count for the same filter set.
    #[tracing::instrument(skip(self, filters), fields(db.table = "documents", db.operation = "search", page = page, page_size = page_size))]
    pub async fn search(
        &self,
        filters: &SearchFilters,
        page: i64,
        page_size: i64,
        sort: SortKey,
    ) -> Result<(Vec<Document>, i64), AppError> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, 100);
        let offset = (page - 1) * page_size;

        let (clauses, binds) = build_search_where(filters, 1);
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let next_index = binds.len() + 1;
        let page_sql = format!(
            "SELECT * FROM documents {} ORDER BY {} LIMIT ${} OFFSET ${}",
            where_sql,
            order_by(sort),
            next_index,
            next_index + 1
        );

        let mut page_query = sqlx::query_as::<Postgres, Document>(&page_sql);
        for bind in &binds {
            page_query = match bind {
                SearchBind::Text(s) => page_query.bind(s.clone()),
                SearchBind::Date(d) => page_query.bind(*d),
            };
        }
        let documents = page_query
            .bind(page_size)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) AS total FROM documents {}", where_sql);
        let mut count_query = sqlx::query(&count_sql);
        for bind in &binds {
            count_query = match bind {
                SearchBind::Text(s) => count_query.bind(s.clone()),
                SearchBind::Date(d) => count_query.bind(*d),
            };
        }
        let total: i64 = count_query.fetch_one(&self.pool).await?.get("total");

        Ok((documents, total))
    }
}

/// Parse a date-only string like "2024-06-30".
pub fn parse_document_date(s: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| AppError::InvalidInput(format!("Invalid document_date: '{}'", s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_search_where_empty() {
        let (clauses, binds) = build_search_where(&SearchFilters::default(), 1);
        assert!(clauses.is_empty());
        assert!(binds.is_empty());
    }

    #[test]
    fn test_build_search_where_free_text() {
        let filters = SearchFilters {
            query: Some("factura".to_string()),
            ..Default::default()
        };
        let (clauses, binds) = build_search_where(&filters, 1);

        assert_eq!(clauses.len(), 1);
        assert_eq!(
            clauses[0],
            "(title ILIKE $1 OR description ILIKE $1 OR subject ILIKE $1 OR extracted_text ILIKE $1)"
        );
        assert_eq!(binds, vec![SearchBind::Text("%factura%".to_string())]);
    }

    #[test]
    fn test_build_search_where_filters_compose_conjunctively() {
        let filters = SearchFilters {
            query: Some("renewal".to_string()),
            category: Some("contrato".to_string()),
            department: Some("legal".to_string()),
            date_from: NaiveDate::from_ymd_opt(2024, 1, 1),
            date_to: NaiveDate::from_ymd_opt(2024, 12, 31),
        };
        let (clauses, binds) = build_search_where(&filters, 1);

        assert_eq!(clauses.len(), 5);
        assert_eq!(clauses[1], "category = $2");
        assert_eq!(clauses[2], "department = $3");
        assert_eq!(clauses[3], "document_date >= $4");
        assert_eq!(clauses[4], "document_date <= $5");
        assert_eq!(binds.len(), 5);

        let where_sql = clauses.join(" AND ");
        assert!(where_sql.contains("category = $2 AND department = $3"));
    }

    #[test]
    fn test_build_search_where_respects_start_index() {
        let filters = SearchFilters {
            category: Some("informe".to_string()),
            date_to: NaiveDate::from_ymd_opt(2024, 12, 31),
            ..Default::default()
        };
        let (clauses, _) = build_search_where(&filters, 3);
        assert_eq!(clauses[0], "category = $3");
        assert_eq!(clauses[1], "document_date <= $4");
    }

    #[test]
    fn test_order_by_sort_keys() {
        assert_eq!(
            order_by(SortKey::DateDesc),
            "document_date DESC NULLS LAST, created_at DESC"
        );
        assert_eq!(order_by(SortKey::Title), "LOWER(title) ASC");
        assert_eq!(order_by(SortKey::Size), "file_size DESC");
        // Relevance has no scoring: same recency order as the default.
        assert_eq!(order_by(SortKey::Relevance), "created_at DESC");
    }

    #[test]
    fn test_parse_document_date() {
        assert_eq!(
            parse_document_date("2024-06-30").unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
        );
        assert!(parse_document_date("30/06/2024").is_err());
        assert!(parse_document_date("not a date").is_err());
    }
}
