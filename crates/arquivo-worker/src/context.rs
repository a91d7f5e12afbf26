use async_trait::async_trait;
use uuid::Uuid;

/// Write-back seam between the queue and the document store.
///
/// The API layer implements this over the document repository; queue tests
/// use an in-memory stub. A successful advanced pass replaces the document's
/// extracted text and marks OCR as completed in one call.
#[async_trait]
pub trait DocumentTextSink: Send + Sync {
    async fn apply_extracted_text(&self, document_id: Uuid, text: &str) -> anyhow::Result<()>;
}
