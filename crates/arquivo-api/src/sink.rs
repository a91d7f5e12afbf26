//! Queue write-back over the document repository.

use async_trait::async_trait;
use uuid::Uuid;

use arquivo_db::DocumentRepository;
use arquivo_worker::DocumentTextSink;

/// Applies a successful advanced pass to the owning document: replaces the
/// extracted text and marks OCR as completed.
pub struct RepositoryTextSink {
    repository: DocumentRepository,
}

impl RepositoryTextSink {
    pub fn new(repository: DocumentRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl DocumentTextSink for RepositoryTextSink {
    async fn apply_extracted_text(&self, document_id: Uuid, text: &str) -> anyhow::Result<()> {
        let updated = self
            .repository
            .set_extracted_text(document_id, text, true)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to store extracted text: {}", e))?;

        if updated.is_none() {
            anyhow::bail!("Document {} no longer exists", document_id);
        }

        Ok(())
    }
}
