//! Application state shared across handlers.

use std::sync::Arc;

use arquivo_core::validation::UploadValidator;
use arquivo_core::Config;
use arquivo_db::DocumentRepository;
use arquivo_extract::TextExtractor;
use arquivo_storage::Storage;
use arquivo_worker::ExtractionQueue;

/// Constructed once at startup and passed to the router; handlers extract it
/// via `State<Arc<AppState>>`.
pub struct AppState {
    pub config: Config,
    pub repository: DocumentRepository,
    pub storage: Arc<dyn Storage>,
    pub extractor: TextExtractor,
    pub queue: ExtractionQueue,
    pub validator: UploadValidator,
}
