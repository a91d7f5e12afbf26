//! Application initialization: database, storage, extraction, queue, routes.

mod database;
mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;

use arquivo_core::validation::UploadValidator;
use arquivo_core::Config;
use arquivo_db::DocumentRepository;
use arquivo_extract::TextExtractor;
use arquivo_storage::{LocalStorage, Storage};
use arquivo_worker::{ExtractionQueue, ExtractionQueueConfig};

use crate::sink::RepositoryTextSink;
use crate::state::AppState;

/// Wire up every component and return the shared state plus the router.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, Router)> {
    config.validate()?;

    let pool = database::setup_database(&config).await?;

    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(&config.storage_path)
            .await
            .context("Failed to initialize local storage")?,
    );

    let repository = DocumentRepository::new(pool);
    let extractor = TextExtractor::new(&config.ocr_languages, config.ocr_max_edge_px);

    let queue = ExtractionQueue::new(
        Arc::new(RepositoryTextSink::new(repository.clone())),
        storage.clone(),
        extractor.clone(),
        ExtractionQueueConfig {
            retention_secs: config.job_retention_secs,
            sweep_interval_secs: config.job_sweep_interval_secs,
        },
    );

    let validator = UploadValidator::new(
        config.max_file_size_bytes,
        config.allowed_extensions.clone(),
        config.allowed_content_types.clone(),
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        repository,
        storage,
        extractor,
        queue,
        validator,
    });

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
