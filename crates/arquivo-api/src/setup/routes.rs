//! Route configuration and setup.

use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, Method},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use arquivo_core::Config;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;

    // Multipart framing adds overhead on top of the file payload itself
    let body_limit = config.max_file_size_bytes + 1024 * 1024;

    let router = Router::new()
        .route("/api/health", get(health_check))
        .route(
            "/api/documents",
            post(handlers::document_upload::upload_documents)
                .get(handlers::document_get::search_documents),
        )
        .route(
            "/api/documents/{id}",
            get(handlers::document_get::get_document)
                .patch(handlers::document_update::update_document)
                .delete(handlers::document_delete::delete_document),
        )
        .route(
            "/api/documents/{id}/download",
            get(handlers::document_download::download_document),
        )
        .route(
            "/api/documents/{id}/reprocess",
            post(handlers::ocr::reprocess_document),
        )
        .route("/api/ocr/status", get(handlers::ocr::queue_status))
        .route("/api/ocr/job/{job_id}", get(handlers::ocr::get_job))
        .route("/api/openapi.json", get(openapi_json))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    Ok(router)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
            .allow_headers(Any)
    };
    Ok(cors)
}

#[derive(serde::Serialize)]
struct HealthCheckResponse {
    status: String,
    database: String,
}

/// Liveness probe: reports overall status plus a bounded database ping.
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database = match tokio::time::timeout(
        Duration::from_secs(2),
        state.repository.ping(),
    )
    .await
    {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("error: {}", e),
        Err(_) => "timeout".to_string(),
    };

    let status = if database == "healthy" { "ok" } else { "degraded" };

    Json(HealthCheckResponse {
        status: status.to_string(),
        database,
    })
}

async fn openapi_json() -> impl IntoResponse {
    Json(crate::api_doc::get_openapi_spec())
}
