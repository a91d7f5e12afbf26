//! Configuration module
//!
//! This module provides the application configuration, read from environment
//! variables with sensible defaults for local development.

use std::env;

const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_DOCUMENT_SIZE_MB: usize = 50;
const JOB_RETENTION_SECS: u64 = 3600;
const JOB_SWEEP_INTERVAL_SECS: u64 = 300;
const QUICK_TEXT_QUEUE_THRESHOLD: usize = 100;
const OCR_MAX_EDGE_PX: u32 = 2500;

/// Application configuration (document service).
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub storage_path: String,
    pub max_file_size_bytes: usize,
    pub allowed_extensions: Vec<String>,
    pub allowed_content_types: Vec<String>,
    pub ocr_languages: String,
    pub ocr_max_edge_px: u32,
    /// Uploads whose quick-pass text is shorter than this are queued for the advanced pass.
    pub quick_text_queue_threshold: usize,
    /// Retention in seconds for finished extraction jobs (completed/failed).
    pub job_retention_secs: u64,
    /// Interval in seconds between runs of the finished-job sweep. 0 = disabled.
    pub job_sweep_interval_secs: u64,
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production" || self.environment.to_lowercase() == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_DOCUMENT_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_DOCUMENT_SIZE_MB);

        let allowed_extensions = env::var("ALLOWED_EXTENSIONS")
            .unwrap_or_else(|_| "jpg,jpeg,png,gif,bmp,tiff,webp,pdf,doc,docx".to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .collect();

        let allowed_content_types = env::var("ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|_| {
                "image/jpeg,image/png,image/gif,image/bmp,image/tiff,image/webp,\
                 application/pdf,application/msword,\
                 application/vnd.openxmlformats-officedocument.wordprocessingml.document"
                    .to_string()
            })
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .collect();

        Ok(Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            storage_path: env::var("STORAGE_PATH").unwrap_or_else(|_| "./uploads".to_string()),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            allowed_extensions,
            allowed_content_types,
            ocr_languages: env::var("OCR_LANGUAGES").unwrap_or_else(|_| "spa+eng".to_string()),
            ocr_max_edge_px: env::var("OCR_MAX_EDGE_PX")
                .unwrap_or_else(|_| OCR_MAX_EDGE_PX.to_string())
                .parse()
                .unwrap_or(OCR_MAX_EDGE_PX),
            quick_text_queue_threshold: env::var("QUICK_TEXT_QUEUE_THRESHOLD")
                .unwrap_or_else(|_| QUICK_TEXT_QUEUE_THRESHOLD.to_string())
                .parse()
                .unwrap_or(QUICK_TEXT_QUEUE_THRESHOLD),
            job_retention_secs: env::var("JOB_RETENTION_SECS")
                .unwrap_or_else(|_| JOB_RETENTION_SECS.to_string())
                .parse()
                .unwrap_or(JOB_RETENTION_SECS),
            job_sweep_interval_secs: env::var("JOB_SWEEP_INTERVAL_SECS")
                .unwrap_or_else(|_| JOB_SWEEP_INTERVAL_SECS.to_string())
                .parse()
                .unwrap_or(JOB_SWEEP_INTERVAL_SECS),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }
        if self.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_EXTENSIONS must not be empty"));
        }
        if self.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_CONTENT_TYPES must not be empty"));
        }
        if self.ocr_languages.trim().is_empty() {
            return Err(anyhow::anyhow!("OCR_LANGUAGES must not be empty"));
        }
        if self.storage_path.trim().is_empty() {
            return Err(anyhow::anyhow!("STORAGE_PATH must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            server_port: 4000,
            cors_origins: vec!["*".to_string()],
            environment: "development".to_string(),
            database_url: "postgres://localhost/arquivo".to_string(),
            db_max_connections: MAX_CONNECTIONS,
            db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            storage_path: "./uploads".to_string(),
            max_file_size_bytes: MAX_DOCUMENT_SIZE_MB * 1024 * 1024,
            allowed_extensions: vec!["jpg".to_string(), "pdf".to_string()],
            allowed_content_types: vec!["image/jpeg".to_string(), "application/pdf".to_string()],
            ocr_languages: "spa+eng".to_string(),
            ocr_max_edge_px: OCR_MAX_EDGE_PX,
            quick_text_queue_threshold: QUICK_TEXT_QUEUE_THRESHOLD,
            job_retention_secs: JOB_RETENTION_SECS,
            job_sweep_interval_secs: JOB_SWEEP_INTERVAL_SECS,
        }
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_file_size() {
        let mut config = test_config();
        config.max_file_size_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_extensions() {
        let mut config = test_config();
        config.allowed_extensions.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_ocr_languages() {
        let mut config = test_config();
        config.ocr_languages = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_is_production() {
        let mut config = test_config();
        assert!(!config.is_production());
        config.environment = "Production".to_string();
        assert!(config.is_production());
        config.environment = "prod".to_string();
        assert!(config.is_production());
    }
}
