use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Failed to read document {path}: {source}")]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("Image processing failed: {0}")]
    ImageProcessing(String),

    #[error("Word document processing failed: {0}")]
    DocxProcessing(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
