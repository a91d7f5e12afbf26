use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;

use crate::docx;
use crate::error::ExtractError;
use crate::ocr::OcrEngine;
use crate::pdf::PDF_PLACEHOLDER;

/// Content types treated as Word documents.
pub const WORD_CONTENT_TYPES: &[&str] = &[
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Extraction pass. Quick runs synchronously at upload time; Advanced runs
/// from the background queue with the character allow-list and output cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Quick,
    Advanced,
}

impl Display for Pass {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Pass::Quick => write!(f, "quick"),
            Pass::Advanced => write!(f, "advanced"),
        }
    }
}

/// Routes a file to the extractor for its declared content type.
///
/// All extraction is blocking work; async callers run it on a blocking task.
#[derive(Clone)]
pub struct TextExtractor {
    ocr: OcrEngine,
}

impl TextExtractor {
    pub fn new(ocr_languages: &str, ocr_max_edge_px: u32) -> Self {
        Self {
            ocr: OcrEngine::new(ocr_languages, ocr_max_edge_px),
        }
    }

    /// Extract plain text from the file at `path` declared as `content_type`.
    ///
    /// - images: OCR (errors surface to the caller);
    /// - Word documents: raw text, or the fixed sentinel on any parse failure;
    /// - PDF: fixed placeholder;
    /// - anything else: empty string.
    pub fn extract(
        &self,
        path: &Path,
        content_type: &str,
        pass: Pass,
    ) -> Result<String, ExtractError> {
        let _span =
            tracing::info_span!("extract", content_type = %content_type, pass = %pass).entered();

        let normalized = content_type.to_lowercase();

        if normalized.starts_with("image/") {
            return self.ocr.recognize_file(path, pass);
        }

        if WORD_CONTENT_TYPES.contains(&normalized.as_str()) {
            return Ok(match docx::extract_text(path) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(error = %e, path = %path.display(), "Word extraction failed, storing sentinel");
                    docx::UNSUPPORTED_SENTINEL.to_string()
                }
            });
        }

        if normalized == "application/pdf" {
            return Ok(PDF_PLACEHOLDER.to_string());
        }

        Ok(String::new())
    }
}
