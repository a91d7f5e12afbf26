//! Arquivo Extract Library
//!
//! Best-effort plain-text extraction from uploaded documents: OCR for images
//! (via Tesseract), raw text for Word documents, a fixed placeholder for PDFs.
//!
//! Extraction runs in two passes. The quick pass happens synchronously at
//! upload time; the advanced pass runs from the background queue with a
//! character allow-list and output cleanup.

pub mod docx;
mod error;
pub mod extractor;
pub mod ocr;
pub mod pdf;

pub use error::ExtractError;
pub use extractor::{Pass, TextExtractor};
pub use ocr::OcrEngine;
