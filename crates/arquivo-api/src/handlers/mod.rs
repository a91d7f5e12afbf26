//! HTTP request handlers, one module per operation group.

pub mod document_delete;
pub mod document_download;
pub mod document_get;
pub mod document_update;
pub mod document_upload;
pub mod ocr;
