//! PDF handling.
//!
//! PDF text extraction is not implemented; both passes return a fixed
//! placeholder so PDF uploads still get a stored text value.

/// Placeholder stored as the extracted text for PDF documents.
pub const PDF_PLACEHOLDER: &str = "[PDF text extraction not available]";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_is_stable() {
        assert_eq!(PDF_PLACEHOLDER, "[PDF text extraction not available]");
    }
}
