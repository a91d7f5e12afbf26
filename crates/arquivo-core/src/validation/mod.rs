//! Upload validation
//!
//! Validates file uploads and their metadata before anything reaches storage
//! or the database. A rejected upload creates no partial document.

use std::path::Path;

/// Common validation errors for document uploads
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid file extension: {extension} (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Invalid content type: {content_type} (allowed: {allowed:?})")]
    InvalidContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Empty file")]
    EmptyFile,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// Document upload validator
///
/// Provides validation logic for uploaded files without coupling to storage
/// implementation details.
pub struct UploadValidator {
    max_file_size: usize,
    allowed_extensions: Vec<String>,
    allowed_content_types: Vec<String>,
}

impl UploadValidator {
    pub fn new(
        max_file_size: usize,
        allowed_extensions: Vec<String>,
        allowed_content_types: Vec<String>,
    ) -> Self {
        Self {
            max_file_size,
            allowed_extensions,
            allowed_content_types,
        }
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate file extension
    pub fn validate_extension(&self, filename: &str) -> Result<(), ValidationError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| ValidationError::InvalidFilename(filename.to_string()))?;

        if !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.allowed_extensions.clone(),
            });
        }

        Ok(())
    }

    /// Validate content type
    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        let normalized = content_type.to_lowercase();

        if !self
            .allowed_content_types
            .iter()
            .any(|ct| ct == &normalized)
        {
            return Err(ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(())
    }

    /// Run all file checks in order: size, extension, content type.
    pub fn validate_file(
        &self,
        filename: &str,
        content_type: &str,
        size: usize,
    ) -> Result<(), ValidationError> {
        self.validate_file_size(size)?;
        self.validate_extension(filename)?;
        self.validate_content_type(content_type)?;
        Ok(())
    }
}

/// Validate required upload metadata: title and category must be non-empty.
pub fn validate_metadata(title: &str, category: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::MissingField("title"));
    }
    if category.trim().is_empty() {
        return Err(ValidationError::MissingField("category"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> UploadValidator {
        UploadValidator::new(
            1024 * 1024,
            vec!["jpg".to_string(), "pdf".to_string(), "docx".to_string()],
            vec![
                "image/jpeg".to_string(),
                "application/pdf".to_string(),
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
                    .to_string(),
            ],
        )
    }

    #[test]
    fn test_validate_file_size() {
        let v = validator();
        assert!(v.validate_file_size(1024).is_ok());
        assert!(matches!(
            v.validate_file_size(0),
            Err(ValidationError::EmptyFile)
        ));
        assert!(matches!(
            v.validate_file_size(2 * 1024 * 1024),
            Err(ValidationError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_validate_extension() {
        let v = validator();
        assert!(v.validate_extension("scan.jpg").is_ok());
        assert!(v.validate_extension("scan.JPG").is_ok());
        assert!(matches!(
            v.validate_extension("malware.exe"),
            Err(ValidationError::InvalidExtension { .. })
        ));
        assert!(matches!(
            v.validate_extension("noextension"),
            Err(ValidationError::InvalidFilename(_))
        ));
    }

    #[test]
    fn test_validate_content_type() {
        let v = validator();
        assert!(v.validate_content_type("image/jpeg").is_ok());
        assert!(v.validate_content_type("Image/JPEG").is_ok());
        assert!(matches!(
            v.validate_content_type("video/mp4"),
            Err(ValidationError::InvalidContentType { .. })
        ));
    }

    #[test]
    fn test_validate_file_checks_all() {
        let v = validator();
        assert!(v.validate_file("scan.jpg", "image/jpeg", 512).is_ok());
        // Size is checked first
        assert!(matches!(
            v.validate_file("scan.jpg", "image/jpeg", 0),
            Err(ValidationError::EmptyFile)
        ));
    }

    #[test]
    fn test_validate_metadata() {
        assert!(validate_metadata("Contract A", "contrato").is_ok());
        assert!(matches!(
            validate_metadata("", "contrato"),
            Err(ValidationError::MissingField("title"))
        ));
        assert!(matches!(
            validate_metadata("Contract A", "   "),
            Err(ValidationError::MissingField("category"))
        ));
    }
}
