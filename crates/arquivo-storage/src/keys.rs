//! Shared key and filename generation for stored documents.
//!
//! Stored filename format: `{upload_unix_millis}_{sanitized original filename}`.
//! Storage key format: `documents/{stored_filename}`.

use chrono::Utc;

/// Replace characters that are unsafe in filenames with underscores and strip
/// any path components the client may have sent.
pub fn sanitize_filename(original: &str) -> String {
    let name = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original)
        .trim();

    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches(['_', '.']).is_empty() {
        "file".to_string()
    } else {
        sanitized
    }
}

/// Generate the unique stored filename for an upload: timestamp-prefixed
/// sanitized original name.
pub fn stored_filename(original: &str) -> String {
    format!(
        "{}_{}",
        Utc::now().timestamp_millis(),
        sanitize_filename(original)
    )
}

/// Generate the storage key for a stored filename.
///
/// All backends must use this format for consistency.
pub fn storage_key(stored_filename: &str) -> String {
    format!("documents/{}", stored_filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_safe_characters() {
        assert_eq!(sanitize_filename("contract-a_v2.pdf"), "contract-a_v2.pdf");
    }

    #[test]
    fn test_sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize_filename("my scan (1).jpg"), "my_scan__1_.jpg");
    }

    #[test]
    fn test_sanitize_strips_path_components() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\a\\doc.docx"), "doc.docx");
    }

    #[test]
    fn test_sanitize_empty_falls_back() {
        assert_eq!(sanitize_filename("///"), "file");
        assert_eq!(sanitize_filename("..."), "file");
    }

    #[test]
    fn test_stored_filename_is_timestamp_prefixed() {
        let name = stored_filename("scan.jpg");
        let (prefix, rest) = name.split_once('_').unwrap();
        assert!(prefix.parse::<i64>().is_ok());
        assert_eq!(rest, "scan.jpg");
    }

    #[test]
    fn test_storage_key_format() {
        assert_eq!(
            storage_key("1719744000000_scan.jpg"),
            "documents/1719744000000_scan.jpg"
        );
    }
}
