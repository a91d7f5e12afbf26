use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ExtractError;

/// Sentinel returned instead of an error when a Word document cannot be parsed.
pub const UNSUPPORTED_SENTINEL: &str = "[Unsupported or corrupted Word document]";

/// Extract raw text from a Word document on disk.
///
/// DOCX files are ZIP archives; the text lives in `word/document.xml`.
/// Legacy binary `.doc` files fail the ZIP open and surface as an error,
/// which the extractor maps to [`UNSUPPORTED_SENTINEL`].
pub fn extract_text(path: &Path) -> Result<String, ExtractError> {
    let file = std::fs::File::open(path).map_err(|e| ExtractError::ReadDocument {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| ExtractError::DocxProcessing(format!("Failed to open DOCX: {}", e)))?;

    let mut document_xml = archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::DocxProcessing(format!("Failed to find document.xml: {}", e)))?;

    let mut xml_content = String::new();
    document_xml
        .read_to_string(&mut xml_content)
        .map_err(|e| ExtractError::DocxProcessing(format!("Failed to read document.xml: {}", e)))?;

    parse_docx_xml(&xml_content)
}

/// Walk the WordprocessingML event stream collecting `w:t` runs, with a
/// newline per closed paragraph.
fn parse_docx_xml(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut text = String::new();
    let mut in_text_element = false;
    let mut in_paragraph = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let local_name = e.local_name();
                match local_name.as_ref() {
                    b"t" => in_text_element = true,
                    b"p" => in_paragraph = true,
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => {
                let local_name = e.local_name();
                match local_name.as_ref() {
                    b"t" => in_text_element = false,
                    b"p" => {
                        if in_paragraph {
                            text.push('\n');
                            in_paragraph = false;
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(e)) => {
                if in_text_element {
                    let decoded = e.unescape().unwrap_or_default();
                    text.push_str(&decoded);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::DocxProcessing(format!(
                    "XML parsing error: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_test_docx(dir: &Path, name: &str, document_xml: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("word/document.xml", zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap();
        path
    }

    #[test]
    fn test_parse_simple_xml() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
        <w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
            <w:body>
                <w:p>
                    <w:r>
                        <w:t>Hello World</w:t>
                    </w:r>
                </w:p>
            </w:body>
        </w:document>"#;

        let text = parse_docx_xml(xml).unwrap();
        assert!(text.contains("Hello World"));
    }

    #[test]
    fn test_parse_paragraph_breaks() {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
            <w:body>
                <w:p><w:r><w:t>First paragraph</w:t></w:r></w:p>
                <w:p><w:r><w:t>Second paragraph</w:t></w:r></w:p>
            </w:body>
        </w:document>"#;

        let text = parse_docx_xml(xml).unwrap();
        assert_eq!(text, "First paragraph\nSecond paragraph\n");
    }

    #[test]
    fn test_extract_text_from_docx_archive() {
        let dir = tempfile::tempdir().unwrap();
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
            <w:body><w:p><w:r><w:t>Contract terms apply.</w:t></w:r></w:p></w:body>
        </w:document>"#;
        let path = write_test_docx(dir.path(), "contract.docx", xml);

        let text = extract_text(&path).unwrap();
        assert!(text.contains("Contract terms apply."));
    }

    #[test]
    fn test_extract_text_not_a_zip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.doc");
        std::fs::write(&path, b"\xd0\xcf\x11\xe0 legacy binary word file").unwrap();

        let result = extract_text(&path);
        assert!(matches!(result, Err(ExtractError::DocxProcessing(_))));
    }

    #[test]
    fn test_extract_text_zip_without_document_xml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odd.docx");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("other.txt", zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(b"nothing here").unwrap();
        writer.finish().unwrap();

        let result = extract_text(&path);
        assert!(matches!(result, Err(ExtractError::DocxProcessing(_))));
    }

    #[test]
    fn test_extract_text_missing_file() {
        let result = extract_text(Path::new("/nonexistent/contract.docx"));
        assert!(matches!(result, Err(ExtractError::ReadDocument { .. })));
    }
}
