use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use image::imageops::FilterType;
use image::DynamicImage;
use regex::Regex;

use crate::error::ExtractError;
use crate::extractor::Pass;

/// Characters Tesseract is allowed to emit during the advanced pass.
/// Covers Spanish and English text plus digits and common document punctuation.
const CHAR_ALLOW_LIST: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz\
ÁÉÍÓÚÜÑáéíóúüñ0123456789 .,;:()-_/%$€#&+*'\"¿?¡!@°=\n";

const CONTRAST_BOOST: f32 = 16.0;
const UNSHARPEN_SIGMA: f32 = 1.2;
const UNSHARPEN_THRESHOLD: i32 = 3;

#[derive(Clone)]
pub struct OcrEngine {
    inner: Arc<OcrEngineInner>,
}

struct OcrEngineInner {
    languages: String,
    max_edge_px: u32,
    disallowed: Regex,
    spaces: Regex,
    blank_lines: Regex,
}

impl OcrEngine {
    /// `languages` is a Tesseract language string, e.g. "spa+eng".
    /// `max_edge_px` caps the longer image edge before recognition.
    pub fn new(languages: &str, max_edge_px: u32) -> Self {
        let lang_str = if languages.trim().is_empty() {
            "spa+eng".to_string()
        } else {
            languages.to_string()
        };

        Self {
            inner: Arc::new(OcrEngineInner {
                languages: lang_str,
                max_edge_px,
                disallowed: Regex::new(
                    r#"[^A-Za-zÁÉÍÓÚÜÑáéíóúüñ0-9 .,;:()\-_/%$€#&+*'"¿?¡!@°=\n]"#,
                )
                .expect("hardcoded pattern"),
                spaces: Regex::new(r"[ \t]{2,}").expect("hardcoded pattern"),
                blank_lines: Regex::new(r"\n{3,}").expect("hardcoded pattern"),
            }),
        }
    }

    pub fn languages(&self) -> &str {
        &self.inner.languages
    }

    pub fn recognize_file(&self, image_path: &Path, pass: Pass) -> Result<String, ExtractError> {
        let data = std::fs::read(image_path).map_err(|e| ExtractError::ReadDocument {
            path: image_path.to_path_buf(),
            source: e,
        })?;
        self.recognize(&data, pass)
    }

    /// Run OCR over raw image bytes. Both passes preprocess the image; the
    /// advanced pass additionally restricts recognized characters to the
    /// allow-list and cleans the output.
    pub fn recognize(&self, image_data: &[u8], pass: Pass) -> Result<String, ExtractError> {
        let _span = tracing::info_span!("extract.ocr", pass = %pass).entered();

        let img = image::load_from_memory(image_data)
            .map_err(|e| ExtractError::OcrFailed(format!("Failed to load image: {}", e)))?;

        let img = self.preprocess(img);

        // Convert to PNG in memory for leptess
        let mut png_data = Vec::new();
        let mut cursor = Cursor::new(&mut png_data);
        img.write_to(&mut cursor, image::ImageFormat::Png)
            .map_err(|e| ExtractError::OcrFailed(format!("Failed to convert image: {}", e)))?;

        let mut lt = leptess::LepTess::new(None, &self.inner.languages).map_err(|e| {
            ExtractError::OcrFailed(format!("Failed to initialize Tesseract: {}", e))
        })?;

        if matches!(pass, Pass::Advanced) {
            lt.set_variable(leptess::Variable::TesseditCharWhitelist, CHAR_ALLOW_LIST)
                .map_err(|e| {
                    ExtractError::OcrFailed(format!("Failed to set character allow-list: {}", e))
                })?;
        }

        lt.set_image_from_mem(&png_data)
            .map_err(|e| ExtractError::OcrFailed(format!("Failed to set image for OCR: {}", e)))?;

        let text = lt
            .get_utf8_text()
            .map_err(|e| ExtractError::OcrFailed(format!("OCR failed: {}", e)))?;

        match pass {
            Pass::Quick => Ok(text),
            Pass::Advanced => Ok(self.post_clean(&text)),
        }
    }

    /// Greyscale, boost contrast, sharpen, and cap the image size.
    fn preprocess(&self, img: DynamicImage) -> DynamicImage {
        let img = img
            .grayscale()
            .adjust_contrast(CONTRAST_BOOST)
            .unsharpen(UNSHARPEN_SIGMA, UNSHARPEN_THRESHOLD);

        let max_edge = self.inner.max_edge_px;
        if img.width() > max_edge || img.height() > max_edge {
            img.resize(max_edge, max_edge, FilterType::Lanczos3)
        } else {
            img
        }
    }

    /// Strip characters outside the allow-list, normalize intra-line
    /// whitespace, and collapse runs of blank lines.
    pub fn post_clean(&self, text: &str) -> String {
        let stripped = self.inner.disallowed.replace_all(text, "");
        let spaced = self.inner.spaces.replace_all(&stripped, " ");

        let trimmed_lines: Vec<&str> = spaced.lines().map(str::trim).collect();
        let rejoined = trimmed_lines.join("\n");

        self.inner
            .blank_lines
            .replace_all(&rejoined, "\n\n")
            .trim()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_default_languages() {
        let engine = OcrEngine::new("", 2500);
        assert_eq!(engine.languages(), "spa+eng");
    }

    #[test]
    fn test_engine_custom_languages() {
        let engine = OcrEngine::new("por+eng", 2500);
        assert_eq!(engine.languages(), "por+eng");
    }

    #[test]
    fn test_invalid_image_data_error() {
        let engine = OcrEngine::new("spa+eng", 2500);
        let result = engine.recognize(b"not valid image data", Pass::Quick);

        assert!(result.is_err());
        match result {
            Err(ExtractError::OcrFailed(msg)) => {
                assert!(msg.contains("Failed to load image"));
            }
            _ => panic!("Expected OcrFailed error for invalid image data"),
        }
    }

    #[test]
    fn test_empty_image_data_error() {
        let engine = OcrEngine::new("spa+eng", 2500);
        let result = engine.recognize(&[], Pass::Quick);
        assert!(matches!(result, Err(ExtractError::OcrFailed(_))));
    }

    #[test]
    fn test_nonexistent_file_error() {
        let engine = OcrEngine::new("spa+eng", 2500);
        let result = engine.recognize_file(Path::new("/nonexistent/image.png"), Pass::Quick);

        assert!(result.is_err());
        match result {
            Err(ExtractError::ReadDocument { path, .. }) => {
                assert_eq!(path.to_str().unwrap(), "/nonexistent/image.png");
            }
            _ => panic!("Expected ReadDocument error for nonexistent file"),
        }
    }

    #[test]
    fn test_post_clean_strips_disallowed_characters() {
        let engine = OcrEngine::new("spa+eng", 2500);
        assert_eq!(engine.post_clean("a~b`c|d"), "abcd");
        assert_eq!(engine.post_clean("Precio: 100€ (IVA 21%)"), "Precio: 100€ (IVA 21%)");
    }

    #[test]
    fn test_post_clean_keeps_spanish_letters() {
        let engine = OcrEngine::new("spa+eng", 2500);
        assert_eq!(
            engine.post_clean("Año fiscal «señal»"),
            "Año fiscal señal"
        );
    }

    #[test]
    fn test_post_clean_collapses_blank_lines() {
        let engine = OcrEngine::new("spa+eng", 2500);
        assert_eq!(engine.post_clean("a\n\n\n\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_post_clean_normalizes_whitespace() {
        let engine = OcrEngine::new("spa+eng", 2500);
        assert_eq!(engine.post_clean("hello    world\t\tagain"), "hello world again");
        assert_eq!(engine.post_clean("  padded line  \n"), "padded line");
    }

    #[test]
    fn test_engine_clone_shares_settings() {
        let engine = OcrEngine::new("spa+eng", 1800);
        let cloned = engine.clone();
        assert_eq!(engine.languages(), cloned.languages());
    }
}
