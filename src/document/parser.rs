//! PDF text extraction via pdf-extract.

use crate::error::{OrganizerError, Result};
use std::path::Path;

/// Extract all text from a PDF.
/// Wrapped in catch_unwind to handle panics from malformed PDFs
pub fn extract_pdf_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| OrganizerError::io(path, e))?;

    tracing::debug!("PDF file size: {} bytes for {}", bytes.len(), path.display());

    // The pdf_extract crate (and its cff-parser dependency) can panic on certain fonts/glyphs
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(&bytes)
    })) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(OrganizerError::Pdf {
            path: path.to_path_buf(),
            message: format!("text extraction failed: {}", e),
        }),
        Err(_panic) => Err(OrganizerError::Pdf {
            path: path.to_path_buf(),
            message: "text extraction panicked - likely malformed fonts".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::fixtures::make_test_pdf;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_extract_text_from_digital_pdf() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("letter.pdf");
        fs::write(&path, make_test_pdf("Hello World from London W6 0XE", None)).unwrap();

        let text = extract_pdf_text(&path).unwrap();
        assert!(
            text.contains("Hello") || text.contains("World"),
            "Expected text to contain 'Hello' or 'World', got: {text}"
        );
    }

    #[test]
    fn test_invalid_pdf_returns_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fake.pdf");
        fs::write(&path, b"not a pdf").unwrap();

        assert!(matches!(extract_pdf_text(&path), Err(OrganizerError::Pdf { .. })));
    }
}
