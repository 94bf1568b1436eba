//! PDF metadata rewriting via lopdf.
//!
//! The rewritten document is saved next to the original as
//! `<name>.pdf.temp` and then renamed over it, so the original is never
//! left half-written.

use crate::error::{OrganizerError, Result};
use lopdf::{Dictionary, Document, Object};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// `<path>.temp`
fn temp_path_for(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".temp");
    PathBuf::from(os)
}

fn pdf_error(path: &Path, e: impl std::fmt::Display) -> OrganizerError {
    OrganizerError::Pdf {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Set each override in the document Info dictionary, creating it if absent
fn apply_overrides(
    doc: &mut Document,
    overrides: &BTreeMap<String, String>,
) -> std::result::Result<(), lopdf::Error> {
    let info_ref = match doc.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => Some(*id),
        _ => None,
    };

    let info: &mut Dictionary = match info_ref {
        Some(id) => doc.get_object_mut(id)?.as_dict_mut()?,
        None if doc.trailer.has(b"Info") => doc.trailer.get_mut(b"Info")?.as_dict_mut()?,
        None => {
            let id = doc.add_object(Dictionary::new());
            doc.trailer.set("Info", Object::Reference(id));
            doc.get_object_mut(id)?.as_dict_mut()?
        }
    };

    for (key, value) in overrides {
        info.set(key.as_str(), Object::string_literal(value.as_str()));
    }

    Ok(())
}

/// Overwrite Info entries of the PDF at `path`
pub fn rewrite_pdf_metadata(path: &Path, overrides: &BTreeMap<String, String>) -> Result<()> {
    let mut doc = Document::load(path).map_err(|e| pdf_error(path, e))?;

    apply_overrides(&mut doc, overrides).map_err(|e| pdf_error(path, e))?;

    // Drop unreferenced objects and compress streams before saving
    doc.prune_objects();
    doc.compress();

    let temp_path = temp_path_for(path);
    if let Err(e) = doc.save(&temp_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(pdf_error(path, e));
    }

    // Atomic replace
    fs::rename(&temp_path, path).map_err(|e| OrganizerError::io(path, e))?;

    tracing::debug!("Rewrote {} metadata field(s) in {}", overrides.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::fixtures::{info_entry, make_test_pdf};
    use tempfile::TempDir;

    fn blank_overrides() -> BTreeMap<String, String> {
        crate::config::AppConfig::default().metadata_overrides
    }

    #[test]
    fn test_existing_info_is_blanked() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("01 Letter [01 May 2024].pdf");
        fs::write(&path, make_test_pdf("Dear Sirs", Some("Privileged draft"))).unwrap();
        assert_eq!(info_entry(&path, "Title").as_deref(), Some("Privileged draft"));

        rewrite_pdf_metadata(&path, &blank_overrides()).unwrap();

        assert_eq!(info_entry(&path, "Title").as_deref(), Some(""));
        assert_eq!(info_entry(&path, "Author").as_deref(), Some(""));
        assert_eq!(info_entry(&path, "Creator").as_deref(), Some(""));
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_missing_info_is_created() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("letter.pdf");
        fs::write(&path, make_test_pdf("Dear Sirs", None)).unwrap();

        let mut overrides = BTreeMap::new();
        overrides.insert("Producer".to_string(), "scrubbed".to_string());
        rewrite_pdf_metadata(&path, &overrides).unwrap();

        assert_eq!(info_entry(&path, "Producer").as_deref(), Some("scrubbed"));
    }

    #[test]
    fn test_unreadable_pdf_is_left_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.pdf");
        fs::write(&path, b"garbage").unwrap();

        assert!(rewrite_pdf_metadata(&path, &blank_overrides()).is_err());
        assert_eq!(fs::read(&path).unwrap(), b"garbage");
        assert!(!temp_path_for(&path).exists());
    }
}
