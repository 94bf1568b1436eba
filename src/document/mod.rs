//! Document backend
//!
//! Text extraction and metadata scrubbing for letters. The workflow talks
//! to a [`DocumentBackend`] so tests can substitute canned text.

mod metadata;
mod parser;

#[cfg(test)]
pub(crate) mod fixtures;

use crate::error::Result;
use crate::files::{self, lock};
use std::collections::BTreeMap;
use std::path::Path;
use walkdir::WalkDir;

pub use metadata::rewrite_pdf_metadata;
pub use parser::extract_pdf_text;

pub trait DocumentBackend {
    /// Full text of the document, or an empty string if it cannot be read
    fn extract_text(&self, path: &Path) -> String;

    /// Overwrite the given Info entries, replacing the file atomically
    fn rewrite_metadata(&self, path: &Path, overrides: &BTreeMap<String, String>) -> Result<()>;
}

/// pdf-extract for text, lopdf for metadata
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfBackend;

impl DocumentBackend for PdfBackend {
    fn extract_text(&self, path: &Path) -> String {
        match extract_pdf_text(path) {
            Ok(text) => {
                tracing::info!("Extracted text from PDF: {}", path.display());
                text
            }
            Err(e) => {
                tracing::error!("Failed to read PDF {}: {}", path.display(), e);
                String::new()
            }
        }
    }

    fn rewrite_metadata(&self, path: &Path, overrides: &BTreeMap<String, String>) -> Result<()> {
        rewrite_pdf_metadata(path, overrides)
    }
}

/// Statistics from a metadata scrub
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrubStats {
    pub updated: usize,
    pub skipped_locked: usize,
    pub errors: usize,
}

/// Rewrite metadata on every PDF under `root`, skipping locked files
pub fn scrub_tree(
    backend: &dyn DocumentBackend,
    root: &Path,
    overrides: &BTreeMap<String, String>,
) -> ScrubStats {
    let mut stats = ScrubStats::default();

    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::error!("Error walking {}: {}", root.display(), e);
                stats.errors += 1;
                continue;
            }
        };

        let path = entry.path();
        if !entry.file_type().is_file() || !files::is_pdf(path) {
            continue;
        }

        if lock::is_locked(path) {
            tracing::warn!("Skipping locked PDF for metadata: {}", path.display());
            stats.skipped_locked += 1;
            continue;
        }

        match backend.rewrite_metadata(path, overrides) {
            Ok(()) => {
                tracing::info!("Metadata updated: {}", path.display());
                stats.updated += 1;
            }
            Err(e) => {
                tracing::error!("Metadata update failed: {}", e);
                stats.errors += 1;
            }
        }
    }

    stats
}
