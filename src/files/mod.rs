//! Filesystem primitives used by the distributor, sequencer and validators.

pub mod checksum;
pub mod lock;
pub mod naming;

use crate::error::{OrganizerError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Move a file, falling back to copy + remove when a rename is not possible
/// (e.g. source and target live on different drives).
pub fn move_file(source: &Path, target: &Path) -> Result<()> {
    match fs::rename(source, target) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            tracing::debug!(
                "Rename {} -> {} failed ({}), copying instead",
                source.display(),
                target.display(),
                rename_err
            );
            fs::copy(source, target).map_err(|e| OrganizerError::io(target, e))?;
            fs::remove_file(source).map_err(|e| OrganizerError::io(source, e))?;
            Ok(())
        }
    }
}

/// Copy a file, overwriting the target
pub fn copy_file(source: &Path, target: &Path) -> Result<()> {
    fs::copy(source, target)
        .map(|_| ())
        .map_err(|e| OrganizerError::io(target, e))
}

/// Create a directory (and parents) if it does not exist yet
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| OrganizerError::io(path, e))
}

/// Every entry directly inside `dir` (files and directories), sorted by name
pub fn list_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| OrganizerError::io(dir, e))?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(e) => Some(e.path()),
            Err(e) => {
                tracing::warn!("Error reading entry in {}: {}", dir.display(), e);
                None
            }
        })
        .collect();

    paths.sort();
    Ok(paths)
}

/// Regular files directly inside `dir`, sorted by name
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(list_entries(dir)?.into_iter().filter(|p| p.is_file()).collect())
}

/// File name as an owned string (lossy), empty when the path has none
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Case-insensitive `.pdf` check on the file name
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_move_file() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("a.pdf");
        let target = temp_dir.path().join("b.pdf");
        fs::write(&source, b"letter").unwrap();

        move_file(&source, &target).unwrap();

        assert!(!source.exists());
        assert_eq!(fs::read(&target).unwrap(), b"letter");
    }

    #[test]
    fn test_list_files_skips_directories() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.pdf"), b"").unwrap();
        fs::write(temp_dir.path().join("a.txt"), b"").unwrap();
        fs::create_dir(temp_dir.path().join("2024")).unwrap();

        let names: Vec<String> = list_files(temp_dir.path())
            .unwrap()
            .iter()
            .map(|p| file_name(p))
            .collect();
        assert_eq!(names, vec!["a.txt", "b.pdf"]);

        let entries: Vec<String> = list_entries(temp_dir.path())
            .unwrap()
            .iter()
            .map(|p| file_name(p))
            .collect();
        assert_eq!(entries, vec!["2024", "a.txt", "b.pdf"]);
    }

    #[test]
    fn test_is_pdf() {
        assert!(is_pdf(Path::new("x/Letter.PDF")));
        assert!(!is_pdf(Path::new("x/Letter.pdf.temp")));
        assert!(!is_pdf(Path::new("x/pdf")));
    }
}
