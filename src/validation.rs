//! Pre-flight validation
//!
//! Read-only checks that gate the tree-wide sequencing run. Nothing in a
//! tree is renamed unless both validators pass for that tree.

use crate::config::AppConfig;
use crate::dates::parse_bracketed_date;
use crate::files::{self, lock};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A problem found by a validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// PDF whose name has no parseable `[DD Month YYYY]` segment
    MissingDate { path: PathBuf },
    /// File currently held by another process
    Locked { path: PathBuf },
    /// Directory entry that could not be read
    Unreadable { path: PathBuf, message: String },
}

impl ValidationIssue {
    pub fn description(&self) -> String {
        match self {
            ValidationIssue::MissingDate { path } => {
                format!("Missing date in filename: {}", path.display())
            }
            ValidationIssue::Locked { path } => {
                format!("Locked file detected: {}", path.display())
            }
            ValidationIssue::Unreadable { path, message } => {
                format!("Unreadable entry {}: {}", path.display(), message)
            }
        }
    }
}

/// Result of validating one tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub root: PathBuf,
    pub paths_checked: usize,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            ..Default::default()
        }
    }

    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Combine two reports for the same root
    pub fn merge(mut self, other: ValidationReport) -> Self {
        self.paths_checked += other.paths_checked;
        self.issues.extend(other.issues);
        self
    }
}

/// Regular files under `root`; unreadable entries are recorded on the report
fn walk_files(root: &Path, report: &mut ValidationReport) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    for entry in WalkDir::new(root) {
        match entry {
            Ok(e) if e.file_type().is_file() => paths.push(e.into_path()),
            Ok(_) => {}
            Err(e) => {
                let issue = ValidationIssue::Unreadable {
                    path: e.path().unwrap_or(root).to_path_buf(),
                    message: e.to_string(),
                };
                tracing::error!("{}", issue.description());
                report.issues.push(issue);
            }
        }
    }

    paths
}

/// Every non-temp PDF must carry a parseable bracketed date
#[derive(Debug, Clone)]
pub struct DateValidator {
    temp_prefix: String,
}

impl DateValidator {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            temp_prefix: config.temp_prefix.clone(),
        }
    }

    /// Reports every offending file, not just the first
    pub fn validate(&self, root: &Path) -> ValidationReport {
        let mut report = ValidationReport::new(root);

        for path in walk_files(root, &mut report) {
            let name = files::file_name(&path);
            if !files::is_pdf(&path) || name.starts_with(&self.temp_prefix) {
                continue;
            }

            report.paths_checked += 1;
            if parse_bracketed_date(&name).is_none() {
                let issue = ValidationIssue::MissingDate { path };
                tracing::error!("{}", issue.description());
                report.issues.push(issue);
            }
        }

        report
    }
}

/// No supported file may be held open by another process
#[derive(Debug, Clone)]
pub struct LockValidator {
    config: AppConfig,
}

impl LockValidator {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Stops at the first locked file
    pub fn validate(&self, root: &Path) -> ValidationReport {
        let mut report = ValidationReport::new(root);

        for path in walk_files(root, &mut report) {
            if !self.config.is_supported(&path) {
                continue;
            }

            report.paths_checked += 1;
            if lock::is_locked(&path) {
                let issue = ValidationIssue::Locked { path };
                tracing::error!("{}", issue.description());
                report.issues.push(issue);
                break;
            }
        }

        report
    }
}

/// Run both validators; the lock check is skipped when dates already failed
pub fn preflight(config: &AppConfig, root: &Path) -> ValidationReport {
    let dates = DateValidator::new(config).validate(root);
    if !dates.is_valid() {
        return dates;
    }
    dates.merge(LockValidator::new(config).validate(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fs2::FileExt;
    use std::fs;
    use tempfile::TempDir;

    fn create_tree() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let year = temp_dir.path().join("2024");
        fs::create_dir_all(&year).unwrap();
        fs::write(year.join("01 Letter [01 May 2024].pdf"), b"a").unwrap();
        fs::write(year.join("Letter [02 May 2024].pdf"), b"b").unwrap();
        fs::write(year.join("notes.txt"), b"no date needed").unwrap();
        temp_dir
    }

    #[test]
    fn test_dated_tree_passes() {
        let tree = create_tree();
        let report = DateValidator::new(&AppConfig::default()).validate(tree.path());
        assert!(report.is_valid());
        assert_eq!(report.paths_checked, 2);
    }

    #[test]
    fn test_missing_dates_are_all_reported() {
        let tree = create_tree();
        let year = tree.path().join("2024");
        fs::write(year.join("Scan.pdf"), b"").unwrap();
        fs::write(year.join("Letter [Unknown Date].pdf"), b"").unwrap();
        // Temp-marked files are not checked
        fs::write(year.join("temp_Whatever.pdf"), b"").unwrap();

        let report = DateValidator::new(&AppConfig::default()).validate(tree.path());

        assert!(!report.is_valid());
        assert_eq!(report.issues.len(), 2);
        assert!(report
            .issues
            .iter()
            .all(|i| matches!(i, ValidationIssue::MissingDate { .. })));
    }

    #[test]
    fn test_locked_file_fails_lock_validation() {
        let tree = create_tree();
        let locked = tree.path().join("2024").join("Letter [02 May 2024].pdf");
        let holder = fs::File::open(&locked).unwrap();
        holder.lock_exclusive().unwrap();

        let report = LockValidator::new(&AppConfig::default()).validate(tree.path());

        assert_eq!(report.issues, vec![ValidationIssue::Locked { path: locked }]);
    }

    #[test]
    fn test_preflight_gate_leaves_names_unchanged() {
        let tree = create_tree();
        let year = tree.path().join("2024");
        fs::write(year.join("Undated letter.pdf"), b"").unwrap();

        let mut before: Vec<_> = fs::read_dir(&year).unwrap().map(|e| e.unwrap().file_name()).collect();
        before.sort();

        let report = preflight(&AppConfig::default(), tree.path());
        assert!(!report.is_valid());

        let mut after: Vec<_> = fs::read_dir(&year).unwrap().map(|e| e.unwrap().file_name()).collect();
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn test_preflight_passes_clean_tree() {
        let tree = create_tree();
        let report = preflight(&AppConfig::default(), tree.path());
        assert!(report.is_valid());
        // 2 PDFs for dates, 2 PDFs for locks (txt is not a supported extension)
        assert_eq!(report.paths_checked, 4);
    }
}
