//! Folder sequencing
//!
//! Renumbers the letters in a folder by the date in their bracketed
//! segment. Each folder pass runs three phases in order:
//!
//! 1. Remove temp-marked leftovers from an interrupted run.
//! 2. Strip cosmetic suffixes and old sequence numbers, then rename every
//!    PDF to `<temp prefix><clean name>` so the final names cannot collide
//!    with files that have not been renumbered yet.
//! 3. Sort the temp-marked files by (date, clean name) and rename them to
//!    `NN <clean name>`.
//!
//! Numbers are re-derived from scratch on every pass, so running a pass
//! twice over an unchanged folder gives the same names.
//!
//! Letters without a parseable date never stay temp-marked: phase 3 puts
//! them back under their clean name, otherwise the next phase 1 would
//! delete them. Under [`UndatedPolicy::Fail`] the folder is checked before
//! phase 1 and left untouched when any letter is undated.

use crate::config::{AppConfig, UndatedPolicy};
use crate::dates::parse_bracketed_date;
use crate::error::{OrganizerError, Result};
use crate::files::{self, lock, naming};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Outcome of one folder pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceReport {
    pub folder: PathBuf,
    /// Stale temp entries removed in phase 1
    pub removed_temp: usize,
    /// Files renamed to their temp form in phase 2
    pub staged: usize,
    /// Final paths, in sequence order
    pub sequenced: Vec<PathBuf>,
    /// Letters left unnumbered because their date did not parse, at the
    /// clean name they were restored to
    pub undated: Vec<PathBuf>,
    /// Per-file operations that failed and were skipped
    pub failures: usize,
}

/// Outcome of a tree-wide run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeSummary {
    pub folders_processed: usize,
    pub files_sequenced: usize,
    pub undated: Vec<PathBuf>,
    /// Folders whose pass returned an error
    pub failed_folders: Vec<PathBuf>,
}

impl TreeSummary {
    pub fn is_success(&self) -> bool {
        self.failed_folders.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct FolderSequencer {
    temp_prefix: String,
    undated_policy: UndatedPolicy,
}

impl FolderSequencer {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_settings(config.temp_prefix.clone(), config.undated_policy)
    }

    pub fn with_settings(temp_prefix: impl Into<String>, undated_policy: UndatedPolicy) -> Self {
        Self {
            temp_prefix: temp_prefix.into(),
            undated_policy,
        }
    }

    fn is_temp(&self, name: &str) -> bool {
        name.starts_with(&self.temp_prefix)
    }

    /// Non-temp PDFs whose cleaned name has no parseable bracketed date.
    /// Read-only.
    pub fn find_undated(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        Ok(files::list_files(dir)?
            .into_iter()
            .filter(|path| {
                let name = files::file_name(path);
                files::is_pdf(path)
                    && !self.is_temp(&name)
                    && parse_bracketed_date(&naming::clean_filename(&name)).is_none()
            })
            .collect())
    }

    /// Phase 1: delete temp-marked entries.
    ///
    /// Returns (removed, failed).
    pub fn clean_temp_files(&self, dir: &Path) -> Result<(usize, usize)> {
        let mut removed = 0;
        let mut failed = 0;

        for path in files::list_entries(dir)? {
            if !self.is_temp(&files::file_name(&path)) {
                continue;
            }

            match fs::remove_file(&path) {
                Ok(()) => {
                    tracing::info!("Removed temp file: {}", path.display());
                    removed += 1;
                }
                Err(e) => {
                    tracing::error!("Failed to remove temp file {}: {}", path.display(), e);
                    failed += 1;
                }
            }
        }

        Ok((removed, failed))
    }

    /// Phase 2: clean names and move every PDF to its temp form.
    ///
    /// Returns (staged, failed).
    pub fn stage_for_ordering(&self, dir: &Path) -> Result<(usize, usize)> {
        let mut staged = 0;
        let mut failed = 0;

        for path in files::list_files(dir)? {
            let name = files::file_name(&path);
            if !files::is_pdf(&path) || self.is_temp(&name) {
                continue;
            }

            if lock::is_locked(&path) {
                tracing::error!("File locked during temp rename: {}", path.display());
                failed += 1;
                continue;
            }

            let cleaned = naming::clean_filename(&name);
            let temp_path = naming::unique_path(&dir.join(format!("{}{}", self.temp_prefix, cleaned)));

            match fs::rename(&path, &temp_path) {
                Ok(()) => {
                    tracing::info!("Temp renamed: {} -> {}", path.display(), temp_path.display());
                    staged += 1;
                }
                Err(e) => {
                    tracing::error!("Failed temp rename of {}: {}", path.display(), e);
                    failed += 1;
                }
            }
        }

        Ok((staged, failed))
    }

    /// Phase 3: order temp-marked files by (date, clean name) and number them.
    ///
    /// Undated files are renamed back to their clean name instead.
    pub fn rename_in_sequence(&self, dir: &Path, report: &mut SequenceReport) -> Result<()> {
        let mut working_set: Vec<(String, NaiveDate)> = Vec::new();

        for path in files::list_files(dir)? {
            let name = files::file_name(&path);
            let Some(clean) = name.strip_prefix(&self.temp_prefix) else {
                continue;
            };

            match parse_bracketed_date(clean) {
                Some(date) => working_set.push((clean.to_string(), date)),
                None => self.restore_undated(&path, &dir.join(clean), report),
            }
        }

        working_set.sort_by(|(a_name, a_date), (b_name, b_date)| {
            a_date.cmp(b_date).then_with(|| a_name.cmp(b_name))
        });

        for (index, (clean, _)) in working_set.iter().enumerate() {
            let old_path = dir.join(format!("{}{}", self.temp_prefix, clean));
            let mut new_path = dir.join(naming::sequenced_filename(index + 1, clean));

            // Held by a locked file that phase 2 skipped
            if new_path.exists() {
                let free = naming::unique_path(&new_path);
                tracing::error!(
                    "Sequence target {} already exists, using {}",
                    new_path.display(),
                    free.display()
                );
                report.failures += 1;
                new_path = free;
            }

            match fs::rename(&old_path, &new_path) {
                Ok(()) => {
                    tracing::info!(
                        "Renamed for sequence: {} -> {}",
                        old_path.display(),
                        new_path.display()
                    );
                    report.sequenced.push(new_path);
                }
                Err(e) => {
                    tracing::error!("Sequence rename failed for {}: {}", old_path.display(), e);
                    report.failures += 1;
                }
            }
        }

        Ok(())
    }

    fn restore_undated(&self, temp_path: &Path, clean_path: &Path, report: &mut SequenceReport) {
        let target = naming::unique_path(clean_path);
        match fs::rename(temp_path, &target) {
            Ok(()) => report.undated.push(target),
            Err(e) => {
                tracing::error!("Failed to restore undated file {}: {}", temp_path.display(), e);
                report.failures += 1;
                report.undated.push(temp_path.to_path_buf());
            }
        }
    }

    /// Run all three phases over a single folder
    pub fn process_folder(&self, dir: &Path) -> Result<SequenceReport> {
        if self.undated_policy == UndatedPolicy::Fail {
            let undated = self.find_undated(dir)?;
            if !undated.is_empty() {
                for path in &undated {
                    tracing::error!("No parseable date: {}", path.display());
                }
                return Err(OrganizerError::UndatedFiles {
                    folder: dir.to_path_buf(),
                    count: undated.len(),
                });
            }
        }

        let mut report = SequenceReport {
            folder: dir.to_path_buf(),
            ..Default::default()
        };

        let (removed, failed) = self.clean_temp_files(dir)?;
        report.removed_temp = removed;
        report.failures += failed;
        let (staged, failed) = self.stage_for_ordering(dir)?;
        report.staged = staged;
        report.failures += failed;
        self.rename_in_sequence(dir, &mut report)?;

        for path in &report.undated {
            tracing::warn!("No parseable date, left unnumbered: {}", path.display());
        }

        tracing::info!(
            "Folder processed: {} ({} sequenced, {} undated)",
            dir.display(),
            report.sequenced.len(),
            report.undated.len()
        );

        Ok(report)
    }

    /// Apply the folder pass to every directory under `root` (root included)
    /// that holds at least one file.
    pub fn process_tree(&self, root: &Path) -> Result<TreeSummary> {
        let mut folders = Vec::new();
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                OrganizerError::io(path, e.into())
            })?;

            if entry.file_type().is_dir() {
                folders.push(entry.into_path());
            }
        }

        let mut summary = TreeSummary::default();

        for folder in folders {
            let has_files = match files::list_files(&folder) {
                Ok(list) => !list.is_empty(),
                Err(e) => {
                    tracing::error!("Skipping folder {}: {}", folder.display(), e);
                    summary.failed_folders.push(folder);
                    continue;
                }
            };
            if !has_files {
                continue;
            }

            match self.process_folder(&folder) {
                Ok(report) => {
                    summary.folders_processed += 1;
                    summary.files_sequenced += report.sequenced.len();
                    summary.undated.extend(report.undated);
                }
                Err(e) => {
                    tracing::error!("Folder pass failed for {}: {}", folder.display(), e);
                    summary.failed_folders.push(folder);
                }
            }
        }

        Ok(summary)
    }
}
