//! Distribution of new letters into recipient folders.
//!
//! The first destination receives the original by move; every later
//! destination receives a copy of that moved file. A failure at one
//! destination is logged and the rest are still attempted.
//!
//! Existing files are never replaced: a second letter to the same
//! recipient on the same date is filed as `<canonical name> (1).pdf`.

use crate::dates::DateStamp;
use crate::error::{OrganizerError, Result};
use crate::files::{self, checksum, naming};
use std::path::{Path, PathBuf};

/// What happened at one destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Moved(PathBuf),
    Copied(PathBuf),
    Failed(String),
    /// No moved file to copy from because the move failed
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub destination: PathBuf,
    pub outcome: DeliveryOutcome,
}

/// Per-destination results for one letter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributionReport {
    pub filename: String,
    pub deliveries: Vec<Delivery>,
}

impl DistributionReport {
    /// Where the original ended up, if the move succeeded
    pub fn moved_to(&self) -> Option<&Path> {
        self.deliveries.iter().find_map(|d| match &d.outcome {
            DeliveryOutcome::Moved(path) => Some(path.as_path()),
            _ => None,
        })
    }

    pub fn failures(&self) -> usize {
        self.deliveries
            .iter()
            .filter(|d| matches!(d.outcome, DeliveryOutcome::Failed(_) | DeliveryOutcome::Skipped))
            .count()
    }
}

#[derive(Debug, Clone)]
pub struct Distributor {
    organization: String,
}

impl Distributor {
    pub fn new(organization: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
        }
    }

    /// Canonical name for a letter, keeping the source extension
    pub fn canonical_name(&self, source: &Path, recipient: &str, date: &DateStamp) -> String {
        naming::canonical_filename(
            &self.organization,
            recipient,
            &date.formatted,
            &naming::dotted_extension(source),
        )
    }

    /// Rename `source` canonically and file it under `<destination>/<year>/`
    /// for each destination in order.
    pub fn distribute(
        &self,
        source: &Path,
        recipient: &str,
        date: &DateStamp,
        destinations: &[PathBuf],
    ) -> DistributionReport {
        let filename = self.canonical_name(source, recipient, date);
        let mut report = DistributionReport {
            filename: filename.clone(),
            deliveries: Vec::with_capacity(destinations.len()),
        };

        let mut moved: Option<PathBuf> = None;

        for (index, destination) in destinations.iter().enumerate() {
            let outcome = if index == 0 {
                match self.deliver_move(source, destination, &date.year, &filename) {
                    Ok(target) => {
                        tracing::info!("Moved PDF to: {}", target.display());
                        moved = Some(target.clone());
                        DeliveryOutcome::Moved(target)
                    }
                    Err(e) => {
                        tracing::error!("Failed to distribute PDF to {}: {}", destination.display(), e);
                        DeliveryOutcome::Failed(e.to_string())
                    }
                }
            } else if let Some(moved) = &moved {
                match self.deliver_copy(moved, destination, &date.year, &filename) {
                    Ok(target) => {
                        tracing::info!("Copied PDF to: {}", target.display());
                        DeliveryOutcome::Copied(target)
                    }
                    Err(e) => {
                        tracing::error!("Failed to distribute PDF to {}: {}", destination.display(), e);
                        DeliveryOutcome::Failed(e.to_string())
                    }
                }
            } else {
                tracing::warn!(
                    "Skipping {}: original was not moved into {}",
                    destination.display(),
                    destinations[0].display()
                );
                DeliveryOutcome::Skipped
            };

            report.deliveries.push(Delivery {
                destination: destination.clone(),
                outcome,
            });
        }

        report
    }

    /// First free name for `filename` under `<destination>/<year>/`
    fn year_target(&self, destination: &Path, year: &str, filename: &str) -> Result<PathBuf> {
        let year_folder = destination.join(year);
        files::ensure_dir(&year_folder)?;
        Ok(naming::unique_path(&year_folder.join(filename)))
    }

    fn deliver_move(&self, source: &Path, destination: &Path, year: &str, filename: &str) -> Result<PathBuf> {
        let target = self.year_target(destination, year, filename)?;
        files::move_file(source, &target)?;
        Ok(target)
    }

    fn deliver_copy(&self, moved: &Path, destination: &Path, year: &str, filename: &str) -> Result<PathBuf> {
        let target = self.year_target(destination, year, filename)?;
        files::copy_file(moved, &target)?;

        if !checksum::files_match(moved, &target)? {
            return Err(OrganizerError::ChecksumMismatch { path: target });
        }
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn stamp() -> DateStamp {
        DateStamp {
            formatted: "14 March 2024".to_string(),
            year: "2024".to_string(),
        }
    }

    fn create_source(dir: &Path) -> PathBuf {
        let inbox = dir.join("inbox");
        fs::create_dir_all(&inbox).unwrap();
        let source = inbox.join("scan0001.pdf");
        fs::write(&source, b"%PDF-1.4 letter body").unwrap();
        source
    }

    #[test]
    fn test_canonical_name_keeps_extension() {
        let distributor = Distributor::new("Mishcon de Reya");
        assert_eq!(
            distributor.canonical_name(Path::new("in/scan.PDF"), "Fortis Insolvency", &stamp()),
            "Mishcon de Reya — Letter to Fortis Insolvency [14 March 2024].PDF"
        );
        assert_eq!(
            distributor.canonical_name(Path::new("in/scan.pdf"), "Kambiz Babaee", &DateStamp::unknown()),
            "Mishcon de Reya — Letter to Kambiz Babaee [Unknown Date].pdf"
        );
    }

    #[test]
    fn test_move_then_copy() {
        let temp_dir = TempDir::new().unwrap();
        let source = create_source(temp_dir.path());
        let first = temp_dir.path().join("bhupen");
        let second = temp_dir.path().join("kambiz");

        let report = Distributor::new("Mishcon de Reya").distribute(
            &source,
            "All Defendants",
            &stamp(),
            &[first.clone(), second.clone()],
        );

        let name = "Mishcon de Reya — Letter to All Defendants [14 March 2024].pdf";
        let moved = first.join("2024").join(name);
        let copied = second.join("2024").join(name);

        assert!(!source.exists());
        assert_eq!(report.moved_to(), Some(moved.as_path()));
        assert_eq!(report.failures(), 0);
        assert_eq!(fs::read(&moved).unwrap(), b"%PDF-1.4 letter body");
        assert_eq!(fs::read(&copied).unwrap(), fs::read(&moved).unwrap());
    }

    #[test]
    fn test_same_name_letters_are_both_kept() {
        let temp_dir = TempDir::new().unwrap();
        let inbox = temp_dir.path().join("inbox");
        fs::create_dir_all(&inbox).unwrap();
        let first_letter = inbox.join("a.pdf");
        let second_letter = inbox.join("b.pdf");
        fs::write(&first_letter, b"LETTER ONE").unwrap();
        fs::write(&second_letter, b"LETTER TWO").unwrap();
        let kambiz = temp_dir.path().join("kambiz");
        let bhupen = temp_dir.path().join("bhupen");
        let distributor = Distributor::new("Mishcon de Reya");

        let first = distributor.distribute(&first_letter, "Kambiz Babaee", &stamp(), &[kambiz.clone()]);
        let second = distributor.distribute(
            &second_letter,
            "Kambiz Babaee",
            &stamp(),
            &[kambiz.clone(), bhupen.clone()],
        );

        let name = "Mishcon de Reya — Letter to Kambiz Babaee [14 March 2024].pdf";
        let suffixed = "Mishcon de Reya — Letter to Kambiz Babaee [14 March 2024] (1).pdf";
        assert_eq!(first.failures(), 0);
        assert_eq!(second.failures(), 0);
        assert_eq!(second.moved_to(), Some(kambiz.join("2024").join(suffixed).as_path()));
        assert_eq!(fs::read(kambiz.join("2024").join(name)).unwrap(), b"LETTER ONE");
        assert_eq!(fs::read(kambiz.join("2024").join(suffixed)).unwrap(), b"LETTER TWO");
        // No clash in the second destination, so the plain name is used there
        assert_eq!(fs::read(bhupen.join("2024").join(name)).unwrap(), b"LETTER TWO");
    }

    #[test]
    fn test_failed_copy_keeps_moved_file() {
        let temp_dir = TempDir::new().unwrap();
        let source = create_source(temp_dir.path());
        let first = temp_dir.path().join("bhupen");
        // A plain file where the second destination folder should be
        let second = temp_dir.path().join("kambiz");
        fs::write(&second, b"not a directory").unwrap();

        let report = Distributor::new("Mishcon de Reya").distribute(
            &source,
            "All Defendants",
            &stamp(),
            &[first.clone(), second.clone()],
        );

        assert!(matches!(report.deliveries[1].outcome, DeliveryOutcome::Failed(_)));
        assert_eq!(report.failures(), 1);
        let moved = report.moved_to().unwrap();
        assert!(moved.starts_with(&first));
        assert_eq!(fs::read(moved).unwrap(), b"%PDF-1.4 letter body");
    }

    #[test]
    fn test_failed_move_skips_copies() {
        let temp_dir = TempDir::new().unwrap();
        let source = create_source(temp_dir.path());
        let first = temp_dir.path().join("bhupen");
        fs::write(&first, b"not a directory").unwrap();
        let second = temp_dir.path().join("kambiz");

        let report = Distributor::new("Mishcon de Reya").distribute(
            &source,
            "All Defendants",
            &stamp(),
            &[first, second.clone()],
        );

        assert!(source.exists());
        assert!(report.moved_to().is_none());
        assert_eq!(report.deliveries[1].outcome, DeliveryOutcome::Skipped);
        assert!(!second.exists());
    }
}
