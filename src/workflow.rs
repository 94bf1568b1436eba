//! End-to-end processing workflow
//!
//! 1. File every new PDF from the input directory.
//! 2. For each output root: validate, then re-sequence every folder.
//! 3. Scrub metadata on every PDF under the output roots.
//!
//! Step 2 stops at the first root that fails validation; step 3 only runs
//! when step 2 succeeded.

use crate::config::AppConfig;
use crate::dates::extract_date;
use crate::distribute::{DistributionReport, Distributor};
use crate::document::{scrub_tree, DocumentBackend, PdfBackend};
use crate::error::Result;
use crate::files;
use crate::recipients::RecipientClassifier;
use crate::sequencer::FolderSequencer;
use crate::validation::preflight;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    Completed,
    /// A pre-flight validator rejected this root; nothing in it was renamed
    ValidationFailed { root: PathBuf },
    /// One or more folders under this root failed their sequencing pass
    SequencingFailed { root: PathBuf },
}

impl WorkflowOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, WorkflowOutcome::Completed)
    }
}

pub struct DocumentWorkflow {
    config: AppConfig,
    backend: Box<dyn DocumentBackend>,
    classifier: RecipientClassifier,
    distributor: Distributor,
    sequencer: FolderSequencer,
}

impl DocumentWorkflow {
    pub fn new(config: AppConfig) -> Self {
        Self::with_backend(config, Box::new(PdfBackend))
    }

    pub fn with_backend(config: AppConfig, backend: Box<dyn DocumentBackend>) -> Self {
        Self {
            classifier: RecipientClassifier::new(&config),
            distributor: Distributor::new(config.organization.clone()),
            sequencer: FolderSequencer::new(&config),
            backend,
            config,
        }
    }

    /// Classify, rename and file every PDF in the input directory
    pub fn process_input_pdfs(&self) -> Result<Vec<DistributionReport>> {
        let input = &self.config.input_directory;
        if !input.is_dir() {
            tracing::warn!("Input directory not found, skipping: {}", input.display());
            return Ok(Vec::new());
        }

        let mut reports = Vec::new();

        for path in files::list_files(input)? {
            if !files::is_pdf(&path) {
                continue;
            }

            tracing::info!("Processing input PDF: {}", path.display());

            let text = self.backend.extract_text(&path);
            if text.is_empty() {
                tracing::warn!("No text extracted, leaving in place: {}", path.display());
                continue;
            }

            let classification = self.classifier.classify(&text);
            let date = extract_date(&text);
            tracing::info!(
                "Document analysis complete - Recipient: {}, Date: {}",
                classification.recipient,
                date.formatted
            );

            reports.push(self.distributor.distribute(
                &path,
                &classification.recipient,
                &date,
                &classification.destinations,
            ));
        }

        Ok(reports)
    }

    /// Validate and re-sequence each output root in order
    pub fn process_existing_files(&self) -> Result<WorkflowOutcome> {
        for root in &self.config.output_roots {
            if !root.path.is_dir() {
                tracing::warn!("Output root not found, skipping: {}", root.path.display());
                continue;
            }

            let report = preflight(&self.config, &root.path);
            if !report.is_valid() {
                tracing::error!(
                    "Validation failed for directory: {} ({} issue(s))",
                    root.path.display(),
                    report.issues.len()
                );
                return Ok(WorkflowOutcome::ValidationFailed {
                    root: root.path.clone(),
                });
            }

            let summary = self.sequencer.process_tree(&root.path)?;
            tracing::info!(
                "Sequenced {} file(s) across {} folder(s) under {}",
                summary.files_sequenced,
                summary.folders_processed,
                root.path.display()
            );

            if !summary.is_success() {
                tracing::error!(
                    "{} folder(s) failed under {}",
                    summary.failed_folders.len(),
                    root.path.display()
                );
                return Ok(WorkflowOutcome::SequencingFailed {
                    root: root.path.clone(),
                });
            }
        }

        Ok(WorkflowOutcome::Completed)
    }

    /// Scrub metadata on every PDF under every existing output root
    pub fn update_all_pdf_metadata(&self) {
        for root in &self.config.output_roots {
            if !root.path.is_dir() {
                continue;
            }
            let stats = scrub_tree(self.backend.as_ref(), &root.path, &self.config.metadata_overrides);
            tracing::info!(
                "Metadata scrub for {}: {} updated, {} locked, {} failed",
                root.path.display(),
                stats.updated,
                stats.skipped_locked,
                stats.errors
            );
        }
    }

    pub fn execute(&self) -> Result<WorkflowOutcome> {
        tracing::info!("Starting PDF processing workflow");

        let reports = self.process_input_pdfs()?;
        let failed: usize = reports.iter().map(|r| r.failures()).sum();
        tracing::info!("Filed {} new letter(s), {} delivery failure(s)", reports.len(), failed);

        let outcome = self.process_existing_files()?;
        if !outcome.is_success() {
            tracing::error!("Existing file processing failed");
            return Ok(outcome);
        }

        self.update_all_pdf_metadata();

        tracing::info!("PDF processing workflow completed successfully");
        Ok(outcome)
    }
}
