//! Error types shared across the organizer.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum OrganizerError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("PDF error for {path}: {message}")]
    Pdf { path: PathBuf, message: String },

    #[error("Copy of {path} does not match its source")]
    ChecksumMismatch { path: PathBuf },

    #[error("{count} file(s) in {folder} have no parseable date; folder left unchanged")]
    UndatedFiles { folder: PathBuf, count: usize },
}

impl OrganizerError {
    /// Wrap an `io::Error` with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OrganizerError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        OrganizerError::Config {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OrganizerError>;
