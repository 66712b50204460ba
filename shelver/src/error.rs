//! Error types for the organizer
//!
//! Only `OrganizeError::Configuration` aborts a run. Every other variant is
//! scoped to one file and ends up as a log line plus a counter.

use std::path::PathBuf;
use thiserror::Error;

/// Organizer errors
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// Pre-flight problem: source missing, destination unwritable, bad settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Move, copy or mkdir failed for one file
    #[error("File system error on {}: {}", .path.display(), .message)]
    FileSystem { path: PathBuf, message: String },

    /// Source tree could not be scanned
    #[error(transparent)]
    Scan(#[from] crate::services::file_scanner::ScanError),
}

impl OrganizeError {
    pub fn file_system(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        OrganizeError::FileSystem {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// True for errors that must stop the run before any file is touched
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            OrganizeError::Configuration(_) | OrganizeError::Scan(_)
        )
    }
}

/// Result type for organizer operations
pub type OrganizeResult<T> = Result<T, OrganizeError>;
