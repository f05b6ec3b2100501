//! Error taxonomy for the refinement pipeline

use std::path::PathBuf;
use thiserror::Error;

use crate::database::DatabaseError;

/// Error type for refinement operations
#[derive(Debug, Error)]
pub enum RefinerError {
    /// Filesystem access failed
    #[error("IO error at {0}: {1}")]
    Io(PathBuf, String),

    /// Input payload could not be decoded
    #[error("Failed to parse {0}: {1}")]
    Parse(PathBuf, String),

    /// Record violates a model invariant
    #[error("Validation error: {0}")]
    Validation(String),

    /// Encrypting the refined store failed
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Content-addressed store rejected or never received the upload
    #[error("Upload error: {0}")]
    Upload(String),

    /// Missing or invalid configuration value
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Relational store failure
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// The run was cancelled before completion
    #[error("Operation cancelled")]
    Cancelled,
}

impl RefinerError {
    /// Build an IO error for the given path
    pub fn io(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        RefinerError::Io(path.into(), err.to_string())
    }

    /// Short machine-friendly name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            RefinerError::Io(..) => "io",
            RefinerError::Parse(..) => "parse",
            RefinerError::Validation(_) => "validation",
            RefinerError::Encryption(_) => "encryption",
            RefinerError::Upload(_) => "upload",
            RefinerError::Configuration(_) => "configuration",
            RefinerError::Database(_) => "database",
            RefinerError::Cancelled => "cancelled",
        }
    }
}

/// Result type for refinement operations
pub type RefinerResult<T> = Result<T, RefinerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_names() {
        assert_eq!(RefinerError::io("/tmp/x", "boom").kind(), "io");
        assert_eq!(RefinerError::Validation("empty".into()).kind(), "validation");
        assert_eq!(RefinerError::Cancelled.kind(), "cancelled");
    }

    #[test]
    fn test_io_error_display_includes_path() {
        let err = RefinerError::io("/input", "No such file or directory");
        assert_eq!(
            err.to_string(),
            "IO error at /input: No such file or directory"
        );
    }
}
