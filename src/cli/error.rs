//! CLI-specific error types

use crate::error::RefinerError;
use std::path::PathBuf;
use thiserror::Error;

/// CLI-specific error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to write file {0}: {1}")]
    FileWriteError(PathBuf, String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Refinement error: {0}")]
    RefinerError(#[from] RefinerError),

    #[error("Refinement cancelled")]
    Interrupted,
}
