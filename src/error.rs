//! Error handling for FLIM summary operations.
//!
//! Provides error types with context for discovery, filename parsing,
//! sample loading, table assembly and spreadsheet export failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlimError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Directory traversal error: {0}")]
    DirectoryTraversal(#[from] walkdir::Error),

    #[error("Root directory not found: {path}")]
    RootNotFound { path: PathBuf },

    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Invalid filename: {path} - {reason}")]
    InvalidFilename { path: PathBuf, reason: String },

    #[error("Invalid sample in file {path} at line {line}: {reason}")]
    InvalidSample {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Ragged rows in file {path} at line {line}: expected {expected} columns, found {found}")]
    RaggedRows {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error(
        "Index does not match number of measurements in column {label}: {entries} entries for {distinct} distinct rows"
    )]
    IndexMismatch {
        label: String,
        entries: usize,
        distinct: usize,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl FlimError {
    /// Create an invalid filename error
    pub fn invalid_filename(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidFilename {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FlimError>;
