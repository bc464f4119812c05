//! Error handling for MWR file checking and normalization.
//!
//! Rule violations found while checking a file are not errors: they are
//! collected as diagnostics in a [`crate::check::ValidationReport`]. The types
//! here cover the failures that stop a single file (structural problems, I/O)
//! or the whole run (configuration).

use std::path::PathBuf;
use thiserror::Error;

/// Failure to interpret a text field as a finite decimal number.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NumericError {
    #[error("not a number: '{value}'")]
    NotNumeric { value: String },

    #[error("not a finite number: '{value}'")]
    NotFinite { value: String },
}

#[derive(Error, Debug)]
pub enum MwrError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Numeric field error: {0}")]
    Numeric(#[from] NumericError),

    #[error("Input directory not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Structural error in file: {path} - {reason}")]
    Structural { path: PathBuf, reason: String },

    #[error("File name '{name}' does not follow the naming convention: {reason}")]
    FileName { name: String, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Cannot write output file: {path} - {reason}")]
    OutputNotWritable { path: PathBuf, reason: String },

    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl MwrError {
    pub fn structural(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Structural {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn file_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FileName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// True for failures caused by the content of one file, as opposed to
    /// the environment or the run configuration.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Self::Structural { .. } | Self::Numeric(_) | Self::Csv(_) | Self::FileName { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MwrError>;
