//! Error types for jenkins-param-audit.
//!
//! Per-job and per-folder failures are recovered locally and downgrade the
//! affected node to an empty or negative result; they never appear here.
//! The variants below cover the few conditions that abort a whole run.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    /// The root listing produced zero leaf jobs, or the root listing itself
    /// failed. Surfaced explicitly instead of a silent empty report.
    #[error("No jobs discovered under {0}")]
    NoJobsDiscovered(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to {operation} {path}: {source}")]
    Io {
        path: PathBuf,
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Regex compilation error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AuditError {
    /// Attach a path and operation name to an I/O error.
    pub fn io(path: impl Into<PathBuf>, operation: &'static str, source: std::io::Error) -> Self {
        AuditError::Io {
            path: path.into(),
            operation,
            source,
        }
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AuditError>;
