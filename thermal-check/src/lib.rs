//! File formats, report writers, and CLI plumbing around [`acis_obs`].

pub mod args;
pub mod input;
pub mod report;

use std::path::PathBuf;

/// Errors reading inputs or writing reports.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Check(#[from] acis_obs::ThermalCheckError),

    #[error("unsupported file type for {0:?} (expected .json or .csv)")]
    UnsupportedFormat(PathBuf),
}

pub type Result<T> = std::result::Result<T, IoError>;
