//! Client for the Chandra observation catalog (Obscat).
//!
//! [`OcatClient`] fetches grating, count rate, and approved exposure for a
//! set of obsids and implements [`acis_obs::CatalogLookup`], so a failed
//! request degrades the review instead of aborting it.

pub mod client;
pub mod table;

pub use client::OcatClient;
pub use table::{catalog_entries, ObsidRow, OcatTable};

/// Errors talking to the Obscat or reading its replies.
#[derive(Debug, thiserror::Error)]
pub enum OcatError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(String),
    /// Connection failed
    #[error("Connection error: {0}")]
    Connection(String),
    /// Request timed out
    #[error("Timeout")]
    Timeout,
    /// Server returned an error status
    #[error("Server error (status {status}): {message}")]
    ServerError { status: u16, message: String },
    /// Reply could not be read as a table
    #[error("Parse error: {0}")]
    Parse(String),
    /// Reply table lacks a required column
    #[error("missing column {0}")]
    MissingColumn(&'static str),
    /// Async runtime could not be started
    #[error("runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

impl From<reqwest::Error> for OcatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            OcatError::Timeout
        } else if err.is_connect() {
            OcatError::Connection(err.to_string())
        } else {
            OcatError::Http(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, OcatError>;
