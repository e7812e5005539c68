//! Error types for the tldr cache and renderer.

use std::io;
use std::path::Path;

use thiserror::Error;

/// Errors that can occur while managing the page cache.
#[derive(Debug, Error)]
pub enum TldrError {
    /// The cache directory (or the home directory it derives from) could not be resolved.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Fetch transport failure or non-success response.
    #[error("Network error: {0}")]
    Network(String),

    /// Corrupt archive or a filesystem failure while unpacking it.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Requested page or platform directory is absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed history line, or a page name no history line can hold.
    #[error("Parse error on line {line}: {message}")]
    Parse {
        /// 1-based line in the history file; 0 when no line is involved.
        line: usize,
        message: String,
    },

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl TldrError {
    /// Builds a `NotFound` error naming the missing path.
    pub(crate) fn missing(path: &Path) -> Self {
        TldrError::NotFound(path.display().to_string())
    }

    /// Returns true if this is a `NotFound` error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, TldrError::NotFound(_))
    }
}

impl From<reqwest::Error> for TldrError {
    fn from(e: reqwest::Error) -> Self {
        TldrError::Network(e.to_string())
    }
}

impl From<zip::result::ZipError> for TldrError {
    fn from(e: zip::result::ZipError) -> Self {
        TldrError::Extraction(e.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TldrError>;
