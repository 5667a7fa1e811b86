//! Error types for the PDF sanitization pipeline.
//!
//! Decode and per-page render failures are fatal for the whole document and
//! abort the pipeline with no partial output. Verification mismatches are
//! deliberately NOT represented here: a document that fails verification is
//! still returned to the caller, carrying a non-success report.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sanitization operations.
pub type ScrubResult<T> = Result<T, ScrubError>;

/// Error type for all pipeline operations.
#[derive(Error, Debug)]
pub enum ScrubError {
    /// The input document could not be parsed or opened.
    #[error("failed to decode document: {0}")]
    Decode(String),

    /// A specific page could not be rasterized or rebuilt. Fatal for the
    /// whole document; a partially redacted output is a security hazard.
    #[error("failed to render page {page}: {message}")]
    PageRender { page: usize, message: String },

    /// The raster backend could not be initialized or failed outside the
    /// scope of a single page.
    #[error("raster backend error: {0}")]
    Raster(String),

    /// A search pattern failed to compile or was rejected.
    #[error("invalid pattern '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },

    /// File read or write failure.
    #[error("I/O error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The pipeline was cancelled between page boundaries. Nothing was
    /// written to the destination.
    #[error("operation cancelled")]
    Cancelled,
}

impl ScrubError {
    /// Wraps an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<lopdf::Error> for ScrubError {
    fn from(err: lopdf::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<regex::Error> for ScrubError {
    fn from(err: regex::Error) -> Self {
        Self::Pattern {
            pattern: "<unknown>".to_string(),
            reason: err.to_string(),
        }
    }
}
