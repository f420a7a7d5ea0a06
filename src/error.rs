//! Error types for Editorial Scan
//!
//! This module provides the error hierarchy using `thiserror`. Only
//! [`SourceError`] is allowed to abort a whole run; fetch and extraction
//! errors are caught by the pipeline and turned into a skipped row.

use thiserror::Error;

/// The main error type for Editorial Scan operations
#[derive(Error, Debug)]
pub enum Error {
    /// Row source errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Document fetch errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Link extraction errors
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client construction errors
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors raised while reading the spreadsheet of document references
#[derive(Error, Debug)]
pub enum SourceError {
    /// The workbook could not be opened or parsed
    #[error("Failed to open workbook {path}: {message}")]
    Open {
        /// Path that was opened
        path: String,
        /// Underlying reader message
        message: String,
    },

    /// The workbook has no worksheet to read
    #[error("Workbook has no worksheets")]
    NoWorksheet,

    /// The header row lacks one of the two required columns
    #[error("Input must have columns: '{reference}' and '{label}'")]
    MissingColumns {
        /// Name of the document reference column
        reference: String,
        /// Name of the label column
        label: String,
    },
}

/// Errors raised while downloading a rendered document
#[derive(Error, Debug)]
pub enum FetchError {
    /// The export endpoint answered with something other than 200
    #[error("Export returned HTTP {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// Every attempt failed at the transport level
    #[error("Export failed after {attempts} attempts: {source}")]
    Exhausted {
        /// Number of attempts made
        attempts: u32,
        /// Last transport error
        #[source]
        source: reqwest::Error,
    },

    /// Writing the downloaded bytes failed
    #[error("Failed to write {path}: {source}")]
    Io {
        /// Destination path
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The export URL could not be built
    #[error("Invalid export URL: {0}")]
    InvalidUrl(String),
}

/// Errors raised while reading links out of a rendered document
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The document could not be opened or parsed
    #[error("Failed to open document {path}: {message}")]
    Open {
        /// Document path
        path: String,
        /// Parser message
        message: String,
    },

    /// A page object is missing or malformed
    #[error("Malformed page {page}: {message}")]
    Page {
        /// 1-based page number
        page: u32,
        /// Parser message
        message: String,
    },

    /// The URL pattern failed to compile
    #[error("Invalid URL pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Result type alias for Editorial Scan operations
pub type Result<T> = std::result::Result<T, Error>;
