//! Error types for deck_check
//!
//! The reconciliation core never fails; these errors come from the
//! importers, the card database client and the on-disk cache.

use thiserror::Error;

/// Unified error type for import, lookup and cache operations
#[derive(Debug, Error)]
pub enum DeckCheckError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Failed to parse JSON response or file
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Malformed CSV record
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// HTTP error status code
    #[error("HTTP error: {0}")]
    HttpStatus(reqwest::StatusCode),
    /// Card database returned an error body
    #[error("API error ({code}): {details}")]
    ApiResponse { code: String, details: String },
    /// Upload exceeds the configured size limit
    #[error("File size too large. Maximum size is {}MB.", .max / (1024 * 1024))]
    FileTooLarge { size: u64, max: u64 },
    /// Extension (and content) did not match any importer
    #[error("Unsupported file type: {0}. Please upload a .ydk, .csv, or .txt file.")]
    UnsupportedFileType(String),
    /// Collection CSV had no data rows
    #[error("CSV file is empty")]
    EmptyCsv,
    /// Collection CSV lacks the `cardname` column
    #[error("CSV format not recognized. Required columns: cardname")]
    UnrecognizedCsv,
    /// Caller supplied an unusable argument (e.g. blank collection slug)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Cache operation failed
    #[error("Cache error: {0}")]
    Cache(String),
}

pub type Error = DeckCheckError;

/// Result alias for deck_check operations
pub type Result<T> = std::result::Result<T, DeckCheckError>;
