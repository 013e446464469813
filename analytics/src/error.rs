//! Error types for the sales aggregation pipeline.
//!
//! - [`CsvError`] - reading and decoding the input file
//! - [`DataError`] - the input cannot produce meaningful aggregates
//! - [`PipelineError`] - top-level error returned by [`crate::transform::pipeline`]
//! - [`ReportError`] - writing cleaned rows or views back out
//!
//! Per-row problems (duplicates, cancellations, bad numbers, bad dates) are
//! never errors. They are filtered out and only show up in the
//! [`crate::transform::CleaningReport`] counts.

use thiserror::Error;

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while reading the raw CSV.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode the bytes into text.
    #[error("Failed to decode content: {0}")]
    EncodingError(String),

    /// Malformed CSV record.
    #[error("Line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

// =============================================================================
// Data Errors
// =============================================================================

/// Errors that make the whole run meaningless.
#[derive(Debug, Error, PartialEq)]
pub enum DataError {
    /// Required column absent from the header row.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Cleaning removed every row.
    #[error("Cleaning removed all {rows_before} rows (check the date convention)")]
    EmptyResult { rows_before: usize },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// This is the error type returned by [`crate::analyze_csv`] and
/// friends. It wraps the lower-level errors so `?` works across them.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV reading error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Data error.
    #[error("Data error: {0}")]
    Data(#[from] DataError),
}

// =============================================================================
// Report Errors
// =============================================================================

/// Errors while writing results.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV writer error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for data checks.
pub type DataResult<T> = Result<T, DataError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for report writing.
pub type ReportResult<T> = Result<T, ReportError>;
