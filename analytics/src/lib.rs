//! # Salesagg - cleaning and aggregation of e-commerce sales exports
//!
//! Reads a CSV of sales line items, removes duplicates, cancellations and
//! unusable rows, then computes revenue views ready for charting.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│   Cleaner   │────▶│  Aggregate  │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (DateOrder) │     │   (views)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use salesagg::{analyze_csv, AnalysisOptions, DateOrder};
//!
//! let options = AnalysisOptions::new(DateOrder::MonthFirst);
//! let result = analyze_csv("sales_transaction.csv".as_ref(), &options).unwrap();
//! println!("{} of {} rows kept", result.report.rows_after, result.report.rows_before);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`models`] - Raw and cleaned rows, year-month key, date convention
//! - [`parser`] - CSV reading with encoding/delimiter detection
//! - [`transform`] - Cleaning, aggregation and the pipeline
//! - [`report`] - CSV / JSON / table output
//! - [`logs`] - Progress logging helpers

#![deny(rustdoc::broken_intra_doc_links)]

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Output
pub mod report;

// Logging
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CsvError, DataError, PipelineError, ReportError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{CleanedTransactionRow, DateOrder, RawTransactionRow, YearMonth};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    check_required_columns,
    detect_delimiter,
    detect_encoding,
    decode_content,
    parse_bytes_auto,
    parse_csv_file_auto,
    preview_csv_file,
    CsvPreview,
    ParseResult,
    REQUIRED_COLUMNS,
};

// =============================================================================
// Re-exports - Cleaning and aggregation
// =============================================================================

pub use transform::{
    aggregate,
    clean,
    customer_sales,
    monthly_sales,
    parse_date,
    product_totals,
    top_products,
    transaction_sizes,
    AggregateViews,
    CleanOutput,
    CleaningReport,
    CustomerSales,
    MonthlySales,
    ProductMetric,
    ProductTotal,
    TransactionSize,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    analyze_bytes,
    analyze_csv,
    analyze_records,
    clean_csv,
    AnalysisOptions,
    AnalysisResult,
    CsvInfo,
};

// =============================================================================
// Re-exports - Reports
// =============================================================================

pub use report::{render_table, view_json, views_json, write_cleaned_csv, ViewKind};
