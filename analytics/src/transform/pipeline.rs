//! High-level pipeline API: read → clean → aggregate in one call.
//!
//! # Example
//!
//! ```rust,ignore
//! use salesagg::{analyze_csv, AnalysisOptions, DateOrder};
//! use std::path::Path;
//!
//! let options = AnalysisOptions::new(DateOrder::MonthFirst);
//! let result = analyze_csv(Path::new("sales_transaction.csv"), &options)?;
//!
//! for month in &result.views.monthly {
//!     println!("{} {:.2} ({} orders)", month.year_month, month.total_revenue, month.orders);
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::aggregate::{aggregate, AggregateViews, DEFAULT_BULK_ORDER_THRESHOLD, DEFAULT_TOP_N};
use super::cleaner::{clean, CleanOutput, CleaningReport};
use crate::error::PipelineResult;
use crate::logs::{log_debug_indent, log_error, log_info, log_info_indent, log_success, log_warning};
use crate::models::{CleanedTransactionRow, DateOrder, RawTransactionRow};
use crate::parser::{parse_bytes_auto, parse_csv_file_auto, ParseResult, REQUIRED_COLUMNS};

/// Options for the analysis pipeline.
///
/// There is no `Default`: the date convention of the input must be stated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// How ambiguous numeric dates are read
    pub date_order: DateOrder,

    /// Entries kept in the ranked product views
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Transactions with at least this many items are left out of
    /// the transaction size view
    #[serde(default = "default_bulk_order_threshold")]
    pub bulk_order_threshold: i64,
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_bulk_order_threshold() -> i64 {
    DEFAULT_BULK_ORDER_THRESHOLD
}

impl AnalysisOptions {
    pub fn new(date_order: DateOrder) -> Self {
        Self {
            date_order,
            top_n: DEFAULT_TOP_N,
            bulk_order_threshold: DEFAULT_BULK_ORDER_THRESHOLD,
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_bulk_order_threshold(mut self, threshold: i64) -> Self {
        self.bulk_order_threshold = threshold;
        self
    }
}

/// CSV file information
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

impl CsvInfo {
    fn from_parse(parse_result: &ParseResult) -> Self {
        Self {
            encoding: parse_result.encoding.clone(),
            delimiter: parse_result.delimiter,
            headers: parse_result.headers.clone(),
            row_count: parse_result.rows.len(),
        }
    }
}

/// Result of a complete run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    /// Line items that passed cleaning, in input order
    pub cleaned: Vec<CleanedTransactionRow>,

    /// Row counts before/after cleaning
    pub report: CleaningReport,

    /// All aggregate views
    pub views: AggregateViews,

    /// CSV parsing metadata
    pub csv_info: CsvInfo,
}

/// Analyze a CSV file.
///
/// 1. Parses the CSV with encoding/delimiter detection
/// 2. Checks the required columns
/// 3. Cleans the rows
/// 4. Computes every view
pub fn analyze_csv(path: &Path, options: &AnalysisOptions) -> PipelineResult<AnalysisResult> {
    log_info(format!("Reading {}", path.display()));
    let parse_result = parse_csv_file_auto(path)?;
    analyze_parsed(parse_result, options)
}

/// Same as [`analyze_csv`] for in-memory CSV bytes.
pub fn analyze_bytes(bytes: &[u8], options: &AnalysisOptions) -> PipelineResult<AnalysisResult> {
    let parse_result = parse_bytes_auto(bytes)?;
    analyze_parsed(parse_result, options)
}

/// Analyze rows that were already loaded.
pub fn analyze_records(
    rows: Vec<RawTransactionRow>,
    options: &AnalysisOptions,
) -> PipelineResult<AnalysisResult> {
    let parse_result = ParseResult {
        rows,
        encoding: "utf-8".to_string(),
        delimiter: ',',
        headers: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
    };
    analyze_parsed(parse_result, options)
}

/// Read and clean a CSV file without aggregating.
pub fn clean_csv(path: &Path, date_order: DateOrder) -> PipelineResult<CleanOutput> {
    log_info(format!("Reading {}", path.display()));
    let parse_result = parse_csv_file_auto(path)?;
    print_csv_info(&CsvInfo::from_parse(&parse_result));
    clean_logged(parse_result.rows, date_order)
}

fn analyze_parsed(
    parse_result: ParseResult,
    options: &AnalysisOptions,
) -> PipelineResult<AnalysisResult> {
    let csv_info = CsvInfo::from_parse(&parse_result);
    print_csv_info(&csv_info);

    let CleanOutput { rows, report } = clean_logged(parse_result.rows, options.date_order)?;

    log_info("Aggregating views...");
    let views = aggregate(&rows, options.top_n, options.bulk_order_threshold);
    log_info_indent(format!("{} months", views.monthly.len()), 1);
    log_info_indent(
        format!("{} transactions below {} items", views.transaction_sizes.len(), options.bulk_order_threshold),
        1,
    );
    log_info_indent(format!("{} customers", views.customer_sales.len()), 1);

    Ok(AnalysisResult {
        cleaned: rows,
        report,
        views,
        csv_info,
    })
}

fn clean_logged(rows: Vec<RawTransactionRow>, date_order: DateOrder) -> PipelineResult<CleanOutput> {
    log_info(format!("Cleaning {} rows (dates read {})...", rows.len(), date_order));
    let output = clean(rows, date_order).map_err(|e| {
        log_error(e.to_string());
        e
    })?;
    print_cleaning_report(&output.report);
    Ok(output)
}

fn print_csv_info(info: &CsvInfo) {
    log_success(format!(
        "Read {} rows ({}, delimiter '{}')",
        info.row_count,
        info.encoding,
        format_delimiter(info.delimiter)
    ));
    log_debug_indent(format!("Columns: {}", info.headers.join(", ")), 1);
}

fn print_cleaning_report(report: &CleaningReport) {
    log_debug_indent(format!("duplicates: {}", report.duplicates), 1);
    log_debug_indent(format!("cancellations: {}", report.cancellations), 1);
    log_debug_indent(format!("non-positive quantity/price: {}", report.non_positive), 1);
    log_debug_indent(format!("unparsable dates: {}", report.unparsable_dates), 1);

    log_success(format!(
        "Kept {} of {} rows",
        report.rows_after, report.rows_before
    ));
    if report.retention() < 0.5 {
        log_warning(format!(
            "Cleaning removed {} of {} rows; {} had unparsable dates",
            report.removed(),
            report.rows_before,
            report.unparsable_dates
        ));
    }
}

/// Format delimiter for display
fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "TAB".to_string(),
        c => c.to_string(),
    }
}
