//! Cleaning stage: raw CSV rows in, typed line items out.
//!
//! Rules run in a fixed order, each on the output of the previous one:
//!
//! ```text
//! raw rows
//!   │ 1. drop exact duplicates (first occurrence kept)
//!   │ 2. drop cancellations (TransactionNo starts with "C")
//!   │ 3. drop Quantity <= 0 or Price <= 0 (missing counts as failing)
//!   │ 4. Revenue = Quantity * Price
//!   │ 5. parse Date with the caller's DateOrder, drop failures
//!   │ 6. YearMonth from the parsed date
//!   ▼
//! cleaned rows + CleaningReport
//! ```

use serde::Serialize;
use std::collections::HashSet;

use super::dates::parse_date;
use crate::error::{DataError, DataResult};
use crate::models::{CleanedTransactionRow, DateOrder, RawTransactionRow};

/// Row counts before and after cleaning, with the number of rows each rule
/// removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub rows_before: usize,
    pub duplicates: usize,
    pub cancellations: usize,
    pub non_positive: usize,
    pub unparsable_dates: usize,
    pub rows_after: usize,
}

impl CleaningReport {
    /// Rows removed by all rules together.
    pub fn removed(&self) -> usize {
        self.rows_before - self.rows_after
    }

    /// Share of input rows that survived, in `0.0..=1.0`.
    pub fn retention(&self) -> f64 {
        if self.rows_before == 0 {
            0.0
        } else {
            self.rows_after as f64 / self.rows_before as f64
        }
    }
}

/// Output of [`clean`].
#[derive(Debug, Clone)]
pub struct CleanOutput {
    pub rows: Vec<CleanedTransactionRow>,
    pub report: CleaningReport,
}

/// Hashable view of every field of a raw row, untyped columns included.
#[derive(PartialEq, Eq, Hash)]
struct RowKey<'a> {
    transaction_no: Option<&'a str>,
    product_name: &'a str,
    customer_no: Option<&'a str>,
    quantity: Option<i64>,
    price: Option<u64>,
    date: Option<&'a str>,
    country: &'a str,
    extra_cells: &'a [String],
}

impl<'a> RowKey<'a> {
    fn of(row: &'a RawTransactionRow) -> Self {
        Self {
            transaction_no: row.transaction_no.as_deref(),
            product_name: &row.product_name,
            customer_no: row.customer_no.as_deref(),
            quantity: row.quantity,
            // +0.0 and -0.0 are the same price
            price: row.price.map(|p| if p == 0.0 { 0.0f64.to_bits() } else { p.to_bits() }),
            date: row.date.as_deref(),
            country: &row.country,
            extra_cells: &row.extra_cells,
        }
    }
}

/// Remove exact duplicates, keeping the first occurrence of each row.
pub fn dedup_rows(rows: Vec<RawTransactionRow>) -> Vec<RawTransactionRow> {
    let keep: Vec<bool> = {
        let mut seen = HashSet::with_capacity(rows.len());
        rows.iter().map(|row| seen.insert(RowKey::of(row))).collect()
    };

    rows.into_iter()
        .zip(keep)
        .filter_map(|(row, keep)| keep.then_some(row))
        .collect()
}

/// Run every cleaning rule.
///
/// Fails with [`DataError::EmptyResult`] when nothing survives, including
/// when `rows` is empty to begin with.
pub fn clean(rows: Vec<RawTransactionRow>, order: DateOrder) -> DataResult<CleanOutput> {
    let mut report = CleaningReport {
        rows_before: rows.len(),
        ..Default::default()
    };

    let rows = dedup_rows(rows);
    report.duplicates = report.rows_before - rows.len();

    let mut cleaned = Vec::with_capacity(rows.len());
    for row in rows {
        if row.is_cancellation() {
            report.cancellations += 1;
            continue;
        }

        let (quantity, price) = match (row.quantity, row.price) {
            (Some(q), Some(p)) if q > 0 && p > 0.0 => (q, p),
            _ => {
                report.non_positive += 1;
                continue;
            }
        };

        let Some(date) = row.date.as_deref().and_then(|d| parse_date(d, order)) else {
            report.unparsable_dates += 1;
            continue;
        };

        cleaned.push(CleanedTransactionRow::new(row, quantity, price, date));
    }

    report.rows_after = cleaned.len();
    if cleaned.is_empty() {
        return Err(DataError::EmptyResult {
            rows_before: report.rows_before,
        });
    }

    Ok(CleanOutput {
        rows: cleaned,
        report,
    })
}
