//! Writing results: cleaned rows as CSV, views as JSON or plain-text tables.
//!
//! Charts are not drawn here; the JSON form is what a plotting tool consumes.

use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write;
use std::str::FromStr;

use crate::error::ReportResult;
use crate::models::CleanedTransactionRow;
use crate::transform::aggregate::AggregateViews;

/// Rows printed for the transaction size table (the JSON form has all).
const TABLE_PREVIEW_ROWS: usize = 10;

/// One of the aggregate views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Monthly,
    Products,
    ProductQuantity,
    Baskets,
    Customers,
}

impl ViewKind {
    pub const ALL: [ViewKind; 5] = [
        Self::Monthly,
        Self::Products,
        Self::ProductQuantity,
        Self::Baskets,
        Self::Customers,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Monthly => "Monthly revenue and orders",
            Self::Products => "Top products by revenue",
            Self::ProductQuantity => "Top products by quantity",
            Self::Baskets => "Products per transaction",
            Self::Customers => "Top customers by revenue",
        }
    }
}

impl FromStr for ViewKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "products" => Ok(Self::Products),
            "product-quantity" => Ok(Self::ProductQuantity),
            "baskets" => Ok(Self::Baskets),
            "customers" => Ok(Self::Customers),
            other => Err(format!(
                "unknown view '{}' (expected monthly, products, product-quantity, baskets or customers)",
                other
            )),
        }
    }
}

/// Write cleaned rows as CSV with a header row.
pub fn write_cleaned_csv<W: Write>(rows: &[CleanedTransactionRow], writer: W) -> ReportResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> ReportResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// One view as pretty JSON. The customer view is cut to `top_n`.
pub fn view_json(views: &AggregateViews, kind: ViewKind, top_n: usize) -> ReportResult<String> {
    match kind {
        ViewKind::Monthly => to_json(&views.monthly),
        ViewKind::Products => to_json(&views.top_products_by_revenue),
        ViewKind::ProductQuantity => to_json(&views.top_products_by_quantity),
        ViewKind::Baskets => to_json(&views.transaction_sizes),
        ViewKind::Customers => to_json(views.top_customers(top_n)),
    }
}

/// All views as one pretty JSON document.
pub fn views_json(views: &AggregateViews) -> ReportResult<String> {
    to_json(views)
}

/// One view as an aligned text table with a title line.
pub fn render_table(views: &AggregateViews, kind: ViewKind, top_n: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", kind.title());

    match kind {
        ViewKind::Monthly => {
            let _ = writeln!(out, "{:<9} {:>14} {:>8}", "YearMonth", "TotalRevenue", "Orders");
            for m in &views.monthly {
                let _ = writeln!(out, "{:<9} {:>14.2} {:>8}", m.year_month, m.total_revenue, m.orders);
            }
        }
        ViewKind::Products | ViewKind::ProductQuantity => {
            let products = if kind == ViewKind::Products {
                &views.top_products_by_revenue
            } else {
                &views.top_products_by_quantity
            };
            let width = column_width(products.iter().map(|p| p.product_name.as_str()), "ProductName");
            let _ = writeln!(out, "{:<width$} {:>14} {:>10}", "ProductName", "TotalRevenue", "Quantity");
            for p in products {
                let _ = writeln!(
                    out,
                    "{:<width$} {:>14.2} {:>10}",
                    p.product_name, p.total_revenue, p.total_quantity
                );
            }
        }
        ViewKind::Baskets => {
            let sizes = &views.transaction_sizes;
            let _ = writeln!(out, "{:<14} {:>13}", "TransactionNo", "TotalProducts");
            for t in sizes.iter().take(TABLE_PREVIEW_ROWS) {
                let _ = writeln!(out, "{:<14} {:>13}", t.transaction_no, t.total_products);
            }
            if sizes.len() > TABLE_PREVIEW_ROWS {
                let _ = writeln!(out, "... {} transactions in total", sizes.len());
            }
        }
        ViewKind::Customers => {
            let _ = writeln!(out, "{:<12} {:>14}", "CustomerNo", "TotalSales");
            for c in views.top_customers(top_n) {
                let _ = writeln!(out, "{:<12} {:>14.2}", c.customer_no, c.total_sales);
            }
        }
    }

    out
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str) -> usize {
    values
        .map(|v| v.chars().count())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(header.len())
}
