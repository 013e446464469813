//! Group-by views over cleaned line items.
//!
//! ```text
//! cleaned rows ──┬─▶ monthly_sales        YearMonth   → revenue, distinct orders
//!                ├─▶ top_products         ProductName → revenue / quantity (top N)
//!                ├─▶ transaction_sizes    TransactionNo → items (bulk orders removed)
//!                └─▶ customer_sales       CustomerNo  → revenue (sorted)
//! ```
//!
//! Every view is a pure function of `&[CleanedTransactionRow]` and allocates
//! its own output, so the cleaned rows can be aggregated again at any time
//! with identical results. Rows with a missing grouping key are left out of
//! that view only.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

use crate::models::{CleanedTransactionRow, YearMonth};

/// Number of entries kept by ranked views unless configured otherwise.
pub const DEFAULT_TOP_N: usize = 10;

/// Transactions with at least this many items are bulk orders.
pub const DEFAULT_BULK_ORDER_THRESHOLD: i64 = 2000;

// =============================================================================
// View rows
// =============================================================================

/// Revenue and order count for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MonthlySales {
    pub year_month: YearMonth,
    pub total_revenue: f64,
    /// Distinct transaction numbers in the month.
    pub orders: usize,
}

/// Totals for one product.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductTotal {
    pub product_name: String,
    pub total_revenue: f64,
    pub total_quantity: i64,
}

/// Number of items bought in one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransactionSize {
    pub transaction_no: String,
    pub total_products: i64,
}

/// Revenue generated by one customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomerSales {
    pub customer_no: String,
    pub total_sales: f64,
}

/// Metric used to rank products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductMetric {
    Revenue,
    Quantity,
}

impl ProductMetric {
    fn value(&self, product: &ProductTotal) -> f64 {
        match self {
            Self::Revenue => product.total_revenue,
            Self::Quantity => product.total_quantity as f64,
        }
    }
}

// =============================================================================
// Grouping
// =============================================================================

/// Accumulators keyed by group, kept in first-encounter order.
struct Groups<K, A> {
    index: HashMap<K, usize>,
    entries: Vec<(K, A)>,
}

impl<K: Hash + Eq + Clone, A: Default> Groups<K, A> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    fn entry(&mut self, key: K) -> &mut A {
        let idx = match self.index.get(&key) {
            Some(&idx) => idx,
            None => {
                let idx = self.entries.len();
                self.index.insert(key.clone(), idx);
                self.entries.push((key, A::default()));
                idx
            }
        };
        &mut self.entries[idx].1
    }

    fn into_entries(self) -> Vec<(K, A)> {
        self.entries
    }
}

// =============================================================================
// Views
// =============================================================================

/// Revenue and distinct orders per month, oldest month first.
pub fn monthly_sales(rows: &[CleanedTransactionRow]) -> Vec<MonthlySales> {
    let mut months: BTreeMap<YearMonth, (f64, HashSet<&str>)> = BTreeMap::new();

    for row in rows {
        let (revenue, orders) = months.entry(row.year_month).or_default();
        *revenue += row.revenue;
        if let Some(tx) = row.transaction_no.as_deref() {
            orders.insert(tx);
        }
    }

    months
        .into_iter()
        .map(|(year_month, (total_revenue, orders))| MonthlySales {
            year_month,
            total_revenue,
            orders: orders.len(),
        })
        .collect()
}

/// Revenue and quantity for every product, in first-encounter order.
///
/// Quantities saturate at `i64::MAX`.
pub fn product_totals(rows: &[CleanedTransactionRow]) -> Vec<ProductTotal> {
    let mut groups: Groups<&str, (f64, i64)> = Groups::new();

    for row in rows {
        let (revenue, quantity) = groups.entry(&row.product_name);
        *revenue += row.revenue;
        *quantity = quantity.saturating_add(row.quantity);
    }

    groups
        .into_entries()
        .into_iter()
        .map(|(name, (total_revenue, total_quantity))| ProductTotal {
            product_name: name.to_string(),
            total_revenue,
            total_quantity,
        })
        .collect()
}

/// The `n` best products by `metric`, best first.
///
/// Ties keep the order in which products first appear in `rows`.
pub fn top_products(
    rows: &[CleanedTransactionRow],
    metric: ProductMetric,
    n: usize,
) -> Vec<ProductTotal> {
    let mut products = product_totals(rows);
    products.sort_by(|a, b| metric.value(b).total_cmp(&metric.value(a)));
    products.truncate(n);
    products
}

/// Items per transaction, bulk orders (`>= bulk_threshold` items) removed.
///
/// Only rows with a positive quantity count. Output keeps first-encounter
/// order of the transaction number.
pub fn transaction_sizes(rows: &[CleanedTransactionRow], bulk_threshold: i64) -> Vec<TransactionSize> {
    let mut groups: Groups<&str, i64> = Groups::new();

    for row in rows.iter().filter(|r| r.quantity > 0) {
        if let Some(tx) = row.transaction_no.as_deref() {
            let total = groups.entry(tx);
            *total = total.saturating_add(row.quantity);
        }
    }

    groups
        .into_entries()
        .into_iter()
        .filter(|(_, total)| *total < bulk_threshold)
        .map(|(tx, total_products)| TransactionSize {
            transaction_no: tx.to_string(),
            total_products,
        })
        .collect()
}

/// Revenue per customer, highest first. Only rows with a positive quantity
/// count.
pub fn customer_sales(rows: &[CleanedTransactionRow]) -> Vec<CustomerSales> {
    let mut groups: Groups<&str, f64> = Groups::new();

    for row in rows.iter().filter(|r| r.quantity > 0) {
        if let Some(customer) = row.customer_no.as_deref() {
            *groups.entry(customer) += row.revenue;
        }
    }

    let mut customers: Vec<CustomerSales> = groups
        .into_entries()
        .into_iter()
        .map(|(customer, total_sales)| CustomerSales {
            customer_no: customer.to_string(),
            total_sales,
        })
        .collect();
    customers.sort_by(|a, b| b.total_sales.total_cmp(&a.total_sales));
    customers
}

// =============================================================================
// All views
// =============================================================================

/// Every view computed from one set of cleaned rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateViews {
    pub monthly: Vec<MonthlySales>,
    pub top_products_by_revenue: Vec<ProductTotal>,
    pub top_products_by_quantity: Vec<ProductTotal>,
    pub transaction_sizes: Vec<TransactionSize>,
    /// Full customer ranking; see [`AggregateViews::top_customers`].
    pub customer_sales: Vec<CustomerSales>,
}

impl AggregateViews {
    /// The `n` highest-spending customers.
    pub fn top_customers(&self, n: usize) -> &[CustomerSales] {
        &self.customer_sales[..n.min(self.customer_sales.len())]
    }
}

/// Compute every view.
pub fn aggregate(rows: &[CleanedTransactionRow], top_n: usize, bulk_threshold: i64) -> AggregateViews {
    AggregateViews {
        monthly: monthly_sales(rows),
        top_products_by_revenue: top_products(rows, ProductMetric::Revenue, top_n),
        top_products_by_quantity: top_products(rows, ProductMetric::Quantity, top_n),
        transaction_sizes: transaction_sizes(rows, bulk_threshold),
        customer_sales: customer_sales(rows),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawTransactionRow;
    use chrono::NaiveDate;

    fn item(tx: &str, product: &str, customer: &str, qty: i64, price: f64, date: (i32, u32, u32)) -> CleanedTransactionRow {
        let raw = RawTransactionRow {
            transaction_no: Some(tx.to_string()),
            product_name: product.to_string(),
            customer_no: Some(customer.to_string()),
            country: "United Kingdom".into(),
            ..Default::default()
        };
        let date = NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap();
        CleanedTransactionRow::new(raw, qty, price, date)
    }

    #[test]
    fn test_monthly_single_row() {
        let rows = vec![item("T1", "Widget", "C1", 3, 10.0, (2020, 1, 5))];
        let monthly = monthly_sales(&rows);

        assert_eq!(monthly.len(), 1);
        assert_eq!(monthly[0].year_month.to_string(), "2020-01");
        assert_eq!(monthly[0].total_revenue, 30.0);
        assert_eq!(monthly[0].orders, 1);
    }

    #[test]
    fn test_monthly_sorted_and_distinct_orders() {
        let rows = vec![
            item("T3", "A", "C1", 1, 2.0, (2020, 2, 1)),
            item("T1", "A", "C1", 1, 1.0, (2019, 12, 3)),
            item("T1", "B", "C1", 2, 1.0, (2019, 12, 3)),
            item("T2", "A", "C2", 1, 4.0, (2019, 12, 9)),
        ];
        let monthly = monthly_sales(&rows);

        let months: Vec<String> = monthly.iter().map(|m| m.year_month.to_string()).collect();
        assert_eq!(months, vec!["2019-12", "2020-02"]);
        assert_eq!(monthly[0].orders, 2);
        assert_eq!(monthly[0].total_revenue, 7.0);
        assert_eq!(monthly[1].orders, 1);
    }

    #[test]
    fn test_top_products_limit_and_order() {
        let rows: Vec<_> = (0..15)
            .map(|i| item(&format!("T{i}"), &format!("P{i}"), "C1", 1, i as f64 + 1.0, (2020, 1, 1)))
            .collect();
        let top = top_products(&rows, ProductMetric::Revenue, DEFAULT_TOP_N);

        assert_eq!(top.len(), 10);
        assert_eq!(top[0].product_name, "P14");
        assert!(top.windows(2).all(|w| w[0].total_revenue >= w[1].total_revenue));
    }

    #[test]
    fn test_top_products_ties_keep_encounter_order() {
        let rows = vec![
            item("T1", "Mug", "C1", 1, 5.0, (2020, 1, 1)),
            item("T2", "Lamp", "C1", 1, 5.0, (2020, 1, 1)),
            item("T3", "Bag", "C1", 1, 9.0, (2020, 1, 1)),
        ];
        let names: Vec<String> = top_products(&rows, ProductMetric::Revenue, 10)
            .into_iter()
            .map(|p| p.product_name)
            .collect();
        assert_eq!(names, vec!["Bag", "Mug", "Lamp"]);
    }

    #[test]
    fn test_top_products_by_quantity() {
        let rows = vec![
            item("T1", "Cheap", "C1", 50, 0.1, (2020, 1, 1)),
            item("T2", "Pricey", "C1", 1, 100.0, (2020, 1, 1)),
            item("T3", "Cheap", "C2", 25, 0.1, (2020, 1, 1)),
        ];
        let by_qty = top_products(&rows, ProductMetric::Quantity, 10);
        let by_rev = top_products(&rows, ProductMetric::Revenue, 10);

        assert_eq!(by_qty[0].product_name, "Cheap");
        assert_eq!(by_qty[0].total_quantity, 75);
        assert_eq!(by_rev[0].product_name, "Pricey");
    }

    #[test]
    fn test_bulk_orders_filtered() {
        let rows = vec![
            item("BULK", "A", "C1", 2000, 1.0, (2020, 1, 1)),
            item("BULK", "B", "C1", 500, 1.0, (2020, 1, 1)),
            item("EDGE", "A", "C2", 1999, 1.0, (2020, 1, 1)),
            item("EXACT", "A", "C3", 2000, 1.0, (2020, 1, 1)),
        ];
        let sizes = transaction_sizes(&rows, DEFAULT_BULK_ORDER_THRESHOLD);

        assert_eq!(
            sizes,
            vec![TransactionSize {
                transaction_no: "EDGE".into(),
                total_products: 1999
            }]
        );
    }

    #[test]
    fn test_transaction_sizes_sum_lines() {
        let rows = vec![
            item("T1", "A", "C1", 2, 1.0, (2020, 1, 1)),
            item("T2", "A", "C1", 1, 1.0, (2020, 1, 1)),
            item("T1", "B", "C1", 3, 1.0, (2020, 1, 1)),
        ];
        let sizes = transaction_sizes(&rows, DEFAULT_BULK_ORDER_THRESHOLD);
        assert_eq!(sizes[0].transaction_no, "T1");
        assert_eq!(sizes[0].total_products, 5);
        assert_eq!(sizes[1].total_products, 1);
    }

    #[test]
    fn test_customer_sales_sorted_and_skip_missing() {
        let mut anonymous = item("T9", "A", "x", 1, 1000.0, (2020, 1, 1));
        anonymous.customer_no = None;
        let rows = vec![
            item("T1", "A", "C1", 1, 10.0, (2020, 1, 1)),
            item("T2", "A", "C2", 1, 30.0, (2020, 1, 1)),
            item("T3", "A", "C1", 1, 5.0, (2020, 1, 1)),
            anonymous,
        ];
        let customers = customer_sales(&rows);

        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].customer_no, "C2");
        assert_eq!(customers[1].total_sales, 15.0);
    }

    #[test]
    fn test_top_customers_truncates() {
        let rows: Vec<_> = (0..12)
            .map(|i| item("T1", "A", &format!("C{i}"), 1, i as f64 + 1.0, (2020, 1, 1)))
            .collect();
        let views = aggregate(&rows, DEFAULT_TOP_N, DEFAULT_BULK_ORDER_THRESHOLD);

        assert_eq!(views.customer_sales.len(), 12);
        assert_eq!(views.top_customers(10).len(), 10);
        assert_eq!(views.top_customers(50).len(), 12);
        assert_eq!(views.top_customers(1)[0].customer_no, "C11");
    }

    #[test]
    fn test_monthly_total_matches_row_revenue() {
        let rows = vec![
            item("T1", "A", "C1", 3, 2.5, (2020, 1, 1)),
            item("T2", "B", "C1", 1, 4.25, (2020, 2, 1)),
            item("T3", "A", "C2", 7, 1.5, (2020, 2, 9)),
        ];
        let monthly_total: f64 = monthly_sales(&rows).iter().map(|m| m.total_revenue).sum();
        let row_total: f64 = rows.iter().map(|r| r.revenue).sum();
        assert!((monthly_total - row_total).abs() < 1e-9);
    }

    #[test]
    fn test_quantity_sums_saturate() {
        let rows = vec![
            item("T1", "Widget", "C1", i64::MAX, 1.0, (2020, 1, 5)),
            item("T1", "Widget", "C1", 1, 1.0, (2020, 1, 5)),
        ];

        let products = product_totals(&rows);
        assert_eq!(products[0].total_quantity, i64::MAX);

        let sizes = transaction_sizes(&rows, i64::MAX);
        assert!(sizes.is_empty());

        let views = aggregate(&rows, DEFAULT_TOP_N, DEFAULT_BULK_ORDER_THRESHOLD);
        assert_eq!(views.top_products_by_quantity[0].total_quantity, i64::MAX);
    }

    #[test]
    fn test_serialized_column_names() {
        let rows = vec![item("T1", "Widget", "C1", 3, 10.0, (2020, 1, 5))];
        let json = serde_json::to_value(monthly_sales(&rows)).unwrap();
        assert_eq!(json[0]["YearMonth"], "2020-01");
        assert_eq!(json[0]["TotalRevenue"], 30.0);
        assert_eq!(json[0]["Orders"], 1);
    }
}
