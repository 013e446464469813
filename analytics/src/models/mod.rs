//! Domain models for the sales aggregation pipeline.
//!
//! - [`RawTransactionRow`] - one line item exactly as read from the CSV
//! - [`CleanedTransactionRow`] - a line item that survived cleaning, with derived fields
//! - [`YearMonth`] - calendar month used as the monthly grouping key
//! - [`DateOrder`] - how ambiguous numeric dates are read

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Date convention
// =============================================================================

/// Ordering of day and month in ambiguous numeric dates such as `05/01/2020`.
///
/// No default: a day-first export read month-first silently moves rows
/// between months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateOrder {
    /// `05/01/2020` is 5 January 2020.
    DayFirst,
    /// `05/01/2020` is 1 May 2020.
    MonthFirst,
}

impl DateOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DayFirst => "day-first",
            Self::MonthFirst => "month-first",
        }
    }
}

impl fmt::Display for DateOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "day-first" | "dayfirst" | "dmy" => Ok(Self::DayFirst),
            "month-first" | "monthfirst" | "mdy" => Ok(Self::MonthFirst),
            other => Err(format!(
                "unknown date order '{}' (expected 'day-first' or 'month-first')",
                other
            )),
        }
    }
}

// =============================================================================
// Year-month key
// =============================================================================

/// A calendar month. Displays and serializes as `YYYY-MM`, so the derived
/// ordering matches the lexicographic order of the text form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Build from a year and a 1-based month. Returns `None` for months
    /// outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("invalid year-month '{}'", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("invalid year in '{}'", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("invalid month in '{}'", s))?;
        Self::new(year, month).ok_or_else(|| format!("month out of range in '{}'", s))
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Transaction rows
// =============================================================================

/// One line item as read from the input.
///
/// Numeric cells that do not parse are kept as `None` so the row can be
/// dropped by the cleaning filters instead of failing the whole load. Text
/// cells are kept verbatim; only numbers tolerate surrounding spaces.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawTransactionRow {
    /// Transaction identifier; a leading `C` marks a cancellation.
    #[serde(default)]
    pub transaction_no: Option<String>,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub customer_no: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub quantity: Option<i64>,
    /// Unit price.
    #[serde(default, deserialize_with = "lenient_number")]
    pub price: Option<f64>,
    /// Unparsed date text.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub country: String,
    /// Cells of the columns not listed above (`ProductNo` and the like), in
    /// file order. Empty for rows built in code.
    #[serde(skip)]
    pub extra_cells: Vec<String>,
}

fn lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let cell = Option::<String>::deserialize(deserializer)?;
    Ok(cell.and_then(|s| s.trim().parse().ok()))
}

impl RawTransactionRow {
    /// Whether the transaction number denotes a cancellation.
    ///
    /// Case-sensitive; a missing transaction number never matches.
    pub fn is_cancellation(&self) -> bool {
        self.transaction_no
            .as_deref()
            .is_some_and(|t| t.starts_with('C'))
    }
}

/// A line item that passed every cleaning rule.
///
/// Serialized field names match the input columns plus `Revenue` and
/// `YearMonth`, so a cleaned file can be read back by the same parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CleanedTransactionRow {
    pub transaction_no: Option<String>,
    pub product_name: String,
    pub customer_no: Option<String>,
    /// Always > 0.
    pub quantity: i64,
    /// Always > 0.
    pub price: f64,
    pub date: NaiveDate,
    pub country: String,
    /// `quantity * price`
    pub revenue: f64,
    pub year_month: YearMonth,
}

impl CleanedTransactionRow {
    /// Build a cleaned row, deriving revenue and year-month.
    pub fn new(raw: RawTransactionRow, quantity: i64, price: f64, date: NaiveDate) -> Self {
        Self {
            transaction_no: raw.transaction_no,
            product_name: raw.product_name,
            customer_no: raw.customer_no,
            quantity,
            price,
            date,
            country: raw.country,
            revenue: quantity as f64 * price,
            year_month: YearMonth::from_date(date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_month_display_is_zero_padded() {
        let ym = YearMonth::new(2019, 7).unwrap();
        assert_eq!(ym.to_string(), "2019-07");
    }

    #[test]
    fn test_year_month_rejects_bad_month() {
        assert!(YearMonth::new(2020, 0).is_none());
        assert!(YearMonth::new(2020, 13).is_none());
        assert!("2020-13".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_year_month_order_matches_text_order() {
        let mut months: Vec<YearMonth> = ["2020-01", "2019-12", "2019-02"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        months.sort();
        let text: Vec<String> = months.iter().map(|m| m.to_string()).collect();
        assert_eq!(text, vec!["2019-02", "2019-12", "2020-01"]);
    }

    #[test]
    fn test_year_month_serde() {
        let ym = YearMonth::new(2020, 1).unwrap();
        let json = serde_json::to_string(&ym).unwrap();
        assert_eq!(json, "\"2020-01\"");
        let back: YearMonth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ym);
    }

    #[test]
    fn test_date_order_from_str() {
        assert_eq!("day-first".parse::<DateOrder>().unwrap(), DateOrder::DayFirst);
        assert_eq!("MONTH_FIRST".parse::<DateOrder>().unwrap(), DateOrder::MonthFirst);
        assert_eq!("dmy".parse::<DateOrder>().unwrap(), DateOrder::DayFirst);
        assert!("iso".parse::<DateOrder>().is_err());
    }

    #[test]
    fn test_cancellation_marker() {
        let mut row = RawTransactionRow {
            transaction_no: Some("C581484".into()),
            ..Default::default()
        };
        assert!(row.is_cancellation());

        // lowercase is not a marker
        row.transaction_no = Some("c581484".into());
        assert!(!row.is_cancellation());

        row.transaction_no = None;
        assert!(!row.is_cancellation());

        // the marker must be the first character of the cell
        row.transaction_no = Some(" C581484".into());
        assert!(!row.is_cancellation());
    }

    #[test]
    fn test_cleaned_row_derives_revenue_and_month() {
        let raw = RawTransactionRow {
            transaction_no: Some("T1".into()),
            product_name: "Widget".into(),
            ..Default::default()
        };
        let date = NaiveDate::from_ymd_opt(2020, 1, 5).unwrap();
        let row = CleanedTransactionRow::new(raw, 3, 10.0, date);
        assert_eq!(row.revenue, 30.0);
        assert_eq!(row.year_month.to_string(), "2020-01");
    }
}
