//! Date parsing for transaction exports.
//!
//! Accepted forms:
//!
//! | Form                | Example                          | Convention     |
//! |---------------------|----------------------------------|----------------|
//! | ISO                 | `2019-12-09`                     | year first     |
//! | ISO with time       | `2019-12-09T10:30`               | time discarded |
//! | Numeric             | `12/9/2019`, `9.12.19`           | [`DateOrder`]  |
//! | Numeric with time   | `12/9/2019 10:30`                | time discarded |
//! | Month names         | `9 Dec 2019`, `December 9, 2019` | unambiguous    |
//!
//! Numeric dates are only read in the requested order. A value that is
//! only valid in the other order (`13/01/2020` read month-first) is
//! rejected rather than swapped.

use chrono::NaiveDate;

use crate::models::DateOrder;

const ISO_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

// `%Y` also accepts two digits, so the year width picks the format set.
const DAY_FIRST_FORMATS: [&str; 3] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];
const DAY_FIRST_SHORT_YEAR: [&str; 3] = ["%d/%m/%y", "%d-%m-%y", "%d.%m.%y"];

const MONTH_FIRST_FORMATS: [&str; 3] = ["%m/%d/%Y", "%m-%d-%Y", "%m.%d.%Y"];
const MONTH_FIRST_SHORT_YEAR: [&str; 3] = ["%m/%d/%y", "%m-%d-%y", "%m.%d.%y"];

const NAMED_MONTH_FORMATS: [&str; 6] = [
    "%d %b %Y", "%d %B %Y", "%d-%b-%Y", "%d-%b-%y", "%b %d, %Y", "%B %d, %Y",
];

/// Parse a date cell. Returns `None` when the text is not a valid date
/// under `order`.
pub fn parse_date(raw: &str, order: DateOrder) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if raw.chars().any(|c| c.is_ascii_alphabetic()) && !looks_like_iso_datetime(raw) {
        return parse_named_month(raw);
    }

    let date_part = date_part(raw);
    let leading_digits = date_part.chars().take_while(|c| c.is_ascii_digit()).count();

    let trailing_digits = date_part
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .count();

    let formats: &[&str] = match (leading_digits, trailing_digits, order) {
        (4, _, _) => &ISO_FORMATS,
        (_, 2, DateOrder::DayFirst) => &DAY_FIRST_SHORT_YEAR,
        (_, 2, DateOrder::MonthFirst) => &MONTH_FIRST_SHORT_YEAR,
        (_, 4, DateOrder::DayFirst) => &DAY_FIRST_FORMATS,
        (_, 4, DateOrder::MonthFirst) => &MONTH_FIRST_FORMATS,
        _ => return None,
    };

    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// `2019-12-09T10:30:00` style values carry a `T` but no month name.
fn looks_like_iso_datetime(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() > 10 && bytes[10] == b'T' && bytes[..4].iter().all(u8::is_ascii_digit)
}

/// Strip a trailing time of day.
fn date_part(raw: &str) -> &str {
    let first = raw.split_whitespace().next().unwrap_or(raw);
    match first.split_once('T') {
        Some((date, _)) => date,
        None => first,
    }
}

fn parse_named_month(raw: &str) -> Option<NaiveDate> {
    NAMED_MONTH_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            // drop a trailing time: "9 Dec 2019 10:30"
            let mut parts: Vec<&str> = raw.split_whitespace().collect();
            if parts.len() > 3 && parts[parts.len() - 1].contains(':') {
                parts.pop();
                let joined = parts.join(" ");
                NAMED_MONTH_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDate::parse_from_str(&joined, fmt).ok())
            } else {
                None
            }
        })
}
