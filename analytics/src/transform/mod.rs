//! Transformation module.
//!
//! - Dates: day-first / month-first aware date parsing
//! - Cleaner: raw rows to cleaned line items
//! - Aggregate: group-by views over cleaned rows
//! - Pipeline: read, clean and aggregate in one call

pub mod aggregate;
pub mod cleaner;
pub mod dates;
pub mod pipeline;

pub use aggregate::*;
pub use cleaner::{clean, dedup_rows, CleanOutput, CleaningReport};
pub use dates::parse_date;
pub use pipeline::*;
