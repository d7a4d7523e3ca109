//! Core data types for moon-day
//!
//! A day's worth of data is a `RowSet`: the ordered rows scraped from the
//! lunar-day table for one location. The `Fetcher` trait is the seam between
//! the cache and whatever produces those rows (the HTTP client in production,
//! stubs in tests).

mod html;
pub mod moon_day;

#[cfg(test)]
pub(crate) mod stub;

pub use moon_day::{FetchError, MoonDayClient, DEFAULT_BASE_URL};

use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format used in cache keys and row labels (`18.10.2026`)
pub const DISPLAY_DATE_FORMAT: &str = "%d.%m.%Y";

/// Date format used in request URLs (`2026-10-18`)
pub const URL_DATE_FORMAT: &str = "%Y-%m-%d";

/// One table row: a display label and the extracted numeric value as text
///
/// Serialized as a two-element array (`["18.10.2026 07:12", "27"]`) so the
/// cache layout stays a plain list of string pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row(String, String);

impl Row {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self(label.into(), value.into())
    }

    /// Display label, prefixed with the formatted date
    pub fn label(&self) -> &str {
        &self.0
    }

    /// Numeric value exactly as it appeared in the page
    pub fn value(&self) -> &str {
        &self.1
    }
}

/// Rows for one or more days, in source order
pub type RowSet = Vec<Row>;

/// Produces the rows for a single (date, location) pair
///
/// Implementations must fail as a whole on transport or status errors and
/// return an empty `RowSet` when the page simply has no matching rows.
pub trait Fetcher {
    fn fetch(
        &self,
        date: NaiveDate,
        location_id: i64,
    ) -> impl Future<Output = Result<RowSet, FetchError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_accessors() {
        let row = Row::new("18.10.2026 07:12", "27");
        assert_eq!(row.label(), "18.10.2026 07:12");
        assert_eq!(row.value(), "27");
    }

    #[test]
    fn test_row_set_serializes_as_string_pairs() {
        let rows: RowSet = vec![Row::new("a", "1"), Row::new("b", "2")];
        let json = serde_json::to_string(&rows).expect("Failed to serialize rows");
        assert_eq!(json, r#"[["a","1"],["b","2"]]"#);
    }

    #[test]
    fn test_row_set_reads_existing_cache_layout() {
        let rows: RowSet = serde_json::from_str(r#"[["17.10.2026 06:40","26"]]"#)
            .expect("Failed to deserialize rows");
        assert_eq!(rows, vec![Row::new("17.10.2026 06:40", "26")]);
    }

    #[test]
    fn test_empty_row_set_is_empty_array() {
        let rows: RowSet = Vec::new();
        assert_eq!(serde_json::to_string(&rows).unwrap(), "[]");
    }

    #[test]
    fn test_date_formats() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(date.format(DISPLAY_DATE_FORMAT).to_string(), "07.03.2026");
        assert_eq!(date.format(URL_DATE_FORMAT).to_string(), "2026-03-07");
    }
}
