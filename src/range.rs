//! Collects rows for a window of days around today
//!
//! Days are visited one at a time in chronological order, each through the
//! cache store. The first failing day aborts the whole collection.

use chrono::{Days, Local, NaiveDate};
use thiserror::Error;
use tracing::debug;

use crate::cache::{CacheError, CacheStore};
use crate::data::{Fetcher, RowSet};

/// Errors that can occur when collecting a range of days
#[derive(Debug, Error)]
pub enum RangeError {
    /// One of the window bounds was negative
    #[error("Window bounds must not be negative (days before: {days_before}, days after: {days_after})")]
    NegativeWindow { days_before: i64, days_after: i64 },

    /// The window reaches past the representable calendar
    #[error("Window of {days_before} days before and {days_after} days after {today} is out of range")]
    DateOutOfRange {
        today: NaiveDate,
        days_before: i64,
        days_after: i64,
    },

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Inclusive range of calendar days `[today - days_before, today + days_after]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl QueryWindow {
    /// Builds the window around `today`
    ///
    /// Negative bounds are rejected rather than producing a shifted or empty
    /// window; `0, 0` is today alone.
    pub fn around(today: NaiveDate, days_before: i64, days_after: i64) -> Result<Self, RangeError> {
        let (Ok(before), Ok(after)) = (u64::try_from(days_before), u64::try_from(days_after)) else {
            return Err(RangeError::NegativeWindow {
                days_before,
                days_after,
            });
        };

        let out_of_range = || RangeError::DateOutOfRange {
            today,
            days_before,
            days_after,
        };
        let start = today.checked_sub_days(Days::new(before)).ok_or_else(out_of_range)?;
        let end = today.checked_add_days(Days::new(after)).ok_or_else(out_of_range)?;

        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Days in the window, oldest first
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }
}

/// Collects the rows for every day in the window around the current local date
///
/// # Arguments
/// * `store` - Cache store consulted once per day
/// * `location_id` - Location whose pages are read
/// * `days_before` - Days before today to include; must not be negative
/// * `days_after` - Days after today to include; must not be negative
/// * `bypass` - Refetch every day and overwrite its cache entry
///
/// # Returns
/// * `Ok(RowSet)` - Rows of every day, oldest day first, page order within a day
/// * `Err(RangeError)` - Invalid window or the first failing day
///
/// # Behavior
/// - "Today" is read once, so a run that crosses midnight keeps its window
/// - A negative bound fails with [`RangeError::NegativeWindow`] before the store is touched
/// - The first failing day stops the run; no partial rows are returned
pub async fn collect<F: Fetcher>(
    store: &CacheStore<F>,
    location_id: i64,
    days_before: i64,
    days_after: i64,
    bypass: bool,
) -> Result<RowSet, RangeError> {
    let today = Local::now().date_naive();
    let window = QueryWindow::around(today, days_before, days_after)?;
    collect_window(store, window, location_id, bypass).await
}

/// Collects the rows for every day in `window`, in chronological then page order
pub async fn collect_window<F: Fetcher>(
    store: &CacheStore<F>,
    window: QueryWindow,
    location_id: i64,
    bypass: bool,
) -> Result<RowSet, RangeError> {
    debug!(
        start = %window.start(),
        end = %window.end(),
        location_id,
        bypass,
        "Collecting window"
    );

    let mut rows = RowSet::new();
    for day in window.days() {
        let day_rows = store.get_or_fetch(day, location_id, bypass).await?;
        rows.extend(day_rows);
    }

    Ok(rows)
}
