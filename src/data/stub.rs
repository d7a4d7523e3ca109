//! Scripted `Fetcher` used by the cache and range tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::StatusCode;

use super::{FetchError, Fetcher, RowSet};

/// Fetcher that answers from a closure and counts how often it was asked
///
/// The closure receives the date, the location and the zero-based call index.
pub(crate) struct StubFetcher<G> {
    respond: G,
    calls: Arc<AtomicUsize>,
}

impl<G> StubFetcher<G>
where
    G: Fn(NaiveDate, i64, usize) -> Result<RowSet, FetchError>,
{
    /// Returns the stub and a shared handle to its call counter
    pub(crate) fn new(respond: G) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let stub = Self {
            respond,
            calls: Arc::clone(&calls),
        };
        (stub, calls)
    }
}

impl<G> Fetcher for StubFetcher<G>
where
    G: Fn(NaiveDate, i64, usize) -> Result<RowSet, FetchError>,
{
    async fn fetch(&self, date: NaiveDate, location_id: i64) -> Result<RowSet, FetchError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)(date, location_id, call)
    }
}

/// A fetch failure as the HTTP client would report a 503
pub(crate) fn unavailable() -> FetchError {
    FetchError::Status {
        status: StatusCode::SERVICE_UNAVAILABLE,
        url: "http://stub.invalid/".to_string(),
    }
}

pub(crate) fn call_count(calls: &AtomicUsize) -> usize {
    calls.load(Ordering::SeqCst)
}
