//! Lunar-day page client
//!
//! Fetches the per-day "moon day info" page for a location and extracts the
//! start of each lunar day from the events table.

use std::time::Duration;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, info};

use super::html;
use super::{Fetcher, Row, RowSet, DISPLAY_DATE_FORMAT, URL_DATE_FORMAT};

/// Base URL of the lunar-day pages; the date and location are appended as path segments
pub const DEFAULT_BASE_URL: &str = "https://www.life-moon.pp.ru/moon-day-info";

/// The whole request, including reading the body, must finish within this time
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Class of the table that lists the day's lunar events
const EVENTS_TABLE_CLASS: &str = "moon-events-table";

/// Matches "начало 27 лунного дня" and captures the lunar day number
static LUNAR_DAY_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"начало\s*(\d+)\s*лунного\s*дня").expect("Invalid lunar day regex")
});

/// Errors that can occur when fetching a lunar-day page
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed (connection, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with something other than 200 OK
    #[error("Unexpected status {status} from {url}")]
    Status { status: StatusCode, url: String },
}

/// Client for the lunar-day pages
#[derive(Debug, Clone)]
pub struct MoonDayClient {
    /// HTTP client with the request timeout applied
    http_client: Client,
    /// Base URL without the date/location suffix
    base_url: String,
}

impl MoonDayClient {
    /// Creates a client against the public site
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a client against a custom base URL (mirrors, local test servers)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let http_client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }

    /// Builds the page URL for a date and location
    fn page_url(&self, date: NaiveDate, location_id: i64) -> String {
        format!(
            "{}/{}/{}/",
            self.base_url.trim_end_matches('/'),
            date.format(URL_DATE_FORMAT),
            location_id
        )
    }
}

impl Fetcher for MoonDayClient {
    async fn fetch(&self, date: NaiveDate, location_id: i64) -> Result<RowSet, FetchError> {
        let url = self.page_url(date, location_id);
        info!(%url, "Fetching lunar day page");

        let response = self.http_client.get(&url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status { status, url });
        }

        let body = response.text().await?;
        let rows = parse_rows(&body, date);
        debug!(%url, rows = rows.len(), "Parsed lunar day page");
        Ok(rows)
    }
}

/// Extracts the lunar-day rows from a page
///
/// Each row of the events table body contributes `("<DD.MM.YYYY> <first cell>",
/// "<day number>")` when its second cell mentions the start of a lunar day.
/// Other rows are skipped, and a page without the table yields no rows.
pub fn parse_rows(document: &str, date: NaiveDate) -> RowSet {
    let Some(table) = html::find_by_class(document, "table", EVENTS_TABLE_CLASS) else {
        debug!("No events table in page");
        return Vec::new();
    };

    // Header rows live in <thead>; only body rows count, from every <tbody>.
    let mut bodies = html::elements(table, "tbody");
    if bodies.is_empty() {
        bodies.push(table);
    }
    let date_label = date.format(DISPLAY_DATE_FORMAT).to_string();

    bodies
        .into_iter()
        .flat_map(|body| html::elements(body, "tr"))
        .filter(|row| !row.to_ascii_lowercase().contains("<th"))
        .filter_map(|row| {
            let cells = html::elements(row, "td");
            let label = html::text_content(cells.first()?);
            let description = html::text_content(cells.get(1)?);
            let day = LUNAR_DAY_START.captures(&description)?.get(1)?.as_str().to_string();
            Some(Row::new(format!("{} {}", date_label, label), day))
        })
        .collect()
}
