use std::fmt;

use chrono::NaiveDate;

use crate::data::DISPLAY_DATE_FORMAT;

/// Cache key for one (calendar day, location) pair: `"18.10.2026-31"`
///
/// Built from the calendar date only, so any time of day maps to the same
/// entry and keys stay stable between runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(date: NaiveDate, location_id: i64) -> Self {
        Self(format!("{}-{}", date.format(DISPLAY_DATE_FORMAT), location_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 8).unwrap();
        assert_eq!(CacheKey::new(date, 31).as_str(), "08.10.2026-31");
    }

    #[test]
    fn test_key_ignores_time_of_day() {
        let morning = NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(0, 0, 1)
            .unwrap();
        let night = NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        assert_eq!(CacheKey::new(morning.date(), 7), CacheKey::new(night.date(), 7));
    }

    #[test]
    fn test_keys_differ_by_date_and_location() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let next = day.succ_opt().unwrap();
        assert_ne!(CacheKey::new(day, 31), CacheKey::new(day, 32));
        assert_ne!(CacheKey::new(day, 31), CacheKey::new(next, 31));
    }

    #[test]
    fn test_negative_location_is_kept_verbatim() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(CacheKey::new(day, -4).to_string(), "18.10.2026--4");
    }
}
