//! Public holidays: records, the lookup seam used by the projector, and a
//! store-backed cache that backfills from a remote provider.

use crate::persistence::{HolidayStore, PersistenceError};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// French public holidays, one JSON document per year.
pub const DEFAULT_HOLIDAY_URL: &str =
    "https://calendrier.api.gouv.fr/jours-feries/metropole/{year}.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    #[serde(rename = "holiday_date")]
    pub date: NaiveDate,
    #[serde(rename = "holiday_name")]
    pub name: String,
}

impl Holiday {
    pub fn new(date: NaiveDate, name: impl Into<String>) -> Self {
        Self {
            date,
            name: name.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum HolidayError {
    #[error("holiday provider error: {0}")]
    Provider(String),
    #[cfg(feature = "remote_holidays")]
    #[error("holiday request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid holiday table: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("holiday store error: {0}")]
    Store(#[from] PersistenceError),
}

/// Holidays falling in one calendar month.
pub trait HolidaySource {
    fn holidays_for_month(&self, year: i32, month: u32) -> Result<Vec<Holiday>, HolidayError>;
}

/// Full-year holiday tables from an external calendar.
pub trait HolidayProvider {
    fn fetch_year(&self, year: i32) -> Result<Vec<Holiday>, HolidayError>;
}

/// Parses a `{"YYYY-MM-DD": "label", ...}` table. Keys that are not dates are
/// skipped.
pub fn parse_holiday_table(json: &str) -> Result<Vec<Holiday>, HolidayError> {
    let table: BTreeMap<String, String> = serde_json::from_str(json)?;
    let holidays = table
        .into_iter()
        .filter_map(|(date, name)| {
            NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
                .ok()
                .map(|date| Holiday::new(date, name))
        })
        .collect();
    Ok(holidays)
}

/// A source without any holidays.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHolidays;

impl HolidaySource for NoHolidays {
    fn holidays_for_month(&self, _year: i32, _month: u32) -> Result<Vec<Holiday>, HolidayError> {
        Ok(Vec::new())
    }
}

/// Serves a fixed holiday list, e.g. one read from a file.
#[derive(Debug, Clone, Default)]
pub struct StaticHolidayProvider {
    holidays: Vec<Holiday>,
}

impl StaticHolidayProvider {
    pub fn new(holidays: Vec<Holiday>) -> Self {
        Self { holidays }
    }

    pub fn from_json(json: &str) -> Result<Self, HolidayError> {
        Ok(Self::new(parse_holiday_table(json)?))
    }
}

impl HolidayProvider for StaticHolidayProvider {
    fn fetch_year(&self, year: i32) -> Result<Vec<Holiday>, HolidayError> {
        Ok(self
            .holidays
            .iter()
            .filter(|h| h.date.year() == year)
            .cloned()
            .collect())
    }
}

/// Looks holidays up in a store and, when a month has no cached rows, fetches
/// the year from the provider and stores that month's entries.
#[derive(Clone)]
pub struct CachedHolidays {
    store: Arc<dyn HolidayStore + Send + Sync>,
    provider: Arc<dyn HolidayProvider + Send + Sync>,
}

impl CachedHolidays {
    pub fn new(
        store: Arc<dyn HolidayStore + Send + Sync>,
        provider: Arc<dyn HolidayProvider + Send + Sync>,
    ) -> Self {
        Self { store, provider }
    }
}

impl HolidaySource for CachedHolidays {
    fn holidays_for_month(&self, year: i32, month: u32) -> Result<Vec<Holiday>, HolidayError> {
        let cached = self.store.holidays_in_month(year, month)?;
        if !cached.is_empty() {
            debug!(year, month, count = cached.len(), "holiday cache hit");
            return Ok(cached);
        }

        let mut matching: Vec<Holiday> = self
            .provider
            .fetch_year(year)?
            .into_iter()
            .filter(|h| h.date.year() == year && h.date.month() == month)
            .collect();
        matching.sort_by_key(|h| h.date);
        for holiday in &matching {
            self.store.insert_holiday(holiday)?;
        }
        info!(year, month, count = matching.len(), "holidays backfilled from provider");
        Ok(matching)
    }
}

#[cfg(feature = "remote_holidays")]
pub use remote::HttpHolidayProvider;

#[cfg(feature = "remote_holidays")]
mod remote {
    use super::{Holiday, HolidayError, HolidayProvider, parse_holiday_table};
    use std::time::Duration;

    /// Fetches `{year}.json` documents over HTTP.
    #[derive(Debug, Clone)]
    pub struct HttpHolidayProvider {
        url_template: String,
        timeout: Duration,
    }

    impl HttpHolidayProvider {
        pub fn new(url_template: impl Into<String>) -> Self {
            Self {
                url_template: url_template.into(),
                timeout: Duration::from_secs(10),
            }
        }

        pub fn with_timeout(mut self, timeout: Duration) -> Self {
            self.timeout = timeout;
            self
        }

        pub fn url_for(&self, year: i32) -> String {
            self.url_template.replace("{year}", &year.to_string())
        }
    }

    impl Default for HttpHolidayProvider {
        fn default() -> Self {
            Self::new(super::DEFAULT_HOLIDAY_URL)
        }
    }

    impl HolidayProvider for HttpHolidayProvider {
        fn fetch_year(&self, year: i32) -> Result<Vec<Holiday>, HolidayError> {
            // Built per call: a blocking client must not be dropped on an async
            // runtime thread.
            let client = reqwest::blocking::Client::builder()
                .timeout(self.timeout)
                .build()?;
            let body = client
                .get(self.url_for(year))
                .send()?
                .error_for_status()?
                .text()?;
            parse_holiday_table(&body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holiday_table_skips_malformed_keys() {
        let json = r#"{"2024-05-01": "1er mai", "not-a-date": "x", "2024-07-14": "14 juillet"}"#;
        let holidays = parse_holiday_table(json).unwrap();
        assert_eq!(holidays.len(), 2);
        assert_eq!(holidays[0].date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(holidays[1].name, "14 juillet");
    }

    #[test]
    fn static_provider_filters_by_year() {
        let provider = StaticHolidayProvider::from_json(
            r#"{"2023-12-25": "Noël", "2024-12-25": "Noël"}"#,
        )
        .unwrap();
        let holidays = provider.fetch_year(2024).unwrap();
        assert_eq!(holidays.len(), 1);
        assert_eq!(holidays[0].date.year(), 2024);
    }
}
