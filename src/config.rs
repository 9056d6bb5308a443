//! Immutable configuration shared by every component of the pipeline.
//!
//! Build one with [`ImgwConfig::builder`] (or take [`ImgwConfig::default`]) and hand it to
//! [`crate::Imgw::with_config`]. Nothing in the crate reads ambient global state, so tests can
//! point the client at fake endpoints and use deterministic timings.

use bon::Builder;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "https://danepubliczne.imgw.pl/api/data";
pub const DEFAULT_ARCHIVE_BASE_URL: &str =
    "https://danepubliczne.imgw.pl/data/dane_pomiarowo_obserwacyjne/";
pub const DEFAULT_ALLOWED_HOST: &str = "danepubliczne.imgw.pl";

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BACKOFF_MULTIPLIER: u32 = 2;
pub const DEFAULT_BACKOFF_BASE_DELAY: Duration = Duration::from_secs(1);

pub const MIN_ROWS_PER_SHEET: usize = 50_000;
pub const MAX_ROWS_PER_SHEET: usize = 500_000;
pub const DEFAULT_MAX_ROWS_PER_SHEET: usize = MAX_ROWS_PER_SHEET;
pub const DEFAULT_SHEET_PREFIX: &str = "Dane";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("max_rows_per_sheet must be within [{min}, {max}], got {value}")]
    RowLimitOutOfRange {
        value: usize,
        min: usize,
        max: usize,
    },

    #[error("Date range start {start} is after its end {end}")]
    InvertedDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("station_id '{station_id}' and station_name '{station_name}' are mutually exclusive")]
    ConflictingStationFilters {
        station_id: String,
        station_name: String,
    },

    #[error("Legend declares {legend_columns} column(s) but the data file has {data_columns}")]
    LegendColumnMismatch {
        legend_columns: usize,
        data_columns: usize,
    },
}

/// Settings consumed by the fetcher, the clients and the exporter.
#[derive(Debug, Clone, Builder)]
pub struct ImgwConfig {
    /// Root of the operational API, without the `/{synop|hydro|meteo}` suffix.
    #[builder(into, default = DEFAULT_API_BASE_URL.to_string())]
    pub api_base_url: String,

    /// Root of the historical archive tree, ending in `/`.
    #[builder(into, default = DEFAULT_ARCHIVE_BASE_URL.to_string())]
    pub archive_base_url: String,

    /// Hosts the fetcher may contact. An empty list disables the check.
    #[builder(default = vec![DEFAULT_ALLOWED_HOST.to_string()])]
    pub allowed_hosts: Vec<String>,

    #[builder(default = DEFAULT_REQUEST_TIMEOUT)]
    pub request_timeout: Duration,

    /// Total number of attempts per request, the first one included.
    #[builder(default = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    #[builder(default = DEFAULT_BACKOFF_BASE_DELAY)]
    pub backoff_base_delay: Duration,

    #[builder(default = DEFAULT_RETRY_BACKOFF_MULTIPLIER)]
    pub backoff_multiplier: u32,

    #[builder(default = DEFAULT_MAX_ROWS_PER_SHEET)]
    pub max_rows_per_sheet: usize,

    #[builder(into, default = DEFAULT_SHEET_PREFIX.to_string())]
    pub sheet_prefix: String,
}

impl Default for ImgwConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ImgwConfig {
    /// Checks the values that would otherwise only fail deep inside a request or an export.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_retries",
                reason: "at least one attempt is required".to_string(),
            });
        }
        if self.backoff_multiplier == 0 {
            return Err(ConfigError::InvalidValue {
                field: "backoff_multiplier",
                reason: "must be positive".to_string(),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout",
                reason: "must be positive".to_string(),
            });
        }
        if self.sheet_prefix.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "sheet_prefix",
                reason: "must not be blank".to_string(),
            });
        }
        validate_row_limit(self.max_rows_per_sheet)
    }
}

pub fn validate_row_limit(max_rows_per_sheet: usize) -> Result<(), ConfigError> {
    if (MIN_ROWS_PER_SHEET..=MAX_ROWS_PER_SHEET).contains(&max_rows_per_sheet) {
        Ok(())
    } else {
        Err(ConfigError::RowLimitOutOfRange {
            value: max_rows_per_sheet,
            min: MIN_ROWS_PER_SHEET,
            max: MAX_ROWS_PER_SHEET,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ImgwConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.backoff_multiplier, 2);
        assert_eq!(config.max_rows_per_sheet, 500_000);
        assert_eq!(config.allowed_hosts, vec!["danepubliczne.imgw.pl".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_overrides() {
        let config = ImgwConfig::builder()
            .api_base_url("https://danepubliczne.imgw.pl/api/test")
            .max_retries(5)
            .max_rows_per_sheet(50_000)
            .build();
        assert_eq!(config.api_base_url, "https://danepubliczne.imgw.pl/api/test");
        assert_eq!(config.max_retries, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let no_attempts = ImgwConfig::builder().max_retries(0).build();
        assert!(matches!(
            no_attempts.validate(),
            Err(ConfigError::InvalidValue { field: "max_retries", .. })
        ));

        let huge_sheets = ImgwConfig::builder().max_rows_per_sheet(600_000).build();
        assert!(matches!(
            huge_sheets.validate(),
            Err(ConfigError::RowLimitOutOfRange { value: 600_000, .. })
        ));
    }

    #[test]
    fn test_row_limit_bounds_are_inclusive() {
        assert!(validate_row_limit(50_000).is_ok());
        assert!(validate_row_limit(500_000).is_ok());
        assert!(validate_row_limit(49_999).is_err());
        assert!(validate_row_limit(500_001).is_err());
    }
}
