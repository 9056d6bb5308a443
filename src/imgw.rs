//! This module provides the main entry point for talking to the IMGW public data
//! service. It owns the configuration and the retrying fetcher, and hands out the
//! operational, archive and export clients.

use crate::clients::archive_client::ArchiveClient;
use crate::clients::export_client::ExportClient;
use crate::clients::station_client::StationClient;
use crate::config::{ConfigError, ImgwConfig};
use crate::error::ImgwError;
use crate::fetcher::transport::{ReqwestTransport, Sleeper, TokioSleeper, Transport};
use crate::fetcher::RetryingFetcher;
use crate::normalize::normalizer::Normalized;
use crate::operational::format::ResponseFormat;
use crate::types::archive_request::ArchiveRequest;
use crate::types::date_range::DateRange;
use crate::types::frequency::Frequency;
use crate::types::observation_table::ObservationTable;
use crate::types::station_kind::StationKind;
use crate::types::station_query::StationQuery;
use bon::bon;

/// The main client struct for accessing IMGW data.
///
/// Create one with [`Imgw::new()`] for the public service defaults, or
/// [`Imgw::with_config()`] to change endpoints, timeouts, retries or export limits.
/// The configuration is fixed for the lifetime of the client.
///
/// # Examples
///
/// ```no_run
/// # use imgw_data::{Imgw, ImgwError, StationKind};
/// # #[tokio::main]
/// # async fn main() -> Result<(), ImgwError> {
/// let imgw = Imgw::new();
/// let table = imgw
///     .station_data()
///     .kind(StationKind::Hydro)
///     .station_id("150190340")
///     .call()
///     .await?;
/// println!("{}", table.frame);
/// # Ok(())
/// # }
/// ```
pub struct Imgw<T = ReqwestTransport, S = TokioSleeper> {
    config: ImgwConfig,
    fetcher: RetryingFetcher<T, S>,
}

impl Imgw {
    /// Creates a client with [`ImgwConfig::default`].
    pub fn new() -> Self {
        let config = ImgwConfig::default();
        let fetcher = RetryingFetcher::new(&config, ReqwestTransport::new(), TokioSleeper);
        Self { config, fetcher }
    }

    /// Creates a client with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] of [`ImgwConfig::validate`].
    ///
    /// ```
    /// # use imgw_data::{Imgw, ImgwConfig};
    /// let config = ImgwConfig::builder().max_retries(5).build();
    /// let imgw = Imgw::with_config(config).unwrap();
    /// assert_eq!(imgw.config().max_retries, 5);
    ///
    /// let broken = ImgwConfig::builder().max_rows_per_sheet(10).build();
    /// assert!(Imgw::with_config(broken).is_err());
    /// ```
    pub fn with_config(config: ImgwConfig) -> Result<Self, ConfigError> {
        Self::with_parts(config, ReqwestTransport::new(), TokioSleeper)
    }
}

impl Default for Imgw {
    fn default() -> Self {
        Self::new()
    }
}

#[bon]
impl<T: Transport, S: Sleeper> Imgw<T, S> {
    /// Creates a client on top of a custom transport and sleeper, for instance a
    /// `reqwest::Client` with a proxy wrapped in
    /// [`ReqwestTransport::with_client`](crate::ReqwestTransport::with_client).
    pub fn with_parts(config: ImgwConfig, transport: T, sleeper: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let fetcher = RetryingFetcher::new(&config, transport, sleeper);
        Ok(Self { config, fetcher })
    }

    pub fn config(&self) -> &ImgwConfig {
        &self.config
    }

    pub(crate) fn fetcher(&self) -> &RetryingFetcher<T, S> {
        &self.fetcher
    }

    /// Operational (near-real-time) station data.
    pub fn stations(&self) -> StationClient<'_, T, S> {
        StationClient::new(self)
    }

    /// Historical data files.
    pub fn archive(&self) -> ArchiveClient<'_, T, S> {
        ArchiveClient::new(self)
    }

    /// Spreadsheet export with this client's row limit and sheet prefix.
    pub fn export(&self) -> ExportClient<'_> {
        ExportClient::new(&self.config)
    }

    /// Fetches operational data for one kind of station.
    ///
    /// Shorthand for building a [`StationQuery`] and passing it to
    /// [`StationClient::fetch`].
    #[builder]
    pub async fn station_data(
        &self,
        kind: StationKind,
        #[builder(into)] station_id: Option<String>,
        #[builder(into)] station_name: Option<String>,
        format: Option<ResponseFormat>,
    ) -> Result<ObservationTable, ImgwError> {
        let query = StationQuery {
            kind,
            station_id,
            station_name,
            format: format.unwrap_or_default(),
        };
        self.stations().fetch(&query).await
    }

    /// Loads and normalizes one historical data file.
    ///
    /// Shorthand for building an [`ArchiveRequest`] and passing it to
    /// [`ArchiveClient::load`].
    ///
    /// ```no_run
    /// # use imgw_data::{DateRange, Frequency, Imgw, ImgwError};
    /// # use chrono::NaiveDate;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), ImgwError> {
    /// let base = "https://danepubliczne.imgw.pl/data/dane_pomiarowo_obserwacyjne/dane_meteorologiczne/dobowe/synop";
    /// let january = DateRange::new(
    ///     NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
    ///     NaiveDate::from_ymd_opt(2023, 1, 31).unwrap(),
    /// )?;
    /// let normalized = Imgw::new()
    ///     .archive_data()
    ///     .data_url(format!("{base}/2023/2023_01_s.zip"))
    ///     .info_url(format!("{base}/s_d_format.txt"))
    ///     .frequency(Frequency::Daily)
    ///     .station_filter("Kraków")
    ///     .date_range(january)
    ///     .call()
    ///     .await?;
    /// println!("{}", normalized.table.frame);
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn archive_data(
        &self,
        #[builder(into)] data_url: String,
        #[builder(into)] info_url: String,
        frequency: Frequency,
        #[builder(into)] station_filter: Option<String>,
        date_range: Option<DateRange>,
        #[builder(into)] member: Option<String>,
    ) -> Result<Normalized, ImgwError> {
        let request = ArchiveRequest {
            data_url,
            info_url,
            frequency,
            station_filter,
            date_range,
            member,
        };
        self.archive().load(&request).await
    }
}
