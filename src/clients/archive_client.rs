//! Provides the `ArchiveClient` for historical data files.
//!
//! Obtained through [`Imgw::archive()`]. It downloads a data file and its legend, unpacks
//! the container, reads the raw table and hands it to the normalizer.

use crate::archive::error::ArchiveError;
use crate::archive::listing::{parse_directory_listing, DirectoryEntry};
use crate::archive::reader::{empty_raw_table, read_raw_table};
use crate::archive::{members, unpack, ArchivePayload};
use crate::config::ConfigError;
use crate::error::ImgwError;
use crate::fetcher::transport::{Sleeper, Transport};
use crate::imgw::Imgw;
use crate::legend::parse_legend;
use crate::normalize::normalizer::{normalize, Normalized};
use crate::types::archive_request::ArchiveRequest;
use crate::utils::decode_text;
use log::{debug, info, warn};
use reqwest::Url;
use tokio::task;

/// Client for the historical archive tree.
pub struct ArchiveClient<'a, T, S> {
    client: &'a Imgw<T, S>,
}

impl<'a, T: Transport, S: Sleeper> ArchiveClient<'a, T, S> {
    pub(crate) fn new(client: &'a Imgw<T, S>) -> Self {
        Self { client }
    }

    /// Downloads a data file and its legend and extracts the data member.
    ///
    /// `member` picks the file to read from a ZIP archive holding more than one `.csv`.
    ///
    /// # Errors
    ///
    /// Fetch errors, [`ArchiveError::AmbiguousSelection`] when several candidates exist and
    /// none was named, other [`ArchiveError`]s for unusable containers, and
    /// [`crate::LegendError::Empty`] when the legend names no column.
    pub async fn fetch_archive(
        &self,
        data_url: &str,
        info_url: &str,
        member: Option<&str>,
    ) -> Result<ArchivePayload, ImgwError> {
        let fetcher = self.client.fetcher();
        let data = fetcher.fetch(data_url, &[], None).await?;
        let info = fetcher.fetch(info_url, &[], None).await?;

        let legend = parse_legend(&info)?;
        let (member_name, data) = unpack(data_url, data, member).await?;
        info!(
            "Archive {}: member '{}' ({} bytes), legend with {} column(s)",
            data_url,
            member_name,
            data.len(),
            legend.len()
        );
        Ok(ArchivePayload {
            data,
            member_name,
            legend,
        })
    }

    /// Names of the files inside the archive at `data_url`.
    pub async fn list_members(&self, data_url: &str) -> Result<Vec<String>, ImgwError> {
        let bytes = self.client.fetcher().fetch(data_url, &[], None).await?;
        Ok(members(data_url, bytes).await?)
    }

    /// Lists a directory page of the archive tree.
    pub async fn list_directory(&self, url: &str) -> Result<Vec<DirectoryEntry>, ImgwError> {
        let bytes = self.client.fetcher().fetch(url, &[], None).await?;
        let entries = parse_directory_listing(&decode_text(&bytes));
        info!("{} lists {} entries", url, entries.len());
        Ok(entries)
    }

    /// Joins a link from a directory listing onto the configured archive base.
    ///
    /// ```
    /// # use imgw_data::Imgw;
    /// let imgw = Imgw::new();
    /// let url = imgw.archive().resolve("dane_meteorologiczne/dobowe/klimat/").unwrap();
    /// assert_eq!(
    ///     url,
    ///     "https://danepubliczne.imgw.pl/data/dane_pomiarowo_obserwacyjne/dane_meteorologiczne/dobowe/klimat/"
    /// );
    /// ```
    pub fn resolve(&self, href: &str) -> Result<String, ImgwError> {
        let invalid = |reason: String| ArchiveError::InvalidHref {
            href: href.to_string(),
            reason,
        };
        let base = Url::parse(&self.client.config().archive_base_url)
            .map_err(|e| invalid(format!("archive base: {e}")))?;
        let joined = base.join(href).map_err(|e| invalid(e.to_string()))?;
        Ok(joined.to_string())
    }

    /// Runs the whole pipeline for one historical file: download, unpack, read, rename
    /// through the legend, type, and filter.
    ///
    /// # Errors
    ///
    /// Every failure is wrapped in [`ImgwError::ArchiveRequest`]. A legend whose column count
    /// differs from the widest row of the data file is a [`ConfigError::LegendColumnMismatch`].
    /// An empty data file loads as a zero-row table with the legend's columns.
    pub async fn load(&self, request: &ArchiveRequest) -> Result<Normalized, ImgwError> {
        self.load_normalized(request)
            .await
            .map_err(|source| ImgwError::ArchiveRequest {
                data_url: request.data_url.clone(),
                frequency: request.frequency,
                station_filter: request.station_filter.clone(),
                source: Box::new(source),
            })
    }

    async fn load_normalized(&self, request: &ArchiveRequest) -> Result<Normalized, ImgwError> {
        let payload = self
            .fetch_archive(&request.data_url, &request.info_url, request.member.as_deref())
            .await?;

        let member = payload.member_name.clone();
        let data = payload.data;
        let legend_columns = payload.legend.len();
        let raw = task::spawn_blocking(move || {
            read_raw_table(&data).and_then(|raw| {
                if raw.width() == 0 {
                    debug!("{member} holds no rows");
                    empty_raw_table(legend_columns)
                } else {
                    Ok(raw)
                }
            })
        })
        .await
        .map_err(ArchiveError::from)?
        .map_err(|source| ArchiveError::TableRead {
            member: payload.member_name.clone(),
            source,
        })?;

        if raw.width() != payload.legend.len() {
            return Err(ConfigError::LegendColumnMismatch {
                legend_columns: payload.legend.len(),
                data_columns: raw.width(),
            }
            .into());
        }

        let legend = payload.legend;
        let date_range = request.date_range;
        let station_filter = request.station_filter.clone();
        let normalized = task::spawn_blocking(move || {
            normalize(raw, Some(&legend), date_range, station_filter.as_deref())
        })
        .await
        .map_err(ArchiveError::from)??;

        for warning in &normalized.warnings {
            warn!("{}: {}", request.data_url, warning);
        }
        info!(
            "Loaded {} {} row(s) from {}",
            normalized.table.height(),
            request.frequency,
            payload.member_name
        );
        Ok(normalized)
    }
}
