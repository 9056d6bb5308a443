//! Provides the `StationClient` for querying the operational IMGW API.
//!
//! Obtained through [`Imgw::stations()`], it turns a [`StationQuery`] into a request URL,
//! parses the response in the requested format and coerces the records into the fixed
//! schema of the station kind.

use crate::error::ImgwError;
use crate::fetcher::error::FetchError;
use crate::fetcher::transport::{Sleeper, Transport};
use crate::imgw::Imgw;
use crate::operational::error::OperationalError;
use crate::operational::format::ResponseFormat;
use crate::operational::hydro::{
    aggregate_category, split_hydro_categories, AggregationInterval, HydroCategory,
};
use crate::operational::{filter_records, records_to_table};
use crate::types::observation_table::ObservationTable;
use crate::types::station_kind::StationKind;
use crate::types::station_query::StationQuery;
use crate::utils::normalize_label;
use bon::bon;
use futures_util::future::try_join_all;
use log::info;
use reqwest::Url;
use tokio::task;

/// Client for near-real-time station data.
///
/// Calling `.kind(..)...call()` or [`StationClient::fetch`] executes the request and returns
/// an [`ObservationTable`] whose columns follow [`StationKind::schema`].
pub struct StationClient<'a, T, S> {
    client: &'a Imgw<T, S>,
}

#[bon]
impl<'a, T: Transport, S: Sleeper> StationClient<'a, T, S> {
    pub(crate) fn new(client: &'a Imgw<T, S>) -> Self {
        Self { client }
    }

    /// Fetches the current data of one kind, optionally narrowed to one station.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use imgw_data::{Imgw, ImgwError, StationKind};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), ImgwError> {
    /// let imgw = Imgw::new();
    /// let table = imgw
    ///     .stations()
    ///     .kind(StationKind::Synop)
    ///     .station_name("Kraków")
    ///     .call()
    ///     .await?;
    /// println!("{}", table.frame);
    /// # Ok(())
    /// # }
    /// ```
    #[builder(start_fn = kind)]
    #[doc(hidden)]
    pub async fn build_kind(
        &self,
        #[builder(start_fn)] kind: StationKind,
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
        self.fetch(&query).await
    }

    /// Runs one query.
    ///
    /// No matching station is not an error: the table then has the schema's columns and
    /// zero rows.
    ///
    /// # Errors
    ///
    /// Any failure is wrapped in [`ImgwError::StationQuery`], which names the kind and the
    /// station filter. Conflicting filters and the display-only HTML format are rejected
    /// before a request is made.
    pub async fn fetch(&self, query: &StationQuery) -> Result<ObservationTable, ImgwError> {
        self.fetch_table(query)
            .await
            .map_err(|source| ImgwError::StationQuery {
                kind: query.kind,
                filter: query.filter_description(),
                source: Box::new(source),
            })
    }

    /// Returns the response body as served, without parsing. Useful for the HTML format.
    pub async fn fetch_raw(&self, query: &StationQuery) -> Result<Vec<u8>, ImgwError> {
        self.raw_body(query)
            .await
            .map_err(|source| ImgwError::StationQuery {
                kind: query.kind,
                filter: query.filter_description(),
                source: Box::new(source),
            })
    }

    /// Runs several queries of the same kind concurrently.
    ///
    /// Rows are concatenated in the order of `queries`, whatever order the responses
    /// arrive in. The first failure fails the whole call.
    pub async fn fetch_many(&self, queries: &[StationQuery]) -> Result<ObservationTable, ImgwError> {
        let Some(first) = queries.first() else {
            return Ok(ObservationTable::empty());
        };
        if let Some(other) = queries.iter().find(|query| query.kind != first.kind) {
            return Err(OperationalError::MixedKinds {
                expected: first.kind,
                found: other.kind,
            }
            .into());
        }

        let tables = try_join_all(queries.iter().map(|query| self.fetch(query))).await?;
        let mut combined = ObservationTable::empty();
        for table in &tables {
            combined = combined.concat(table).map_err(OperationalError::from)?;
        }
        info!(
            "Combined {} {} queries into {} row(s)",
            queries.len(),
            first.kind,
            combined.height()
        );
        Ok(combined)
    }

    /// Fetches hydro data and splits it into one table per measurement.
    pub async fn hydro_categories(
        &self,
        query: &StationQuery,
    ) -> Result<Vec<(HydroCategory, ObservationTable)>, ImgwError> {
        if query.kind != StationKind::Hydro {
            return Err(OperationalError::MixedKinds {
                expected: StationKind::Hydro,
                found: query.kind,
            }
            .into());
        }
        let table = self.fetch(query).await?;
        Ok(split_hydro_categories(&table)?)
    }

    /// Like [`StationClient::hydro_categories`], with every category averaged per station
    /// over `interval`.
    pub async fn hydro_aggregates(
        &self,
        query: &StationQuery,
        interval: AggregationInterval,
    ) -> Result<Vec<(HydroCategory, ObservationTable)>, ImgwError> {
        let mut aggregated = Vec::new();
        for (category, table) in self.hydro_categories(query).await? {
            if table.frame.column(category.date_field).is_err() {
                continue;
            }
            aggregated.push((category, aggregate_category(&table, &category, interval)?));
        }
        Ok(aggregated)
    }

    async fn raw_body(&self, query: &StationQuery) -> Result<Vec<u8>, ImgwError> {
        query.validate()?;
        let url = self.query_url(query)?;
        Ok(self.client.fetcher().fetch(&url, &[], None).await?)
    }

    async fn fetch_table(&self, query: &StationQuery) -> Result<ObservationTable, ImgwError> {
        if query.format == ResponseFormat::Html {
            query.validate()?;
            return Err(OperationalError::UnsupportedFormat(query.format).into());
        }
        let body = self.raw_body(query).await?;

        let kind = query.kind;
        let format = query.format;
        let client_side_id = if kind.server_filters().by_id {
            None
        } else {
            query.station_id.clone()
        };
        let name = query.station_name.clone();
        let table = task::spawn_blocking(move || {
            let records = format.parse(&body)?;
            let records = filter_records(kind, records, client_side_id.as_deref(), name.as_deref());
            records_to_table(kind, &records)
        })
        .await
        .map_err(OperationalError::from)??;

        info!("Loaded {} {} row(s)", table.height(), kind);
        Ok(table)
    }

    /// `{api_base}/{kind}[/id/{id} | /station/{name}][/format/{format}]`
    fn query_url(&self, query: &StationQuery) -> Result<String, FetchError> {
        let base = &self.client.config().api_base_url;
        let invalid = |reason: String| FetchError::InvalidUrl {
            url: base.clone(),
            reason,
        };
        let mut url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| invalid("URL cannot be a base".to_string()))?;
            segments.pop_if_empty().push(query.kind.path_segment());

            let server = query.kind.server_filters();
            match (&query.station_id, &query.station_name) {
                (Some(id), _) if server.by_id => {
                    segments.push("id").push(id.trim());
                }
                (None, Some(name)) if server.by_name => {
                    segments.push("station").push(&normalize_label(name));
                }
                _ => {}
            }
            if let Some(format) = query.format.path_segment() {
                segments.push("format").push(format);
            }
        }
        Ok(url.to_string())
    }
}
