//! Client and processing pipeline for the public data service of the Polish Institute of
//! Meteorology and Water Management (IMGW-PIB).
//!
//! * [`Imgw::stations`] reads the operational API (hydro, synop and meteo stations).
//! * [`Imgw::archive`] downloads historical data files with their legends and normalizes
//!   them into typed tables.
//! * [`Imgw::export`] writes tables to `.xlsx` workbooks split into row-limited sheets.

mod archive;
mod clients;
mod config;
mod error;
mod export;
mod fetcher;
mod imgw;
mod legend;
mod normalize;
mod operational;
mod types;
mod utils;

#[cfg(test)]
mod test_support;

pub use error::{ErrorKind, ImgwError};
pub use imgw::*;

pub use clients::archive_client::*;
pub use clients::export_client::*;
pub use clients::station_client::*;

pub use config::*;

pub use fetcher::error::{FetchError, TransientFailure, TransportError};
pub use fetcher::retry::RetryPolicy;
pub use fetcher::transport::{RawResponse, ReqwestTransport, Sleeper, TokioSleeper, Transport};
pub use fetcher::RetryingFetcher;

pub use operational::error::OperationalError;
pub use operational::format::{ApiRecord, ResponseFormat};
pub use operational::hydro::{
    aggregate_category, split_hydro_categories, AggregationInterval, HydroCategory,
    HYDRO_CATEGORIES, HYDRO_STATION_FIELDS,
};
pub use operational::schema::{FieldSpec, FieldType};

pub use archive::container::ContainerKind;
pub use archive::error::ArchiveError;
pub use archive::listing::{parse_directory_listing, DirectoryEntry};
pub use archive::reader::read_raw_table;
pub use archive::ArchivePayload;

pub use legend::error::LegendError;
pub use legend::{parse_legend, LegendEntry, LegendMap, SentinelNote};

pub use normalize::dates::DERIVED_DATE_COLUMN;
pub use normalize::error::NormalizeError;
pub use normalize::filters::STATION_COLUMNS;
pub use normalize::normalizer::{normalize, NormalizeWarning, Normalized};

pub use export::chunking::{chunk_table, sheet_count, sheet_name, ExportChunk, MAX_SHEET_NAME_CHARS};
pub use export::error::ExportError;
pub use export::{write_artifacts, ExportLayout, SheetSummary, SpreadsheetArtifact};

pub use types::archive_request::ArchiveRequest;
pub use types::date_range::DateRange;
pub use types::frequency::Frequency;
pub use types::observation_table::{CellValue, ObservationTable};
pub use types::sentinel::*;
pub use types::station_kind::{ServerFilters, StationKind};
pub use types::station_query::StationQuery;

pub use utils::{normalize_label, strip_polish_diacritics};
