use crate::operational::format::ResponseFormat;
use crate::types::station_kind::StationKind;
use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationalError {
    #[error("The {0} format is meant for display and cannot be parsed into a table")]
    UnsupportedFormat(ResponseFormat),

    #[error("Malformed {format} response: {message}")]
    Parse {
        format: ResponseFormat,
        message: String,
    },

    #[error("Cannot combine {found} data with {expected} data in one table")]
    MixedKinds {
        expected: StationKind,
        found: StationKind,
    },

    #[error("Required column '{0}' not found in table")]
    MissingColumn(String),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),

    #[error("Response parsing task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}
