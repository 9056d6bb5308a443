use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Cannot filter by station '{filter}': no station column among {columns:?}")]
    MissingStationColumn {
        filter: String,
        columns: Vec<String>,
    },

    #[error("Cannot filter by date: no date, or year and month, columns among {columns:?}")]
    MissingDateColumn { columns: Vec<String> },

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}
