use crate::config::ConfigError;
use polars::error::PolarsError;
use rust_xlsxwriter::XlsxError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to write spreadsheet")]
    Xlsx(#[from] XlsxError),

    #[error("Failed reading table for export: {0}")]
    DataFrameProcessing(#[from] PolarsError),

    #[error("Failed to write '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
