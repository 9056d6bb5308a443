//! Chunked spreadsheet export.
//!
//! Tables larger than one sheet allows are split into consecutive sheets. Every sheet gets
//! the full header row, and concatenating the sheets in order gives back the original
//! table.

pub mod chunking;
pub mod error;
mod workbook;

use crate::export::chunking::{chunk_table, ExportChunk, MAX_SHEET_NAME_CHARS};
use crate::export::error::ExportError;
use crate::export::workbook::write_workbook;
use crate::types::observation_table::ObservationTable;
use crate::utils::truncate_chars;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::{fs, task};

/// How chunks are distributed over files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportLayout {
    /// All sheets in one workbook.
    #[default]
    SingleWorkbook,
    /// One workbook per sheet.
    WorkbookPerSheet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSummary {
    pub name: String,
    pub rows: usize,
}

/// One produced `.xlsx` file, held in memory.
#[derive(Debug, Clone)]
pub struct SpreadsheetArtifact {
    pub file_name: String,
    pub sheets: Vec<SheetSummary>,
    pub bytes: Vec<u8>,
}

impl SpreadsheetArtifact {
    /// Rows written across all sheets, headers excluded.
    pub fn total_rows(&self) -> usize {
        self.sheets.iter().map(|sheet| sheet.rows).sum()
    }
}

async fn build_artifact(
    file_name: String,
    sheets: Vec<(String, ObservationTable)>,
) -> Result<SpreadsheetArtifact, ExportError> {
    let summaries = sheets
        .iter()
        .map(|(name, table)| SheetSummary {
            name: name.clone(),
            rows: table.height(),
        })
        .collect();
    let bytes = task::spawn_blocking(move || write_workbook(&sheets)).await??;
    info!("Built {} ({} bytes)", file_name, bytes.len());
    Ok(SpreadsheetArtifact {
        file_name,
        sheets: summaries,
        bytes,
    })
}

fn into_sheet(chunk: ExportChunk) -> (String, ObservationTable) {
    (chunk.sheet_name, chunk.table)
}

/// Exports a table as one or more workbooks.
///
/// The row limit is checked before anything is written.
pub(crate) async fn export_table(
    table: &ObservationTable,
    max_rows_per_sheet: usize,
    sheet_prefix: &str,
    layout: ExportLayout,
    file_stem: &str,
) -> Result<Vec<SpreadsheetArtifact>, ExportError> {
    let chunks = chunk_table(table, max_rows_per_sheet, sheet_prefix)?;
    info!(
        "Exporting {} row(s) into {} sheet(s), {:?}",
        table.height(),
        chunks.len(),
        layout
    );

    match layout {
        ExportLayout::SingleWorkbook => {
            let sheets = chunks.into_iter().map(into_sheet).collect();
            Ok(vec![build_artifact(format!("{file_stem}.xlsx"), sheets).await?])
        }
        ExportLayout::WorkbookPerSheet => {
            let single = chunks.len() == 1;
            let mut artifacts = Vec::with_capacity(chunks.len());
            for chunk in chunks {
                let file_name = if single {
                    format!("{file_stem}.xlsx")
                } else {
                    format!("{file_stem}_{}.xlsx", chunk.index)
                };
                artifacts.push(build_artifact(file_name, vec![into_sheet(chunk)]).await?);
            }
            Ok(artifacts)
        }
    }
}

/// Exports several tables into one workbook, each under its own sheet name.
///
/// A table longer than the row limit continues on numbered sheets (`Name1`, `Name2`, ...).
pub(crate) async fn export_named_sheets(
    tables: Vec<(String, ObservationTable)>,
    max_rows_per_sheet: usize,
    file_stem: &str,
) -> Result<SpreadsheetArtifact, ExportError> {
    let mut sheets = Vec::new();
    for (name, table) in &tables {
        let name = truncate_chars(name, MAX_SHEET_NAME_CHARS);
        sheets.extend(
            chunk_table(table, max_rows_per_sheet, &name)?
                .into_iter()
                .map(into_sheet),
        );
    }
    info!("Exporting {} named table(s) into {} sheet(s)", tables.len(), sheets.len());
    build_artifact(format!("{file_stem}.xlsx"), sheets).await
}

/// Writes artifacts into `dir`, creating it if needed, and returns the written paths.
///
/// Files are written one after another. If one fails, the files written before it stay.
pub async fn write_artifacts(
    dir: &Path,
    artifacts: &[SpreadsheetArtifact],
) -> Result<Vec<PathBuf>, ExportError> {
    fs::create_dir_all(dir).await.map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let path = dir.join(&artifact.file_name);
        fs::write(&path, &artifact.bytes)
            .await
            .map_err(|source| ExportError::Io {
                path: path.clone(),
                source,
            })?;
        info!("Wrote {:?}", path);
        written.push(path);
    }
    Ok(written)
}
