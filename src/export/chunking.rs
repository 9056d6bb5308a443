use crate::config::{validate_row_limit, ConfigError};
use crate::types::observation_table::ObservationTable;
use crate::utils::truncate_chars;

/// Longest sheet name Excel accepts.
pub const MAX_SHEET_NAME_CHARS: usize = 31;

const FORBIDDEN_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// A contiguous run of rows written to one sheet.
#[derive(Debug, Clone)]
pub struct ExportChunk {
    /// 1-based position of the chunk in the table.
    pub index: usize,
    pub sheet_name: String,
    pub table: ObservationTable,
}

/// Number of sheets needed for `rows` rows. An empty table still gets one sheet.
pub fn sheet_count(rows: usize, max_rows_per_sheet: usize) -> usize {
    rows.div_ceil(max_rows_per_sheet).max(1)
}

/// Sheet name for chunk `index` of `total`: the prefix alone for a single sheet, else the
/// prefix followed by the index, cut to Excel's limit.
pub fn sheet_name(prefix: &str, index: usize, total: usize) -> String {
    let prefix: String = prefix
        .chars()
        .map(|c| if FORBIDDEN_SHEET_CHARS.contains(&c) { '_' } else { c })
        .collect();
    if total <= 1 {
        return truncate_chars(&prefix, MAX_SHEET_NAME_CHARS);
    }
    let suffix = index.to_string();
    let room = MAX_SHEET_NAME_CHARS.saturating_sub(suffix.len());
    format!("{}{}", truncate_chars(&prefix, room), suffix)
}

/// Splits a table into sheets of at most `max_rows_per_sheet` rows, keeping row order.
///
/// # Errors
///
/// [`ConfigError::RowLimitOutOfRange`] if the limit lies outside the accepted range. The
/// table is not touched in that case.
pub fn chunk_table(
    table: &ObservationTable,
    max_rows_per_sheet: usize,
    prefix: &str,
) -> Result<Vec<ExportChunk>, ConfigError> {
    validate_row_limit(max_rows_per_sheet)?;
    let total = sheet_count(table.height(), max_rows_per_sheet);
    Ok((0..total)
        .map(|i| ExportChunk {
            index: i + 1,
            sheet_name: sheet_name(prefix, i + 1, total),
            table: table.slice(i * max_rows_per_sheet, max_rows_per_sheet),
        })
        .collect())
}
