use crate::types::observation_table::ObservationTable;
use crate::utils::{decode_text, detect_delimiter};
use log::debug;
use polars::prelude::*;
use std::io::Cursor;
use std::sync::Arc;

/// Reads a header-less delimited data file with every column as text.
///
/// Columns are named `column_1..column_n`. The delimiter is detected from the first
/// non-empty line; lines without any known delimiter are split on runs of whitespace.
pub fn read_raw_table(bytes: &[u8]) -> PolarsResult<ObservationTable> {
    let text = decode_text(bytes);
    let Some(sample) = text.lines().find(|line| !line.trim().is_empty()) else {
        return Ok(ObservationTable::empty());
    };

    let (separator, content) = match detect_delimiter(sample) {
        Some(separator) => (separator, text.into_owned()),
        None => (b';', whitespace_to_semicolons(&text)),
    };
    let width = content
        .lines()
        .map(|line| field_count(line, separator))
        .max()
        .unwrap_or(0);
    debug!(
        "Reading raw table with separator {:?} and {} column(s)",
        char::from(separator),
        width
    );

    let frame = CsvReadOptions::default()
        .with_has_header(false)
        .with_schema(Some(Arc::new(text_schema(width))))
        .with_ignore_errors(true)
        .map_parse_options(|options| {
            options
                .with_separator(separator)
                .with_truncate_ragged_lines(true)
        })
        .into_reader_with_file_handle(Cursor::new(content.into_bytes()))
        .finish()?;
    Ok(ObservationTable::new(frame))
}

/// A zero-row table of `width` text columns, named as [`read_raw_table`] names them.
pub(crate) fn empty_raw_table(width: usize) -> PolarsResult<ObservationTable> {
    Ok(ObservationTable::new(DataFrame::empty_with_schema(
        &text_schema(width),
    )))
}

fn text_schema(width: usize) -> Schema {
    (1..=width)
        .map(|i| (PlSmallStr::from(format!("column_{i}")), DataType::String))
        .collect()
}

/// Number of fields on a line, ignoring separators inside double quotes.
fn field_count(line: &str, separator: u8) -> usize {
    if line.trim().is_empty() {
        return 0;
    }
    let mut quoted = false;
    let mut count = 1;
    for byte in line.bytes() {
        if byte == b'"' {
            quoted = !quoted;
        } else if byte == separator && !quoted {
            count += 1;
        }
    }
    count
}

fn whitespace_to_semicolons(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(";"))
        .collect::<Vec<_>>()
        .join("\n")
}
