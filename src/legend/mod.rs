//! Legend files describe, line by line, the columns of a header-less archive data file.

pub mod error;
mod parser;

use crate::legend::error::LegendError;
use crate::legend::parser::{parse_line, LegendLine};
use crate::utils::decode_text;
use log::debug;

/// Meaning of one data column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    /// Key the column is known by in the data file, `column_<position>` if the legend
    /// declares none.
    pub raw_key: String,
    /// Column title including the bracketed unit, e.g. `Stan wody [cm]`.
    pub display_name: String,
    pub unit: Option<String>,
    /// Status columns hold measurement flags and are kept verbatim.
    pub is_status_field: bool,
}

/// A special value announced by the legend, e.g. `Stan wody 9999 oznacza brak danych`.
#[derive(Debug, Clone, PartialEq)]
pub struct SentinelNote {
    pub subject: String,
    pub value: f64,
    pub description: String,
}

/// Ordered column descriptions of one data file.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendMap {
    entries: Vec<LegendEntry>,
    sentinels: Vec<SentinelNote>,
}

impl LegendMap {
    /// Entry whose raw key is `key`.
    pub fn get(&self, key: &str) -> Option<&LegendEntry> {
        self.entries.iter().find(|entry| entry.raw_key == key)
    }

    /// Entry describing the column at 0-based `index`.
    pub fn entry_at(&self, index: usize) -> Option<&LegendEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LegendEntry] {
        &self.entries
    }

    pub fn sentinels(&self) -> &[SentinelNote] {
        &self.sentinels
    }
}

/// Parses a legend file.
///
/// Unrecognised lines are skipped. Entries keep the order of the file, which is the
/// positional order of the data columns.
///
/// # Errors
///
/// Returns [`LegendError::Empty`] if no line describes a column.
///
/// # Example
///
/// ```
/// use imgw_data::parse_legend;
///
/// let legend = parse_legend("H1 Water level [cm]\nStatus pomiaru 1\n".as_bytes()).unwrap();
/// assert_eq!(legend.get("H1").unwrap().display_name, "Water level [cm]");
/// assert!(legend.entry_at(1).unwrap().is_status_field);
/// ```
pub fn parse_legend(bytes: &[u8]) -> Result<LegendMap, LegendError> {
    let text = decode_text(bytes);
    let mut entries = Vec::new();
    let mut sentinels = Vec::new();
    let mut lines = 0usize;

    for line in text.lines().filter(|line| !line.trim().is_empty()) {
        lines += 1;
        match parse_line(line) {
            Some(LegendLine::Column {
                key,
                display_name,
                unit,
                is_status_field,
            }) => {
                let raw_key = key.unwrap_or_else(|| format!("column_{}", entries.len() + 1));
                entries.push(LegendEntry {
                    raw_key,
                    display_name,
                    unit,
                    is_status_field,
                });
            }
            Some(LegendLine::Sentinel {
                subject,
                value,
                description,
            }) => sentinels.push(SentinelNote {
                subject,
                value,
                description,
            }),
            None => debug!("Skipping legend line {:?}", line.trim()),
        }
    }

    if entries.is_empty() {
        return Err(LegendError::Empty { lines });
    }
    debug!(
        "Parsed legend with {} column(s) and {} sentinel note(s)",
        entries.len(),
        sentinels.len()
    );
    Ok(LegendMap { entries, sentinels })
}
