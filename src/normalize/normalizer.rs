use crate::legend::LegendMap;
use crate::normalize::dates::{resolve_dates, DateSource, DERIVED_DATE_COLUMN};
use crate::normalize::error::NormalizeError;
use crate::normalize::filters::{date_mask, station_mask};
use crate::normalize::typing::type_columns;
use crate::types::date_range::DateRange;
use crate::types::observation_table::{date_column, ObservationTable};
use log::{debug, info, warn};
use polars::prelude::*;
use std::collections::HashSet;
use std::fmt;

/// Non-fatal findings of [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeWarning {
    /// Rows dropped by the date range filter because their date could not be determined.
    UnparseableDates { dropped: usize },
}

impl fmt::Display for NormalizeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeWarning::UnparseableDates { dropped } => {
                write!(f, "{dropped} row(s) dropped because their date could not be parsed")
            }
        }
    }
}

/// A normalized table together with the warnings raised while producing it.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub table: ObservationTable,
    pub warnings: Vec<NormalizeWarning>,
}

/// Display names for the raw columns, unique within the table.
///
/// Column `i` named `n` takes the name of the legend entry keyed `n`, else of the entry at
/// position `i`, else keeps `n`.
fn display_names(raw_names: &[String], legend: Option<&LegendMap>) -> (Vec<String>, HashSet<String>) {
    let mut names = Vec::with_capacity(raw_names.len());
    let mut taken = HashSet::new();
    let mut verbatim = HashSet::new();

    for (index, raw) in raw_names.iter().enumerate() {
        let entry = legend.and_then(|legend| legend.get(raw).or_else(|| legend.entry_at(index)));
        let base = entry.map_or_else(|| raw.clone(), |entry| entry.display_name.clone());
        let mut name = base.clone();
        let mut suffix = 2;
        while !taken.insert(name.clone()) {
            name = format!("{base} ({suffix})");
            suffix += 1;
        }
        if entry.is_some_and(|entry| entry.is_status_field) {
            verbatim.insert(name.clone());
        }
        names.push(name);
    }
    (names, verbatim)
}

/// Turns a raw table into a typed, filtered [`ObservationTable`].
///
/// 1. Columns are renamed through the legend. Columns without an entry keep their raw name.
/// 2. Text columns become integer or float columns where all values allow it. Status
///    columns and sentinel values are left as they are.
/// 3. Dates are read from a date column, or assembled from year, month and day columns and
///    appended as `Data`.
/// 4. `station_filter` keeps rows whose station name contains it, ignoring case and Polish
///    diacritics.
/// 5. `date_range` keeps rows dated within it, bounds included. Rows without a usable date
///    are dropped and counted in [`NormalizeWarning::UnparseableDates`].
///
/// # Errors
///
/// * [`NormalizeError::MissingStationColumn`] if a station filter is given but no station
///   column exists.
/// * [`NormalizeError::MissingDateColumn`] if a date range is given but no date can be
///   determined.
pub fn normalize(
    raw: ObservationTable,
    legend: Option<&LegendMap>,
    date_range: Option<DateRange>,
    station_filter: Option<&str>,
) -> Result<Normalized, NormalizeError> {
    let mut frame = raw.frame;
    let raw_names: Vec<String> = frame
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let (names, verbatim) = display_names(&raw_names, legend);
    frame.set_column_names(names.iter().map(String::as_str))?;
    let mut frame = type_columns(frame, &verbatim)?;

    let dates = resolve_dates(&frame)?;
    if let Some(DateSource::Derived(derived)) = &dates {
        if !names.iter().any(|name| name == DERIVED_DATE_COLUMN) {
            frame.with_column(date_column(DERIVED_DATE_COLUMN, derived.clone())?)?;
        }
    }

    let station_keep = station_filter
        .filter(|filter| !filter.trim().is_empty())
        .map(|filter| station_mask(&frame, filter))
        .transpose()?;
    let date_keep = match (date_range, &dates) {
        (Some(range), Some(source)) => Some(date_mask(source.dates(), &range)),
        (Some(_), None) => {
            return Err(NormalizeError::MissingDateColumn { columns: names });
        }
        (None, _) => None,
    };

    let mut warnings = Vec::new();
    if station_keep.is_some() || date_keep.is_some() {
        let mut unparseable = 0usize;
        let keep: Vec<bool> = (0..frame.height())
            .map(|row| {
                let station_ok = station_keep.as_ref().map_or(true, |mask| mask[row]);
                let date_ok = match date_keep.as_ref().map(|mask| mask[row]) {
                    None => true,
                    Some(Some(in_range)) => in_range,
                    Some(None) => {
                        if station_ok {
                            unparseable += 1;
                        }
                        false
                    }
                };
                station_ok && date_ok
            })
            .collect();
        let mask = BooleanChunked::from_slice(PlSmallStr::from_static("keep"), &keep);
        let before = frame.height();
        frame = frame.filter(&mask)?;
        debug!("Filters kept {} of {} row(s)", frame.height(), before);

        if unparseable > 0 {
            warn!("Dropped {} row(s) with unparseable dates", unparseable);
            warnings.push(NormalizeWarning::UnparseableDates {
                dropped: unparseable,
            });
        }
    }

    info!(
        "Normalized table: {} row(s), {} column(s)",
        frame.height(),
        frame.width()
    );
    Ok(Normalized {
        table: ObservationTable::new(frame),
        warnings,
    })
}
