use crate::normalize::dates::find_column;
use crate::normalize::error::NormalizeError;
use crate::types::date_range::DateRange;
use crate::types::observation_table::CellValue;
use crate::utils::normalize_label;
use chrono::NaiveDate;
use polars::prelude::*;

/// Columns that may hold the station name, in order of preference.
pub const STATION_COLUMNS: [&str; 7] = [
    "Nazwa stacji",
    "Nazwa wodowskazu",
    "Wodowskaz",
    "Stacja",
    "Stacja synoptyczna",
    "stacja",
    "nazwa_stacji",
];

/// Per-row result of the station filter: `true` keeps the row.
pub(crate) fn station_mask(frame: &DataFrame, filter: &str) -> Result<Vec<bool>, NormalizeError> {
    let names: Vec<String> = frame
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let Some(name) = find_column(&names, &STATION_COLUMNS) else {
        return Err(NormalizeError::MissingStationColumn {
            filter: filter.to_string(),
            columns: names,
        });
    };

    let wanted = normalize_label(filter);
    let column = frame.column(name)?;
    (0..frame.height())
        .map(|row| {
            let value = CellValue::from_any_value(&column.get(row)?);
            Ok(!value.is_null() && normalize_label(&value.to_string()).contains(&wanted))
        })
        .collect()
}

/// Per-row result of the date range check, `None` where the date is unknown.
pub(crate) fn date_mask(dates: &[Option<NaiveDate>], range: &DateRange) -> Vec<Option<bool>> {
    dates
        .iter()
        .map(|date| date.map(|date| range.contains(date)))
        .collect()
}
