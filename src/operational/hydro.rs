//! Per-measurement views of hydrological API data.
//!
//! A hydro snapshot row carries up to five independent measurements, each with its own
//! timestamp. Splitting them apart gives one time series per measurement, which can then be
//! averaged over a coarser interval.

use crate::operational::error::OperationalError;
use crate::types::observation_table::{datetime_column, CellValue, ObservationTable};
use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Timelike};
use log::debug;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One measurement of the hydro API with its timestamp field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HydroCategory {
    pub value_field: &'static str,
    pub date_field: &'static str,
    /// Human-readable label, also used as sheet name on export.
    pub label: &'static str,
}

pub const HYDRO_CATEGORIES: [HydroCategory; 5] = [
    HydroCategory {
        value_field: "stan_wody",
        date_field: "stan_wody_data_pomiaru",
        label: "Stan wody",
    },
    HydroCategory {
        value_field: "temperatura_wody",
        date_field: "temperatura_wody_data_pomiaru",
        label: "Temperatura wody",
    },
    HydroCategory {
        value_field: "przeplyw",
        date_field: "przeplyw_data",
        label: "Przepływ",
    },
    HydroCategory {
        value_field: "zjawisko_lodowe",
        date_field: "zjawisko_lodowe_data_pomiaru",
        label: "Zjawisko lodowe",
    },
    HydroCategory {
        value_field: "zjawisko_zarastania",
        date_field: "zjawisko_zarastania_data_pomiaru",
        label: "Zjawisko zarastania",
    },
];

/// Station columns copied into every category table.
pub const HYDRO_STATION_FIELDS: [&str; 4] = ["id_stacji", "stacja", "rzeka", "wojewodztwo"];

/// Width of the time buckets used by [`aggregate_category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationInterval {
    Hourly,
    Daily,
    /// Weeks start on Monday.
    Weekly,
    Monthly,
}

impl AggregationInterval {
    /// Start of the bucket containing `instant`.
    pub fn truncate(&self, instant: NaiveDateTime) -> NaiveDateTime {
        let date = instant.date();
        match self {
            AggregationInterval::Hourly => date
                .and_hms_opt(instant.hour(), 0, 0)
                .unwrap_or(instant),
            AggregationInterval::Daily => date.and_time(NaiveTime::MIN),
            AggregationInterval::Weekly => {
                let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
                monday.and_time(NaiveTime::MIN)
            }
            AggregationInterval::Monthly => date
                .with_day(1)
                .unwrap_or(date)
                .and_time(NaiveTime::MIN),
        }
    }
}

fn station_fields_in(table: &ObservationTable) -> Vec<&'static str> {
    let names = table.column_names();
    HYDRO_STATION_FIELDS
        .into_iter()
        .filter(|field| names.iter().any(|name| name == field))
        .collect()
}

/// Splits a hydro table into one table per measurement.
///
/// Each table holds the station columns, the measurement and its timestamp. Rows without
/// a value are dropped and categories without any row are left out. Sentinel values are
/// values and are kept.
pub fn split_hydro_categories(
    table: &ObservationTable,
) -> Result<Vec<(HydroCategory, ObservationTable)>, OperationalError> {
    let names = table.column_names();
    let station_fields = station_fields_in(table);
    let mut categories = Vec::new();

    for category in HYDRO_CATEGORIES {
        if !names.iter().any(|name| name == category.value_field) {
            debug!("Hydro table has no '{}' column", category.value_field);
            continue;
        }
        let mut keep: Vec<&str> = station_fields.clone();
        keep.push(category.value_field);
        if names.iter().any(|name| name == category.date_field) {
            keep.push(category.date_field);
        }

        let selected = table.frame.select(keep)?;
        let mask = selected.column(category.value_field)?.is_not_null();
        let filtered = selected.filter(&mask)?;
        if filtered.height() == 0 {
            debug!("Hydro category '{}' has no values", category.label);
            continue;
        }
        debug!("Hydro category '{}': {} row(s)", category.label, filtered.height());
        categories.push((category, ObservationTable::new(filtered)));
    }
    Ok(categories)
}

/// Averages a category table per station and time bucket.
///
/// The result is sorted by station, then bucket start. Rows without a timestamp or value
/// do not contribute. Sentinels are averaged like any other value.
///
/// # Errors
///
/// [`OperationalError::MissingColumn`] if the value or timestamp column is absent.
pub fn aggregate_category(
    table: &ObservationTable,
    category: &HydroCategory,
    interval: AggregationInterval,
) -> Result<ObservationTable, OperationalError> {
    let frame = &table.frame;
    for field in [category.value_field, category.date_field] {
        if frame.column(field).is_err() {
            return Err(OperationalError::MissingColumn(field.to_string()));
        }
    }
    let station_fields = station_fields_in(table);
    let station_columns = station_fields
        .iter()
        .map(|field| frame.column(field))
        .collect::<PolarsResult<Vec<_>>>()?;
    let values = frame
        .column(category.value_field)?
        .cast(&DataType::Float64)?;
    let values = values.as_materialized_series().f64()?.clone();
    let dates = frame.column(category.date_field)?;

    let mut buckets: BTreeMap<(Vec<Option<String>>, NaiveDateTime), (f64, usize)> =
        BTreeMap::new();
    for row in 0..frame.height() {
        let Some(value) = values.get(row) else {
            continue;
        };
        let instant = match CellValue::from_any_value(&dates.get(row)?) {
            CellValue::DateTime(instant) => instant,
            CellValue::Date(date) => date.and_time(NaiveTime::MIN),
            _ => continue,
        };
        let station = station_columns
            .iter()
            .map(|column| {
                column.get(row).map(|v| match CellValue::from_any_value(&v) {
                    CellValue::Null => None,
                    other => Some(other.to_string()),
                })
            })
            .collect::<PolarsResult<Vec<_>>>()?;
        let entry = buckets
            .entry((station, interval.truncate(instant)))
            .or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    let mut station_values: Vec<Vec<Option<String>>> = vec![Vec::new(); station_fields.len()];
    let mut bucket_starts = Vec::with_capacity(buckets.len());
    let mut means = Vec::with_capacity(buckets.len());
    for ((station, start), (sum, count)) in buckets {
        for (column, value) in station_values.iter_mut().zip(station) {
            column.push(value);
        }
        bucket_starts.push(Some(start));
        means.push(Some(sum / count as f64));
    }

    let mut columns: Vec<Column> = station_fields
        .iter()
        .zip(station_values)
        .map(|(field, values)| Column::new((*field).into(), values))
        .collect();
    columns.push(datetime_column(category.date_field, bucket_starts)?);
    columns.push(Column::new(category.value_field.into(), means));

    debug!(
        "Aggregated '{}' {:?}: {} -> {} row(s)",
        category.value_field,
        interval,
        frame.height(),
        columns.first().map_or(0, |c| c.len())
    );
    Ok(ObservationTable::new(DataFrame::new(columns)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operational::format::ResponseFormat;
    use crate::operational::records_to_table;
    use crate::types::station_kind::StationKind;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn hydro_table() -> ObservationTable {
        let body = r#"[
            {"id_stacji":"1","stacja":"Kraków","rzeka":"Wisła","stan_wody":"200","stan_wody_data_pomiaru":"2024-05-01 10:00:00",
             "przeplyw":"99999.999","przeplyw_data":"2024-05-01 10:00:00"},
            {"id_stacji":"1","stacja":"Kraków","rzeka":"Wisła","stan_wody":"210","stan_wody_data_pomiaru":"2024-05-01 10:30:00"},
            {"id_stacji":"1","stacja":"Kraków","rzeka":"Wisła","stan_wody":"9999","stan_wody_data_pomiaru":"2024-05-02 08:00:00"},
            {"id_stacji":"2","stacja":"Sandomierz","rzeka":"Wisła","stan_wody":"300","stan_wody_data_pomiaru":"2024-05-01 11:00:00"}
        ]"#;
        let records = ResponseFormat::Json.parse(body.as_bytes()).unwrap();
        records_to_table(StationKind::Hydro, &records).unwrap()
    }

    #[test]
    fn test_split_drops_null_rows_and_empty_categories() {
        let categories = split_hydro_categories(&hydro_table()).unwrap();
        let labels: Vec<&str> = categories.iter().map(|(c, _)| c.label).collect();
        assert_eq!(labels, vec!["Stan wody", "Przepływ"]);

        let (_, flow) = &categories[1];
        assert_eq!(flow.height(), 1);
        assert_eq!(flow.cell(0, "przeplyw").unwrap(), CellValue::Float(99999.999));
        assert_eq!(
            flow.column_names(),
            vec!["id_stacji", "stacja", "rzeka", "wojewodztwo", "przeplyw", "przeplyw_data"]
        );
    }

    #[test]
    fn test_hourly_and_daily_means() {
        let categories = split_hydro_categories(&hydro_table()).unwrap();
        let (category, level) = &categories[0];

        let hourly = aggregate_category(level, category, AggregationInterval::Hourly).unwrap();
        assert_eq!(hourly.height(), 3);
        assert_eq!(hourly.cell(0, "stan_wody").unwrap(), CellValue::Float(205.0));
        assert_eq!(
            hourly.cell(0, "stan_wody_data_pomiaru").unwrap(),
            CellValue::DateTime(at(1, 10, 0))
        );

        let daily = aggregate_category(level, category, AggregationInterval::Daily).unwrap();
        assert_eq!(daily.height(), 3);
        assert_eq!(daily.cell(1, "stan_wody").unwrap(), CellValue::Float(9999.0));
        assert_eq!(daily.cell(2, "stacja").unwrap(), CellValue::Text("Sandomierz".into()));
    }

    #[test]
    fn test_monthly_mean_includes_sentinel() {
        let categories = split_hydro_categories(&hydro_table()).unwrap();
        let (category, level) = &categories[0];

        let monthly = aggregate_category(level, category, AggregationInterval::Monthly).unwrap();
        assert_eq!(monthly.height(), 2);
        assert_eq!(
            monthly.cell(0, "stan_wody").unwrap(),
            CellValue::Float((200.0 + 210.0 + 9999.0) / 3.0)
        );
    }

    #[test]
    fn test_truncate_weekly_starts_on_monday() {
        // 2024-05-01 is a Wednesday.
        assert_eq!(
            AggregationInterval::Weekly.truncate(at(1, 10, 30)),
            NaiveDate::from_ymd_opt(2024, 4, 29)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_missing_columns_are_reported() {
        let table = ObservationTable::new(df!("stan_wody" => [1i64]).unwrap());
        assert!(matches!(
            aggregate_category(&table, &HYDRO_CATEGORIES[0], AggregationInterval::Daily),
            Err(OperationalError::MissingColumn(_))
        ));
    }
}
