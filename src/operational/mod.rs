//! Reading operational API responses into typed tables.

pub mod error;
pub mod format;
pub mod hydro;
pub mod schema;

use crate::operational::error::OperationalError;
use crate::operational::format::ApiRecord;
use crate::operational::schema::{FieldSpec, FieldType};
use crate::types::observation_table::{date_column, datetime_column, ObservationTable};
use crate::types::station_kind::StationKind;
use crate::utils::normalize_label;
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, warn};
use polars::prelude::*;
use std::collections::BTreeSet;

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

fn raw_value<'a>(record: &'a ApiRecord, spec: &FieldSpec) -> Option<&'a str> {
    std::iter::once(spec.name)
        .chain(spec.aliases.iter().copied())
        .find_map(|key| record.get(key))
        .and_then(|value| value.as_deref())
}

/// Keeps the records matching the station filters.
///
/// `station_id` must equal the kind's id field. `station_name` is a substring match
/// that ignores case, whitespace and Polish diacritics.
pub(crate) fn filter_records(
    kind: StationKind,
    records: Vec<ApiRecord>,
    station_id: Option<&str>,
    station_name: Option<&str>,
) -> Vec<ApiRecord> {
    let wanted_name = station_name.map(normalize_label);
    let before = records.len();
    let kept: Vec<ApiRecord> = records
        .into_iter()
        .filter(|record| {
            let id_matches = station_id.map_or(true, |id| {
                record
                    .get(kind.id_field())
                    .and_then(|v| v.as_deref())
                    .is_some_and(|value| value.trim() == id.trim())
            });
            let name_matches = wanted_name.as_deref().map_or(true, |wanted| {
                record
                    .get(kind.station_field())
                    .and_then(|v| v.as_deref())
                    .is_some_and(|value| normalize_label(value).contains(wanted))
            });
            id_matches && name_matches
        })
        .collect();
    debug!(
        "Station filter kept {} of {} {} record(s)",
        kept.len(),
        before,
        kind
    );
    kept
}

/// Builds a table with exactly the columns of the kind's schema, in schema order.
///
/// Fields missing from the response become null columns; fields outside the schema are
/// dropped. Values that do not parse as the declared type are read as null.
pub(crate) fn records_to_table(
    kind: StationKind,
    records: &[ApiRecord],
) -> Result<ObservationTable, OperationalError> {
    let schema = kind.schema();
    let unknown: BTreeSet<&str> = records
        .iter()
        .flat_map(|record| record.keys())
        .filter(|key| !schema.iter().any(|spec| spec.matches(key)))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        debug!("Ignoring fields outside the {} schema: {:?}", kind, unknown);
    }

    let columns = schema
        .iter()
        .map(|spec| build_column(spec, records))
        .collect::<PolarsResult<Vec<Column>>>()?;
    Ok(ObservationTable::new(DataFrame::new(columns)?))
}

fn build_column(spec: &FieldSpec, records: &[ApiRecord]) -> PolarsResult<Column> {
    match spec.field_type {
        FieldType::Text => {
            let values: Vec<Option<String>> = records
                .iter()
                .map(|record| raw_value(record, spec).map(str::to_string))
                .collect();
            Ok(Column::new(spec.name.into(), values))
        }
        FieldType::Int => Ok(Column::new(spec.name.into(), coerce(spec, records, parse_int))),
        FieldType::Float => Ok(Column::new(
            spec.name.into(),
            coerce(spec, records, parse_float),
        )),
        FieldType::Date => date_column(spec.name, coerce(spec, records, parse_date)),
        FieldType::DateTime => datetime_column(spec.name, coerce(spec, records, parse_datetime)),
    }
}

fn coerce<T>(
    spec: &FieldSpec,
    records: &[ApiRecord],
    parse: impl Fn(&str) -> Option<T>,
) -> Vec<Option<T>> {
    let mut rejected = 0usize;
    let values = records
        .iter()
        .map(|record| {
            let raw = raw_value(record, spec).map(str::trim).filter(|v| !v.is_empty())?;
            let parsed = parse(raw);
            if parsed.is_none() {
                rejected += 1;
            }
            parsed
        })
        .collect();
    if rejected > 0 {
        warn!(
            "{} value(s) of '{}' are not {:?} and were read as null",
            rejected, spec.name, spec.field_type
        );
    }
    values
}

pub(crate) fn parse_int(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().or_else(|| {
        parse_float(raw)
            .filter(|v| v.fract() == 0.0 && *v >= i64::MIN as f64 && *v < i64::MAX as f64)
            .map(|v| v as i64)
    })
}

pub(crate) fn parse_float(raw: &str) -> Option<f64> {
    raw.parse::<f64>()
        .ok()
        .or_else(|| raw.replace(',', ".").parse::<f64>().ok())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}
