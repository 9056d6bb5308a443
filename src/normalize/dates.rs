//! Finding the observation date of every row.
//!
//! Archive files either carry a date column or split the date into year, month and day
//! columns. Hydrological files count years from November: months 11 and 12 of hydrological
//! year `Y` fall in calendar year `Y - 1`, and the hydrological month index 1 is November.

use crate::types::observation_table::CellValue;
use crate::utils::normalize_label;
use chrono::NaiveDate;
use polars::prelude::*;

const DATE_COLUMNS: [&str; 3] = ["Data", "Data pomiaru", "data_pomiaru"];
const CALENDAR_YEAR_COLUMNS: [&str; 1] = ["Rok"];
const HYDRO_YEAR_COLUMNS: [&str; 1] = ["Rok hydrologiczny"];
const CALENDAR_MONTH_COLUMNS: [&str; 2] = ["Miesiąc", "Miesiąc kalendarzowy"];
const HYDRO_MONTH_COLUMNS: [&str; 1] = ["Wskaźnik miesiąca w roku hydrologicznym"];
const DAY_COLUMNS: [&str; 1] = ["Dzień"];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d.%m.%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Name of the column appended when dates are assembled from their parts.
pub const DERIVED_DATE_COLUMN: &str = "Data";

/// Where the dates of a table come from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DateSource {
    /// An existing column already holds the date.
    Column(Vec<Option<NaiveDate>>),
    /// Dates assembled from year, month and day columns, to be appended.
    Derived(Vec<Option<NaiveDate>>),
}

impl DateSource {
    pub(crate) fn dates(&self) -> &[Option<NaiveDate>] {
        match self {
            DateSource::Column(dates) | DateSource::Derived(dates) => dates,
        }
    }
}

/// First column whose folded name equals one of `candidates`, in candidate order.
pub(crate) fn find_column<'a>(names: &'a [String], candidates: &[&str]) -> Option<&'a str> {
    candidates.iter().find_map(|candidate| {
        let wanted = normalize_label(candidate);
        names
            .iter()
            .find(|name| normalize_label(name) == wanted)
            .map(String::as_str)
    })
}

pub(crate) fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .or_else(|| {
            DATETIME_FORMATS.iter().find_map(|format| {
                chrono::NaiveDateTime::parse_from_str(raw, format)
                    .ok()
                    .map(|dt| dt.date())
            })
        })
}

fn int_values(frame: &DataFrame, name: &str) -> PolarsResult<Vec<Option<i64>>> {
    let column = frame.column(name)?.cast(&DataType::Int64)?;
    Ok(column.as_materialized_series().i64()?.into_iter().collect())
}

/// Calendar `(year, month)` of a hydrological month index (1 = November).
pub(crate) fn hydro_month_to_calendar(hydro_year: i64, index: i64) -> Option<(i64, u32)> {
    if !(1..=12).contains(&index) {
        return None;
    }
    let month = ((index + 9) % 12 + 1) as u32;
    let year = if index <= 2 { hydro_year - 1 } else { hydro_year };
    Some((year, month))
}

/// Resolves the date of each row, or `None` if the table has no date information.
pub(crate) fn resolve_dates(frame: &DataFrame) -> PolarsResult<Option<DateSource>> {
    let names: Vec<String> = frame
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    if let Some(name) = find_column(&names, &DATE_COLUMNS) {
        let column = frame.column(name)?;
        let dates = (0..frame.height())
            .map(|row| {
                Ok(match CellValue::from_any_value(&column.get(row)?) {
                    CellValue::Date(date) => Some(date),
                    CellValue::DateTime(date_time) => Some(date_time.date()),
                    CellValue::Text(text) => parse_date_text(&text),
                    _ => None,
                })
            })
            .collect::<PolarsResult<Vec<_>>>()?;
        return Ok(Some(DateSource::Column(dates)));
    }

    let (year_column, hydro_year) = match (
        find_column(&names, &CALENDAR_YEAR_COLUMNS),
        find_column(&names, &HYDRO_YEAR_COLUMNS),
    ) {
        (Some(year), _) => (year, false),
        (None, Some(year)) => (year, true),
        (None, None) => return Ok(None),
    };
    let years = int_values(frame, year_column)?;
    let days = match find_column(&names, &DAY_COLUMNS) {
        Some(name) => int_values(frame, name)?,
        None => vec![Some(1); frame.height()],
    };

    let months: Vec<Option<(i64, u32)>> =
        if let Some(name) = find_column(&names, &CALENDAR_MONTH_COLUMNS) {
            int_values(frame, name)?
                .into_iter()
                .zip(&years)
                .map(|(month, year)| {
                    let (month, year) = (month?, (*year)?);
                    let month = u32::try_from(month).ok()?;
                    let year = if hydro_year && month >= 11 { year - 1 } else { year };
                    Some((year, month))
                })
                .collect()
        } else if let Some(name) = find_column(&names, &HYDRO_MONTH_COLUMNS) {
            int_values(frame, name)?
                .into_iter()
                .zip(&years)
                .map(|(index, year)| hydro_month_to_calendar((*year)?, index?))
                .collect()
        } else {
            return Ok(None);
        };

    let dates = months
        .into_iter()
        .zip(days)
        .map(|(year_month, day)| {
            let (year, month) = year_month?;
            let day = u32::try_from(day?).ok()?;
            NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
        })
        .collect();
    Ok(Some(DateSource::Derived(dates)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_explicit_date_column() {
        let frame = df!(
            "Data pomiaru" => ["2023-01-15", "15.01.2023", "2023-01-15 06:00:00", "wczoraj"],
        )
        .unwrap();
        let source = resolve_dates(&frame).unwrap().unwrap();
        assert!(matches!(source, DateSource::Column(_)));
        assert_eq!(
            source.dates(),
            &[date(2023, 1, 15), date(2023, 1, 15), date(2023, 1, 15), None]
        );
    }

    #[test]
    fn test_calendar_parts() {
        let frame = df!(
            "Rok" => [2023i64, 2023, 2023],
            "Miesiąc" => [1i64, 2, 2],
            "Dzień" => [31i64, 28, 30],
        )
        .unwrap();
        let source = resolve_dates(&frame).unwrap().unwrap();
        assert_eq!(source, DateSource::Derived(vec![date(2023, 1, 31), date(2023, 2, 28), None]));
    }

    #[test]
    fn test_monthly_without_day() {
        let frame = df!("Rok" => [2022i64], "Miesiac" => [7i64]).unwrap();
        let source = resolve_dates(&frame).unwrap().unwrap();
        assert_eq!(source.dates(), &[date(2022, 7, 1)]);
    }

    #[test]
    fn test_hydrological_year_with_calendar_month() {
        let frame = df!(
            "Rok hydrologiczny" => [2023i64, 2023, 2023],
            "Miesiąc kalendarzowy" => [11i64, 12, 1],
            "Dzień" => [1i64, 31, 15],
        )
        .unwrap();
        let source = resolve_dates(&frame).unwrap().unwrap();
        assert_eq!(
            source.dates(),
            &[date(2022, 11, 1), date(2022, 12, 31), date(2023, 1, 15)]
        );
    }

    #[test]
    fn test_hydrological_month_index() {
        assert_eq!(hydro_month_to_calendar(2023, 1), Some((2022, 11)));
        assert_eq!(hydro_month_to_calendar(2023, 2), Some((2022, 12)));
        assert_eq!(hydro_month_to_calendar(2023, 3), Some((2023, 1)));
        assert_eq!(hydro_month_to_calendar(2023, 12), Some((2023, 10)));
        assert_eq!(hydro_month_to_calendar(2023, 13), None);

        let frame = df!(
            "Rok hydrologiczny" => [2023i64],
            "Wskaźnik miesiąca w roku hydrologicznym" => [2i64],
            "Dzień" => [5i64],
        )
        .unwrap();
        assert_eq!(resolve_dates(&frame).unwrap().unwrap().dates(), &[date(2022, 12, 5)]);
    }

    #[test]
    fn test_no_date_information() {
        let frame = df!("Rok" => [2023i64], "Stan wody" => [245i64]).unwrap();
        assert_eq!(resolve_dates(&frame).unwrap(), None);
    }
}
