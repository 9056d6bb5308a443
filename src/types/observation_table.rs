//! The tabular result type produced by both acquisition modes.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::fmt;

const DAYS_FROM_CE_TO_UNIX_EPOCH: i32 = 719_163;

/// A table of observations with display-named, typed columns.
///
/// Rows keep the order in which the source delivered them; duplicates pass through.
///
/// Instances are obtained from [`crate::StationClient::fetch`] or
/// [`crate::ArchiveClient::load`] and consumed by [`crate::ExportClient`].
#[derive(Debug, Clone)]
pub struct ObservationTable {
    /// The underlying Polars `DataFrame`.
    pub frame: DataFrame,
}

/// A typed view of a single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl ObservationTable {
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }

    /// A table without columns or rows.
    pub fn empty() -> Self {
        Self {
            frame: DataFrame::empty(),
        }
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Returns `len` rows starting at `offset`, clamped to the table bounds.
    pub fn slice(&self, offset: usize, len: usize) -> Self {
        Self {
            frame: self.frame.slice(offset as i64, len),
        }
    }

    /// Reads one cell by row index and column name.
    ///
    /// # Errors
    ///
    /// Returns a [`PolarsError`] if the column does not exist or the row is out of bounds.
    pub fn cell(&self, row: usize, column: &str) -> PolarsResult<CellValue> {
        let value = self.frame.column(column)?.get(row)?;
        Ok(CellValue::from_any_value(&value))
    }

    /// Appends the rows of `other` below the rows of `self`.
    ///
    /// An empty table without columns acts as the identity, so tables can be folded
    /// starting from [`ObservationTable::empty`].
    pub fn concat(self, other: &ObservationTable) -> PolarsResult<Self> {
        if self.frame.width() == 0 {
            return Ok(other.clone());
        }
        if other.frame.width() == 0 {
            return Ok(self);
        }
        Ok(Self {
            frame: self.frame.vstack(&other.frame)?,
        })
    }
}

impl From<DataFrame> for ObservationTable {
    fn from(frame: DataFrame) -> Self {
        Self::new(frame)
    }
}

impl CellValue {
    pub fn from_any_value(value: &AnyValue<'_>) -> Self {
        match value {
            AnyValue::Null => CellValue::Null,
            AnyValue::Boolean(b) => CellValue::Bool(*b),
            AnyValue::Int8(v) => CellValue::Int(i64::from(*v)),
            AnyValue::Int16(v) => CellValue::Int(i64::from(*v)),
            AnyValue::Int32(v) => CellValue::Int(i64::from(*v)),
            AnyValue::Int64(v) => CellValue::Int(*v),
            AnyValue::UInt8(v) => CellValue::Int(i64::from(*v)),
            AnyValue::UInt16(v) => CellValue::Int(i64::from(*v)),
            AnyValue::UInt32(v) => CellValue::Int(i64::from(*v)),
            AnyValue::Float32(v) => CellValue::Float(f64::from(*v)),
            AnyValue::Float64(v) => CellValue::Float(*v),
            AnyValue::String(s) => CellValue::Text(s.to_string()),
            AnyValue::StringOwned(s) => CellValue::Text(s.to_string()),
            AnyValue::Date(days) => {
                date_from_epoch_days(*days).map_or(CellValue::Null, CellValue::Date)
            }
            AnyValue::Datetime(v, unit, _) => {
                datetime_from_timestamp(*v, *unit).map_or(CellValue::Null, CellValue::DateTime)
            }
            other => CellValue::Text(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Int(v) => write!(f, "{v}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

pub(crate) fn epoch_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - DAYS_FROM_CE_TO_UNIX_EPOCH
}

pub(crate) fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(DAYS_FROM_CE_TO_UNIX_EPOCH)?)
}

pub(crate) fn epoch_millis(date_time: NaiveDateTime) -> i64 {
    date_time.and_utc().timestamp_millis()
}

pub(crate) fn datetime_from_timestamp(value: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let date_time = match unit {
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(value)?,
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(value)?,
        TimeUnit::Nanoseconds => DateTime::from_timestamp_nanos(value),
    };
    Some(date_time.naive_utc())
}

/// Builds a `Date` column from optional calendar dates.
pub(crate) fn date_column(name: &str, dates: Vec<Option<NaiveDate>>) -> PolarsResult<Column> {
    let days: Vec<Option<i32>> = dates.into_iter().map(|d| d.map(epoch_days)).collect();
    Column::new(name.into(), days).cast(&DataType::Date)
}

/// Builds a millisecond `Datetime` column from optional timestamps.
pub(crate) fn datetime_column(
    name: &str,
    values: Vec<Option<NaiveDateTime>>,
) -> PolarsResult<Column> {
    let millis: Vec<Option<i64>> = values.into_iter().map(|v| v.map(epoch_millis)).collect();
    Column::new(name.into(), millis).cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
}
