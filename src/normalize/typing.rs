use crate::operational::{parse_float, parse_int};
use crate::types::sentinel::is_sentinel;
use log::debug;
use polars::prelude::*;
use std::collections::HashSet;

/// Narrowest type every non-empty value of a text column parses as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Inferred {
    Int,
    Float,
    Text,
}

fn infer(values: &StringChunked) -> Inferred {
    let mut inferred = Inferred::Int;
    let mut seen = false;
    for value in values.into_iter().flatten().map(str::trim) {
        if value.is_empty() {
            continue;
        }
        seen = true;
        if inferred == Inferred::Int && value.parse::<i64>().is_ok() {
            continue;
        }
        if is_integer_literal(value) {
            // Out of i64 range; kept verbatim.
            return Inferred::Text;
        }
        if parse_float(value).is_some() {
            inferred = Inferred::Float;
        } else {
            return Inferred::Text;
        }
    }
    if seen {
        inferred
    } else {
        Inferred::Text
    }
}

fn is_integer_literal(value: &str) -> bool {
    let digits = value.strip_prefix(['-', '+']).unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Converts text columns to `Int64` or `Float64` where every value allows it.
///
/// Columns named in `verbatim` and columns with any non-numeric value stay untouched.
/// Values are converted, never replaced: sentinels such as `9999` keep their value.
pub(crate) fn type_columns(frame: DataFrame, verbatim: &HashSet<String>) -> PolarsResult<DataFrame> {
    let columns = frame
        .get_columns()
        .iter()
        .map(|column| {
            if column.dtype() != &DataType::String || verbatim.contains(column.name().as_str()) {
                return Ok(column.clone());
            }
            let values = column.as_materialized_series().str()?;
            let (typed, sentinels) = match infer(values) {
                Inferred::Int => {
                    let ints: Vec<Option<i64>> =
                        values.into_iter().map(|v| trimmed(v).and_then(parse_int)).collect();
                    let sentinels = ints.iter().flatten().filter(|v| is_sentinel(**v as f64)).count();
                    (Column::new(column.name().clone(), ints), sentinels)
                }
                Inferred::Float => {
                    let floats: Vec<Option<f64>> = values
                        .into_iter()
                        .map(|v| trimmed(v).and_then(parse_float))
                        .collect();
                    let sentinels = floats.iter().flatten().filter(|v| is_sentinel(**v)).count();
                    (Column::new(column.name().clone(), floats), sentinels)
                }
                Inferred::Text => (column.clone(), 0),
            };
            debug!(
                "Column '{}' typed as {} ({} sentinel value(s))",
                column.name(),
                typed.dtype(),
                sentinels
            );
            Ok(typed)
        })
        .collect::<PolarsResult<Vec<Column>>>()?;
    DataFrame::new(columns)
}
