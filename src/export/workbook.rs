//! Serialising tables into `.xlsx` workbooks.

use crate::export::error::ExportError;
use crate::types::observation_table::{CellValue, ObservationTable};
use log::debug;
use rust_xlsxwriter::{Format, Workbook, Worksheet};

/// Largest integer magnitude Excel stores exactly; larger values are written as text.
const MAX_EXACT_INTEGER: i64 = 1 << 53;

struct Formats {
    header: Format,
    date: Format,
    date_time: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            header: Format::new().set_bold(),
            date: Format::new().set_num_format("yyyy-mm-dd"),
            date_time: Format::new().set_num_format("yyyy-mm-dd hh:mm:ss"),
        }
    }
}

/// Builds one workbook holding the given sheets, in order.
pub(crate) fn write_workbook(sheets: &[(String, ObservationTable)]) -> Result<Vec<u8>, ExportError> {
    let formats = Formats::new();
    let mut workbook = Workbook::new();
    for (name, table) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(name)?;
        write_sheet(worksheet, table, &formats)?;
        debug!("Sheet '{}': wrote {} row(s)", name, table.height());
    }
    Ok(workbook.save_to_buffer()?)
}

fn write_sheet(
    worksheet: &mut Worksheet,
    table: &ObservationTable,
    formats: &Formats,
) -> Result<(), ExportError> {
    for (col, column) in table.frame.get_columns().iter().enumerate() {
        let col = col as u16;
        worksheet.write_string_with_format(0, col, column.name().as_str(), &formats.header)?;
        for row in 0..table.height() {
            let value = CellValue::from_any_value(&column.get(row)?);
            write_cell(worksheet, row as u32 + 1, col, &value, formats)?;
        }
    }
    if table.width() > 0 {
        worksheet.set_freeze_panes(1, 0)?;
    }
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
    formats: &Formats,
) -> Result<(), ExportError> {
    match value {
        CellValue::Null => {}
        CellValue::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        CellValue::Int(v) if v.unsigned_abs() <= MAX_EXACT_INTEGER as u64 => {
            worksheet.write_number(row, col, *v as f64)?;
        }
        CellValue::Int(v) => {
            worksheet.write_string(row, col, v.to_string())?;
        }
        CellValue::Float(v) if v.is_finite() => {
            worksheet.write_number(row, col, *v)?;
        }
        CellValue::Float(v) => {
            worksheet.write_string(row, col, v.to_string())?;
        }
        CellValue::Text(text) => {
            worksheet.write_string(row, col, text)?;
        }
        CellValue::Date(date) => {
            worksheet.write_datetime_with_format(row, col, date, &formats.date)?;
        }
        CellValue::DateTime(date_time) => {
            worksheet.write_datetime_with_format(row, col, date_time, &formats.date_time)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::read_workbook;
    use calamine::Data;
    use polars::prelude::*;

    #[test]
    fn test_workbook_is_a_zip_container() {
        let table = ObservationTable::new(
            df!(
                "Nazwa stacji" => ["KRAKÓW"],
                "Stan wody [cm]" => [9999i64],
                "Przepływ [m^3/s]" => [f64::NAN],
            )
            .unwrap(),
        );
        let bytes = write_workbook(&[("Dane".to_string(), table)]).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_cells_read_back() {
        let table = ObservationTable::new(
            df!(
                "Nazwa stacji" => [Some("KRAKÓW"), None],
                "Stan wody [cm]" => [Some(9999i64), Some(i64::MAX)],
                "Przepływ [m^3/s]" => [Some(f64::NAN), Some(99999.999)],
            )
            .unwrap(),
        );
        let bytes = write_workbook(&[("Dane".to_string(), table)]).unwrap();
        let sheets = read_workbook(&bytes);

        assert_eq!(sheets.len(), 1);
        let (name, rows) = &sheets[0];
        assert_eq!(name, "Dane");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0], Data::String("Nazwa stacji".into()));
        assert_eq!(
            rows[1],
            vec![
                Data::String("KRAKÓW".into()),
                Data::Float(9999.0),
                Data::String("NaN".into()),
            ]
        );
        assert_eq!(
            rows[2],
            vec![
                Data::Empty,
                Data::String(i64::MAX.to_string()),
                Data::Float(99999.999),
            ]
        );
    }

    #[test]
    fn test_duplicate_sheet_names_fail() {
        let table = ObservationTable::new(df!("a" => [1i64]).unwrap());
        let sheets = vec![("Dane".to_string(), table.clone()), ("Dane".to_string(), table)];
        assert!(matches!(write_workbook(&sheets), Err(ExportError::Xlsx(_))));
    }
}
