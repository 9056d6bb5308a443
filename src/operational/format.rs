//! Response formats of the operational API.
//!
//! Every parseable format is reduced to the same intermediate form: a list of records
//! mapping field names to their raw string values. Typing happens afterwards, against the
//! schema of the queried [`StationKind`](crate::StationKind).

use crate::operational::error::OperationalError;
use crate::utils::{decode_text, detect_delimiter};
use log::debug;
use polars::prelude::*;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::io::Cursor;

/// One station record with its raw field values. `None` marks an explicit null.
pub type ApiRecord = HashMap<String, Option<String>>;

/// The body format requested from the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Json,
    Csv,
    Xml,
    /// Rendered HTML table. Only useful for display through [`crate::StationClient::fetch_raw`].
    Html,
}

impl ResponseFormat {
    /// The `/format/{..}` path segment, absent for JSON which the API serves by default.
    pub(crate) fn path_segment(&self) -> Option<&'static str> {
        match self {
            ResponseFormat::Json => None,
            ResponseFormat::Csv => Some("csv"),
            ResponseFormat::Xml => Some("xml"),
            ResponseFormat::Html => Some("html"),
        }
    }

    /// Parses a response body into raw records.
    ///
    /// # Errors
    ///
    /// [`OperationalError::UnsupportedFormat`] for HTML and [`OperationalError::Parse`] for a
    /// body that does not follow the format.
    pub fn parse(&self, body: &[u8]) -> Result<Vec<ApiRecord>, OperationalError> {
        let records = match self {
            ResponseFormat::Json => parse_json(body),
            ResponseFormat::Csv => parse_csv(body),
            ResponseFormat::Xml => parse_xml(body),
            ResponseFormat::Html => return Err(OperationalError::UnsupportedFormat(*self)),
        }
        .map_err(|message| OperationalError::Parse {
            format: *self,
            message,
        })?;
        debug!("Parsed {} {} record(s)", records.len(), self);
        Ok(records)
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResponseFormat::Json => "json",
            ResponseFormat::Csv => "csv",
            ResponseFormat::Xml => "xml",
            ResponseFormat::Html => "html",
        };
        write!(f, "{name}")
    }
}

fn parse_json(body: &[u8]) -> Result<Vec<ApiRecord>, String> {
    let value: Value = serde_json::from_slice(body).map_err(|e| e.to_string())?;
    match value {
        Value::Array(items) => items.into_iter().map(json_record).collect(),
        // The API answers an unknown station with `{"status": false, "message": ...}`.
        Value::Object(ref map) if map.get("status") == Some(&Value::Bool(false)) => Ok(Vec::new()),
        object @ Value::Object(_) => Ok(vec![json_record(object)?]),
        other => Err(format!("expected an array or an object, found {other}")),
    }
}

fn json_record(value: Value) -> Result<ApiRecord, String> {
    let map = match value {
        Value::Object(map) => map,
        other => return Err(format!("expected an object, found {other}")),
    };
    Ok(map
        .into_iter()
        .map(|(key, value)| {
            let raw = match value {
                Value::Null => None,
                Value::String(s) => Some(s),
                other => Some(other.to_string()),
            };
            (key, raw)
        })
        .collect())
}

fn parse_csv(body: &[u8]) -> Result<Vec<ApiRecord>, String> {
    let text = decode_text(body);
    let Some(header) = text.lines().find(|line| !line.trim().is_empty()) else {
        return Ok(Vec::new());
    };
    let separator = detect_delimiter(header).unwrap_or(b',');

    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|options| {
            options
                .with_separator(separator)
                .with_truncate_ragged_lines(true)
        })
        .into_reader_with_file_handle(Cursor::new(text.as_bytes().to_vec()))
        .finish()
        .map_err(|e| e.to_string())?;

    let columns: Vec<(String, &StringChunked)> = frame
        .get_columns()
        .iter()
        .map(|column| {
            column
                .as_materialized_series()
                .str()
                .map(|values| (column.name().to_string(), values))
        })
        .collect::<PolarsResult<_>>()
        .map_err(|e| e.to_string())?;

    Ok((0..frame.height())
        .map(|row| {
            columns
                .iter()
                .map(|(name, values)| (name.clone(), values.get(row).map(str::to_string)))
                .collect()
        })
        .collect())
}

fn parse_xml(body: &[u8]) -> Result<Vec<ApiRecord>, String> {
    let mut reader = Reader::from_reader(body);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut records = Vec::new();
    let mut current = ApiRecord::new();
    let mut field: Option<String> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| format!("at byte {}: {e}", reader.buffer_position()))?;
        match event {
            Event::Start(start) => {
                depth += 1;
                match depth {
                    2 => current = ApiRecord::new(),
                    3 => {
                        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                        current.insert(name.clone(), None);
                        field = Some(name);
                    }
                    _ => {}
                }
            }
            Event::Empty(empty) => match depth {
                1 => records.push(ApiRecord::new()),
                2 => {
                    let name = String::from_utf8_lossy(empty.local_name().as_ref()).into_owned();
                    current.insert(name, None);
                }
                _ => {}
            },
            Event::Text(text) if depth == 3 => {
                let value = text.unescape().map_err(|e| e.to_string())?.into_owned();
                if let Some(name) = &field {
                    current.insert(name.clone(), Some(value));
                }
            }
            Event::CData(data) if depth == 3 => {
                let value = String::from_utf8_lossy(&data.into_inner()).into_owned();
                if let Some(name) = &field {
                    current.insert(name.clone(), Some(value));
                }
            }
            Event::End(_) => {
                match depth {
                    2 => records.push(std::mem::take(&mut current)),
                    3 => field = None,
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value<'a>(record: &'a ApiRecord, key: &str) -> Option<&'a str> {
        record.get(key).and_then(|v| v.as_deref())
    }

    #[test]
    fn test_parse_json_array() {
        let body = r#"[
            {"id_stacji":"12295","stacja":"Białystok","temperatura":"-3.4","suma_opadu":null},
            {"id_stacji":"12600","stacja":"Bielsko Biała","temperatura":1.2,"suma_opadu":"0"}
        ]"#;
        let records = ResponseFormat::Json.parse(body.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(value(&records[0], "stacja"), Some("Białystok"));
        assert_eq!(records[0].get("suma_opadu"), Some(&None));
        assert_eq!(value(&records[1], "temperatura"), Some("1.2"));
    }

    #[test]
    fn test_parse_json_single_object_and_not_found() {
        let single = ResponseFormat::Json
            .parse(br#"{"id_stacji":"12375","stacja":"Warszawa"}"#)
            .unwrap();
        assert_eq!(single.len(), 1);

        let not_found = ResponseFormat::Json
            .parse(br#"{"status":false,"message":"Nie znaleziono stacji"}"#)
            .unwrap();
        assert!(not_found.is_empty());

        assert!(ResponseFormat::Json.parse(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_json_rejects_garbage() {
        assert!(matches!(
            ResponseFormat::Json.parse(b"<html>"),
            Err(OperationalError::Parse {
                format: ResponseFormat::Json,
                ..
            })
        ));
        assert!(ResponseFormat::Json.parse(b"42").is_err());
    }

    #[test]
    fn test_parse_csv() {
        let body = "\"id_stacji\",\"stacja\",\"temperatura\"\n\
                    \"12295\",\"Białystok\",\"-3.4\"\n\
                    \"12500\",\"Jelenia Góra\",\"\"\n";
        let records = ResponseFormat::Csv.parse(body.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(value(&records[1], "stacja"), Some("Jelenia Góra"));
        assert_eq!(value(&records[0], "temperatura"), Some("-3.4"));
        assert!(value(&records[1], "temperatura").unwrap_or_default().is_empty());
    }

    #[test]
    fn test_parse_empty_csv() {
        assert!(ResponseFormat::Csv.parse(b"").unwrap().is_empty());
    }

    #[test]
    fn test_parse_xml() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
            <data>
              <item>
                <id_stacji>12295</id_stacji>
                <stacja>Białystok</stacja>
                <temperatura>-3.4</temperatura>
                <suma_opadu/>
              </item>
              <item>
                <id_stacji>12375</id_stacji>
                <stacja><![CDATA[Warszawa]]></stacja>
                <temperatura>1.2</temperatura>
                <suma_opadu></suma_opadu>
              </item>
            </data>"#;
        let records = ResponseFormat::Xml.parse(body.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(value(&records[0], "stacja"), Some("Białystok"));
        assert_eq!(records[0].get("suma_opadu"), Some(&None));
        assert_eq!(value(&records[1], "stacja"), Some("Warszawa"));
        assert_eq!(records[1].get("suma_opadu"), Some(&None));
    }

    #[test]
    fn test_html_is_not_parseable() {
        assert!(matches!(
            ResponseFormat::Html.parse(b"<table></table>"),
            Err(OperationalError::UnsupportedFormat(ResponseFormat::Html))
        ));
    }
}
