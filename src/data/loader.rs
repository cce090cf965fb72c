use std::collections::HashMap;
use std::io::Cursor;

use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use serde_json::Value as JsonValue;

use super::error::DataError;
use super::model::{RawCell, Table};

/// Field separator of the delimited-text format.
pub const DELIMITER: u8 = b';';

// ---------------------------------------------------------------------------
// Format hint
// ---------------------------------------------------------------------------

/// Which reader(s) to run over an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatHint {
    /// Semicolon-delimited text first, spreadsheet on any failure.
    Auto,
    Delimited,
    Spreadsheet,
    /// Records-oriented JSON (`[{"age": 30, "job": "admin.", ...}, ...]`).
    Json,
}

impl FormatHint {
    /// Only `.json` selects a reader up front. Delimited and spreadsheet
    /// uploads both go through the `Auto` heuristic whatever their extension.
    pub fn from_file_name(name: &str) -> Self {
        let is_json = name
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("json"));
        if is_json {
            FormatHint::Json
        } else {
            FormatHint::Auto
        }
    }
}

/// Header plus row-major cells, before column types are decided.
#[derive(Debug)]
struct RawSheet {
    headers: Vec<String>,
    rows: Vec<Vec<RawCell>>,
}

impl RawSheet {
    fn into_table(self) -> Result<Table, DataError> {
        Table::from_raw(self.headers, self.rows)
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Parse an uploaded byte stream into a [`Table`].
///
/// With [`FormatHint::Auto`] the delimited reader runs first and the
/// spreadsheet reader only when it fails. This is an ordering heuristic, not
/// content sniffing: a spreadsheet that happens to decode as single-column
/// text is accepted as text.
pub fn load(bytes: &[u8], hint: FormatHint) -> Result<Table, DataError> {
    let sheet = match hint {
        FormatHint::Auto => match read_delimited(bytes) {
            Ok(sheet) => sheet,
            Err(delimited) => {
                log::warn!("delimited parse failed ({delimited:#}), trying spreadsheet");
                read_spreadsheet(bytes).map_err(|spreadsheet| DataError::Unparseable {
                    delimited: format!("{delimited:#}"),
                    spreadsheet: format!("{spreadsheet:#}"),
                })?
            }
        },
        FormatHint::Delimited => read_delimited(bytes).map_err(malformed)?,
        FormatHint::Spreadsheet => read_spreadsheet(bytes).map_err(malformed)?,
        FormatHint::Json => read_json(bytes).map_err(malformed)?,
    };

    let table = sheet.into_table()?;
    log::info!(
        "Loaded {} rows with columns {:?}",
        table.len(),
        table.column_names().collect::<Vec<_>>()
    );
    Ok(table)
}

fn malformed(e: anyhow::Error) -> DataError {
    DataError::Malformed(format!("{e:#}"))
}

// ---------------------------------------------------------------------------
// Delimited text
// ---------------------------------------------------------------------------

/// Header row, then one record per line, fields separated by `;`.
/// Every record must have as many fields as the header.
fn read_delimited(bytes: &[u8]) -> Result<RawSheet> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .context("reading header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        bail!("no header row");
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("record {row_no}"))?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        RawCell::Empty
                    } else {
                        RawCell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(RawSheet { headers, rows })
}

// ---------------------------------------------------------------------------
// Spreadsheet (xlsx / xls / ods)
// ---------------------------------------------------------------------------

/// First sheet only; its first used row is the header.
fn read_spreadsheet(bytes: &[u8]) -> Result<RawSheet> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).context("opening spreadsheet")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("spreadsheet has no sheets")?
        .context("reading first sheet")?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = rows_iter
        .next()
        .context("first sheet is empty")?
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();

    let rows = rows_iter
        .filter(|row| !row.iter().all(|c| matches!(c, Data::Empty)))
        .map(|row| row.iter().map(sheet_cell).collect())
        .collect();

    Ok(RawSheet { headers, rows })
}

fn sheet_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Float(f) => RawCell::Number(*f),
        Data::String(s) if s.is_empty() => RawCell::Empty,
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Empty => RawCell::Empty,
        other => RawCell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON records
// ---------------------------------------------------------------------------

/// Columns are the union of keys across records, in first-seen order.
/// A record lacking a key gets an empty cell there.
fn read_json(bytes: &[u8]) -> Result<RawSheet> {
    let root: JsonValue = serde_json::from_slice(bytes).context("parsing JSON")?;
    let records = root.as_array().context("expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("record {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !positions.contains_key(key) {
                positions.insert(key.clone(), headers.len());
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|obj| {
            let mut row = vec![RawCell::Empty; headers.len()];
            for (key, val) in obj {
                row[positions[key]] = json_cell(val);
            }
            row
        })
        .collect();

    Ok(RawSheet { headers, rows })
}

fn json_cell(val: &JsonValue) -> RawCell {
    match val {
        JsonValue::Number(n) => n
            .as_f64()
            .map(RawCell::Number)
            .unwrap_or_else(|| RawCell::Text(n.to_string())),
        JsonValue::String(s) if s.is_empty() => RawCell::Empty,
        JsonValue::String(s) => RawCell::Text(s.clone()),
        JsonValue::Bool(b) => RawCell::Text(b.to_string()),
        JsonValue::Null => RawCell::Empty,
        other => RawCell::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ColumnType;

    const BANK: &str = "age;job;y\n30;admin.;no\n45;\"blue-collar\";yes\n";

    #[test]
    fn semicolon_text_is_parsed() {
        let table = load(BANK.as_bytes(), FormatHint::Auto).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column_names().collect::<Vec<_>>(), ["age", "job", "y"]);
        assert_eq!(table.column("age").unwrap().column_type(), ColumnType::Numeric);
        assert_eq!(table.column("job").unwrap().label(1), "blue-collar");
    }

    #[test]
    fn garbage_is_unparseable() {
        let bytes = [0xff, 0xfe, 0x00, 0x81, 0x9c, 0x00, 0xc3];
        let err = load(&bytes, FormatHint::Auto).unwrap_err();
        assert!(matches!(err, DataError::Unparseable { .. }), "{err}");
    }

    #[test]
    fn empty_input_is_unparseable() {
        assert!(matches!(
            load(b"", FormatHint::Auto),
            Err(DataError::Unparseable { .. })
        ));
    }

    #[test]
    fn ragged_records_fail_the_delimited_reader() {
        let err = load(b"a;b\n1;2;3\n", FormatHint::Delimited).unwrap_err();
        assert!(matches!(err, DataError::Malformed(_)));
    }

    #[test]
    fn json_records_are_parsed() {
        let json = br#"[{"age": 30, "y": "no"}, {"age": 52, "y": "yes", "job": "retired"}]"#;
        let table = load(json, FormatHint::Json).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column("age").unwrap().as_numeric(), Some(&[30.0, 52.0][..]));
        assert_eq!(table.column("job").unwrap().label(0), "");
    }

    #[test]
    fn hint_from_file_name() {
        assert_eq!(FormatHint::from_file_name("bank.JSON"), FormatHint::Json);
        assert_eq!(FormatHint::from_file_name("bank.xlsx"), FormatHint::Auto);
        assert_eq!(FormatHint::from_file_name("bank-full.csv"), FormatHint::Auto);
    }
}
