use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
};
use arrow::datatypes::DataType;
use calamine::{open_workbook_auto, Data, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{CellValue, Record};

/// File extensions accepted by [`load_file`].
pub const SUPPORTED_EXTENSIONS: &[&str] =
    &["xlsx", "xlsm", "xlsb", "xls", "ods", "csv", "json", "parquet", "pq"];

/// Structural problems with an input file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("workbook contains no worksheets")]
    NoWorksheets,
    #[error("expected a top-level JSON array of objects")]
    NotAnArray,
    #[error("row {0} is not a JSON object")]
    NotAnObject(usize),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Decode a file into records. Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – first worksheet, first row is the header
/// * `.csv`     – header row with column names
/// * `.json`    – `[{ "Adverse Event": "Nausea", ... }, ...]`
/// * `.parquet` – every column becomes a record field
pub fn load_file(path: &Path) -> Result<Vec<Record>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_workbook(path),
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        _ => Err(LoadError::UnsupportedExtension(ext).into()),
    }
}

// ---------------------------------------------------------------------------
// Workbook loader
// ---------------------------------------------------------------------------

/// Read the first worksheet of a workbook.
///
/// Blank cells are left out of their record and fully blank rows are
/// skipped, so a record only carries the columns it has values for.
fn load_workbook(path: &Path) -> Result<Vec<Record>> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(LoadError::NoWorksheets)?;
    log::debug!("reading worksheet '{sheet_name}'");

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("reading worksheet '{sheet_name}'"))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers = unique_headers(header_row.iter().map(|c| c.to_string()));

    let mut records = Vec::new();
    for row in rows {
        let record = Record::from_distinct(
            headers
                .iter()
                .zip(row.iter())
                .filter_map(|(col, cell)| Some((col.as_str(), workbook_cell(cell)?))),
        );
        if !record.is_empty() {
            records.push(record);
        }
    }
    Ok(records)
}

/// Convert a workbook cell; `None` for blank cells.
fn workbook_cell(cell: &Data) -> Option<CellValue> {
    let value = match cell {
        Data::Empty => return None,
        Data::String(s) if s.is_empty() => return None,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Date(s.clone()),
        Data::Error(e) => CellValue::String(e.to_string()),
    };
    Some(value)
}

/// Name header cells: blanks become `__EMPTY`, repeats get `_1`, `_2`, ...
fn unique_headers(raw: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut headers = Vec::new();
    for name in raw {
        let base = if name.is_empty() {
            "__EMPTY".to_string()
        } else {
            name
        };
        let mut candidate = base.clone();
        let mut n = 0;
        while seen.contains(&candidate) {
            n += 1;
            candidate = format!("{base}_{n}");
        }
        seen.insert(candidate.clone());
        headers.push(candidate);
    }
    headers
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line.
/// Empty fields are left out of the record.
fn load_csv(path: &Path) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers = unique_headers(
        reader
            .headers()
            .context("reading CSV headers")?
            .iter()
            .map(|h| h.to_string()),
    );

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        let record = Record::from_distinct(
            headers
                .iter()
                .zip(row.iter())
                .filter(|(_, value)| !value.is_empty())
                .map(|(col, value)| (col.as_str(), guess_cell_type(value))),
        );
        if !record.is_empty() {
            records.push(record);
        }
    }
    Ok(records)
}

fn guess_cell_type(s: &str) -> CellValue {
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    // f64 parsing also accepts "NaN" and "inf"; those stay text.
    if s.bytes().any(|b| b.is_ascii_digit()) {
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   { "Drug": "Ondansetron", "Adverse Event": "Headache", "Prescription/OTC": "Rx" },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<Record>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().ok_or(LoadError::NotAnArray)?;

    rows.iter()
        .enumerate()
        .map(|(i, row)| -> Result<Record> {
            let obj = row.as_object().ok_or(LoadError::NotAnObject(i))?;
            Ok(Record::from_distinct(
                obj.iter().map(|(key, val)| (key.as_str(), json_to_cell(val))),
            ))
        })
        .collect()
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file. Every column becomes a record field; null cells
/// are left out of the record.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Vec<Record>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let names = unique_headers(batch.schema().fields().iter().map(|f| f.name().clone()));

        for row in 0..batch.num_rows() {
            let record = Record::from_distinct(
                names
                    .iter()
                    .zip(batch.columns())
                    .filter_map(|(name, col)| Some((name.as_str(), arrow_cell(col, row)?))),
            );
            if !record.is_empty() {
                records.push(record);
            }
        }
    }

    Ok(records)
}

/// Extract a single value from an Arrow column; `None` for nulls.
fn arrow_cell(col: &Arc<dyn Array>, row: usize) -> Option<CellValue> {
    if col.is_null(row) {
        return None;
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(any.downcast_ref::<Int32Array>()?.value(row) as i64),
        DataType::Int64 => CellValue::Integer(any.downcast_ref::<Int64Array>()?.value(row)),
        DataType::Float32 => CellValue::Float(any.downcast_ref::<Float32Array>()?.value(row) as f64),
        DataType::Float64 => CellValue::Float(any.downcast_ref::<Float64Array>()?.value(row)),
        DataType::Boolean => CellValue::Bool(any.downcast_ref::<BooleanArray>()?.value(row)),
        other => CellValue::String(format!("{other:?}")),
    };
    Some(value)
}
