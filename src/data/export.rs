use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;

use super::model::Record;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot export to .{0}: choose a .csv or .json file")]
    UnsupportedExtension(String),
}

/// Write `rows` to `path`, choosing CSV or JSON by extension.
pub fn export_file(path: &Path, columns: &[String], rows: &[&Record]) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => write_csv(path, columns, rows),
        "json" => write_json(path, rows),
        _ => Err(ExportError::UnsupportedExtension(ext).into()),
    }
}

/// One header line from `columns`, then one line per record. Fields a
/// record does not have are written empty.
pub fn write_csv(path: &Path, columns: &[String], rows: &[&Record]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    writer.write_record(columns).context("writing CSV header")?;
    for (row_no, record) in rows.iter().enumerate() {
        let line: Vec<String> = columns
            .iter()
            .map(|c| record.get(c).map(|v| v.to_string()).unwrap_or_default())
            .collect();
        writer
            .write_record(&line)
            .with_context(|| format!("writing CSV row {row_no}"))?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

/// Pretty-printed array of objects, keys in record order.
pub fn write_json(path: &Path, rows: &[&Record]) -> Result<()> {
    let file = std::fs::File::create(path).context("creating JSON file")?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, rows).context("writing JSON")?;
    writer.flush().context("flushing JSON file")?;
    Ok(())
}
