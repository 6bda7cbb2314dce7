//! Tab-separated backup tables
//!
//! The table is plain tab-separated text with a header row, written without
//! quoting. Cell text is sanitized so that multi-line quote text cannot break
//! the row structure.

use std::fs::OpenOptions;
use std::path::Path;

use crate::StoreError;

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn read_error(path: &Path, error: csv::Error) -> StoreError {
    StoreError::Read {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}

fn write_error(path: &Path, error: csv::Error) -> StoreError {
    StoreError::Write {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}

/// Tabs and line breaks inside a cell collapse to single spaces.
fn sanitize(cell: &str) -> String {
    cell.replace(['\t', '\n', '\r'], " ")
}

fn build_writer<W: std::io::Write>(target: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(target)
}

/// All rows of the table, header included. A missing file reads as empty.
pub fn read_rows(path: &Path) -> Result<Vec<Vec<String>>, StoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    // Rows are written unquoted, so quotes in cell text are literal.
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_path(path)
        .map_err(|e| read_error(path, e))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| read_error(path, e))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Appends rows, writing the header first when the table is empty or absent.
pub fn append_rows(
    path: &Path,
    header: &[&str],
    rows: &[Vec<String>],
) -> Result<(), StoreError> {
    let needs_header = path
        .metadata()
        .map(|meta| meta.len() == 0)
        .unwrap_or(true);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| io_error(path, e))?;
    let mut writer = build_writer(file);

    if needs_header {
        writer
            .write_record(header)
            .map_err(|e| write_error(path, e))?;
    }
    for row in rows {
        let sanitized: Vec<String> = row.iter().map(|cell| sanitize(cell)).collect();
        writer
            .write_record(&sanitized)
            .map_err(|e| write_error(path, e))?;
    }
    writer.flush().map_err(|e| io_error(path, e))
}

/// Replaces the table with the header plus the given rows.
pub fn write_rows(path: &Path, header: &[&str], rows: &[Vec<String>]) -> Result<(), StoreError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .from_path(path)
        .map_err(|e| write_error(path, e))?;

    writer
        .write_record(header)
        .map_err(|e| write_error(path, e))?;
    for row in rows {
        let sanitized: Vec<String> = row.iter().map(|cell| sanitize(cell)).collect();
        writer
            .write_record(&sanitized)
            .map_err(|e| write_error(path, e))?;
    }
    writer.flush().map_err(|e| io_error(path, e))
}
