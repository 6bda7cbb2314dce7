//! Excel backup tables
//!
//! The xlsx format has no in-place append, so the store reads the whole
//! sheet back and rewrites the workbook on every update. Backups are small
//! enough that this stays cheap.

use std::path::Path;

use calamine::{open_workbook, Reader, Xlsx};
use rust_xlsxwriter::Workbook;

use crate::StoreError;

fn read_error(path: &Path, message: String) -> StoreError {
    StoreError::Read {
        path: path.display().to_string(),
        message,
    }
}

fn write_error(path: &Path, error: rust_xlsxwriter::XlsxError) -> StoreError {
    StoreError::Write {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}

/// All rows of the first worksheet, header included. A missing file reads as
/// empty.
pub fn read_rows(path: &Path) -> Result<Vec<Vec<String>>, StoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut workbook: Xlsx<_> =
        open_workbook(path).map_err(|e: calamine::XlsxError| read_error(path, e.to_string()))?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| read_error(path, e.to_string()))?,
        None => return Ok(Vec::new()),
    };

    Ok(range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect())
}

/// Replaces the workbook with a single sheet holding the header plus rows.
pub fn write_rows(path: &Path, header: &[&str], rows: &[Vec<String>]) -> Result<(), StoreError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, name) in header.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *name)
            .map_err(|e| write_error(path, e))?;
    }
    for (idx, row) in rows.iter().enumerate() {
        for (col, cell) in row.iter().enumerate() {
            worksheet
                .write_string((idx + 1) as u32, col as u16, cell.as_str())
                .map_err(|e| write_error(path, e))?;
        }
    }

    workbook.save(path).map_err(|e| write_error(path, e))
}
