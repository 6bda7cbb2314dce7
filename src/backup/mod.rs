//! Backup tables
//!
//! A backup is a flat table of records keyed by link, stored either as
//! tab-separated text (`.csv`, matching the extension the site's own export
//! uses) or as an Excel workbook (`.xlsx`). The format is picked from the
//! target path's extension at startup.

mod table;
mod tsv;
mod xlsx;

use std::path::{Path, PathBuf};

use crate::{ConfigError, ConfigResult, StoreError};

pub use table::TableRecord;

/// On-disk representation of a backup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupFormat {
    /// Tab-separated text.
    Tsv,
    /// Excel workbook.
    Xlsx,
}

impl BackupFormat {
    /// Format implied by a backup path's extension.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("csv") => Ok(BackupFormat::Tsv),
            Some("xlsx") => Ok(BackupFormat::Xlsx),
            _ => Err(ConfigError::UnsupportedExtension(
                path.display().to_string(),
            )),
        }
    }
}

/// One backup table bound to a path and format.
pub struct BackupStore {
    path: PathBuf,
    format: BackupFormat,
}

impl BackupStore {
    pub fn open(path: &Path) -> ConfigResult<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            format: BackupFormat::from_path(path)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_raw(&self) -> Result<Vec<Vec<String>>, StoreError> {
        match self.format {
            BackupFormat::Tsv => tsv::read_rows(&self.path),
            BackupFormat::Xlsx => xlsx::read_rows(&self.path),
        }
    }

    /// Loads the existing records as the merge baseline.
    ///
    /// Rows that do not fit the column layout are logged and skipped; a
    /// damaged line in a hand-edited backup must not abort the run.
    pub fn read_existing<T: TableRecord>(&self) -> Result<Vec<T>, StoreError> {
        let rows = self.read_raw()?;
        let data = strip_header(&rows, T::COLUMNS);

        let mut records = Vec::with_capacity(data.len());
        for row in data {
            match T::from_row(row) {
                Some(record) => records.push(record),
                None => tracing::warn!(
                    "Skipping malformed row in {}: {:?}",
                    self.path.display(),
                    row
                ),
            }
        }
        Ok(records)
    }

    /// Appends records, creating the table with its header if needed.
    ///
    /// The xlsx format has no append; the whole sheet is read back and
    /// rewritten.
    pub fn append<T: TableRecord>(&self, items: &[T]) -> Result<(), StoreError> {
        let rows: Vec<Vec<String>> = items.iter().map(TableRecord::to_row).collect();
        match self.format {
            BackupFormat::Tsv => tsv::append_rows(&self.path, T::COLUMNS, &rows),
            BackupFormat::Xlsx => {
                let existing = self.read_raw()?;
                let mut combined: Vec<Vec<String>> =
                    strip_header(&existing, T::COLUMNS).to_vec();
                combined.extend(rows);
                xlsx::write_rows(&self.path, T::COLUMNS, &combined)
            }
        }
    }

    /// Replaces the table with the given records.
    pub fn rewrite<T: TableRecord>(&self, items: &[T]) -> Result<(), StoreError> {
        let rows: Vec<Vec<String>> = items.iter().map(TableRecord::to_row).collect();
        match self.format {
            BackupFormat::Tsv => tsv::write_rows(&self.path, T::COLUMNS, &rows),
            BackupFormat::Xlsx => xlsx::write_rows(&self.path, T::COLUMNS, &rows),
        }
    }
}

/// Drops the leading header row when present.
fn strip_header<'a>(rows: &'a [Vec<String>], columns: &[&str]) -> &'a [Vec<String>] {
    match rows.first() {
        Some(first) if first.iter().map(String::as_str).eq(columns.iter().copied()) => &rows[1..],
        _ => rows,
    }
}
