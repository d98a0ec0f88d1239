//! Data source abstraction and metadata.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata about the uploaded data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, etc.).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the file was loaded.
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has been loaded.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        format: String,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            row_count,
            column_count,
            loaded_at: Utc::now(),
        }
    }
}

/// Parsed tabular data, one string cell per row and column.
///
/// Cells are kept as text and coerced to numbers or dates by the consumer
/// that needs them. A table is never edited in place; operations that
/// rewrite cells return a new table.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    /// Column headers.
    pub headers: Vec<String>,
    /// Row data as strings (row-major order).
    pub rows: Vec<Vec<String>>,
    /// The delimiter used.
    pub delimiter: u8,
}

impl DataTable {
    /// Create a new data table.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>, delimiter: u8) -> Self {
        Self {
            headers,
            rows,
            delimiter,
        }
    }

    /// Build a table from named columns.
    ///
    /// Shorter columns are padded with empty (missing) cells up to the
    /// length of the longest one.
    pub fn from_columns<N, V>(columns: Vec<(N, Vec<V>)>) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        let mut headers = Vec::with_capacity(columns.len());
        let mut data: Vec<Vec<String>> = Vec::with_capacity(columns.len());
        for (name, values) in columns {
            headers.push(name.into());
            data.push(values.into_iter().map(Into::into).collect());
        }

        let row_count = data.iter().map(Vec::len).max().unwrap_or(0);
        let rows = (0..row_count)
            .map(|r| {
                data.iter()
                    .map(|col| col.get(r).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        Self::new(headers, rows, b',')
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows.iter().map(move |row| {
            row.get(index)
                .map(|s| s.as_str())
                .unwrap_or("")
        })
    }

    /// Get a column by name.
    pub fn column_by_name(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.column_index(name)?;
        Some(self.column_values(index).collect())
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col).map(|s| s.as_str()))
    }

    /// Return a copy of the table with one column's cells rewritten.
    pub fn map_column<F>(&self, index: usize, mut f: F) -> DataTable
    where
        F: FnMut(&str) -> String,
    {
        let mut out = self.clone();
        for row in &mut out.rows {
            if let Some(cell) = row.get_mut(index) {
                *cell = f(cell);
            }
        }
        out
    }

    /// Count missing cells in a column.
    pub fn null_count(&self, index: usize) -> usize {
        self.column_values(index)
            .filter(|v| Self::is_null_value(v))
            .count()
    }

    /// Check if a value represents a missing/null value.
    pub fn is_null_value(value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("na")
            || trimmed.eq_ignore_ascii_case("n/a")
            || trimmed.eq_ignore_ascii_case("nan")
            || trimmed.eq_ignore_ascii_case("null")
            || trimmed.eq_ignore_ascii_case("none")
            || trimmed.eq_ignore_ascii_case("nil")
            || trimmed == "."
            || trimmed == "-"
    }
}
