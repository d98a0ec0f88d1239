//! CSV/TSV loader with delimiter detection.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{Result, TallyError};
use super::source::{DataTable, SourceMetadata};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Parser configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Parses uploaded delimited-text files into a [`DataTable`].
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the data table and metadata.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(DataTable, SourceMetadata)> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|e| TallyError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(|e| TallyError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let size_bytes = contents.len() as u64;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let delimiter = self.resolve_delimiter(&contents)?;
        let data_table = self.parse_with_delimiter(&contents, delimiter)?;

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        }.to_string();

        debug!(
            "Loaded {} ({} rows, {} columns, {})",
            path.display(),
            data_table.row_count(),
            data_table.column_count(),
            format
        );

        let source_metadata = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            size_bytes,
            format,
            data_table.row_count(),
            data_table.column_count(),
        );

        Ok((data_table, source_metadata))
    }

    /// Parse in-memory bytes, detecting the delimiter unless configured.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<DataTable> {
        let delimiter = self.resolve_delimiter(bytes)?;
        self.parse_with_delimiter(bytes, delimiter)
    }

    fn resolve_delimiter(&self, bytes: &[u8]) -> Result<u8> {
        match self.config.delimiter {
            Some(d) if d == self.config.quote || d == b'\n' || d == b'\r' => Err(
                TallyError::InvalidDelimiter(format!("{:?}", d as char)),
            ),
            Some(d) => Ok(d),
            None => detect_delimiter(bytes),
        }
    }

    fn parse_with_delimiter(&self, bytes: &[u8], delimiter: u8) -> Result<DataTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(self.config.has_header)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let mut headers: Vec<String> = if self.config.has_header {
            reader
                .headers()?
                .iter()
                .map(|s| s.trim().to_string())
                .collect()
        } else {
            Vec::new()
        };

        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }

            let record = result?;
            if headers.is_empty() && !self.config.has_header {
                headers = (0..record.len())
                    .map(|i| format!("column_{}", i + 1))
                    .collect();
            }

            let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        if headers.is_empty() || (headers.iter().all(|h| h.is_empty()) && rows.is_empty()) {
            return Err(TallyError::EmptyData("No columns found".to_string()));
        }

        if rows.is_empty() {
            return Err(TallyError::EmptyData("No data rows found".to_string()));
        }

        Ok(DataTable::new(headers, rows, delimiter))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(TallyError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let variance: f64 = if counts.len() > 1 {
            let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
            counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / counts.len() as f64
        } else {
            0.0
        };

        // Higher count with lower variance wins; tabs get a small bonus
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else if variance < 1.0 {
            first_count * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}
