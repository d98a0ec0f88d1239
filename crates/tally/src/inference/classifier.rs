//! Column classification into numeric, text and date kinds.

use tracing::debug;

use crate::input::DataTable;
use crate::schema::{ColumnClassification, ColumnKind};

use super::coerce::{format_date, is_date, parse_date, parse_number};

/// Partitions a table's columns by the kind of their values.
///
/// Classification is total: every column lands in exactly one set and
/// malformed cells only make a column fail the numeric or date test.
pub struct ColumnClassifier;

impl ColumnClassifier {
    /// Classify every column of a table.
    pub fn classify(table: &DataTable) -> ColumnClassification {
        let mut classification = ColumnClassification::new();
        for (index, name) in table.headers.iter().enumerate() {
            let kind = Self::classify_column(table, index);
            debug!("Column '{}' classified as {}", name, kind);
            classification.push(name.clone(), kind);
        }
        classification
    }

    /// Classify a single column by position.
    ///
    /// A column with no non-missing values is numeric, like an all-empty
    /// column read from CSV.
    pub fn classify_column(table: &DataTable, index: usize) -> ColumnKind {
        let mut present = table
            .column_values(index)
            .filter(|v| !DataTable::is_null_value(v))
            .peekable();

        if present.peek().is_none() {
            return ColumnKind::Numeric;
        }

        let values: Vec<&str> = present.collect();

        if values.iter().all(|v| parse_number(v).is_some()) {
            ColumnKind::Numeric
        } else if values.iter().all(|v| is_date(v)) {
            ColumnKind::Date
        } else {
            ColumnKind::Text
        }
    }

    /// Kind of a column by name, or None when the table has no such column.
    pub fn kind_of(table: &DataTable, name: &str) -> Option<ColumnKind> {
        table
            .column_index(name)
            .map(|index| Self::classify_column(table, index))
    }

    /// Return a copy of the table with date columns rewritten to ISO-8601.
    ///
    /// Missing cells are left untouched, so classifying the returned table
    /// gives the same result as classifying the input.
    pub fn normalize_dates(table: &DataTable, classification: &ColumnClassification) -> DataTable {
        let mut normalized = table.clone();
        for name in &classification.date {
            let Some(index) = normalized.column_index(name) else {
                continue;
            };
            normalized = normalized.map_column(index, |cell| {
                if DataTable::is_null_value(cell) {
                    return cell.to_string();
                }
                parse_date(cell)
                    .map(|dt| format_date(&dt))
                    .unwrap_or_else(|| cell.to_string())
            });
        }
        normalized
    }

    /// Classify a table and return it with date columns normalized.
    pub fn classify_and_normalize(table: &DataTable) -> (DataTable, ColumnClassification) {
        let classification = Self::classify(table);
        let normalized = Self::normalize_dates(table, &classification);
        (normalized, classification)
    }
}
