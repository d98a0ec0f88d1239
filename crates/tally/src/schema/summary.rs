//! Dataset overview shown after an upload.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::inference::coerce::{format_date, numeric_values, parse_date};
use crate::input::DataTable;

use super::classification::ColumnClassification;

/// Overview of a loaded table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub row_count: usize,
    pub column_count: usize,
    pub numeric_count: usize,
    pub text_count: usize,
    pub date_count: usize,
    /// Columns with at least one missing value, in table order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<MissingValues>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub numeric: Vec<NumericColumnSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text: Vec<TextColumnSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub date: Vec<DateColumnSummary>,
}

/// Missing-value count for one column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingValues {
    pub column: String,
    pub count: usize,
    /// Share of rows missing, 0-100.
    pub percent: f64,
}

/// Count and mean of a numeric column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericColumnSummary {
    pub column: String,
    /// Non-missing values.
    pub count: usize,
    pub mean: f64,
}

/// Distinct values of a text column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextColumnSummary {
    pub column: String,
    pub unique: usize,
}

/// Range of a date column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateColumnSummary {
    pub column: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earliest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<String>,
}

impl DatasetSummary {
    /// Summarize a table using an existing classification.
    pub fn from_table(table: &DataTable, classification: &ColumnClassification) -> Self {
        let row_count = table.row_count();

        let missing = table
            .headers
            .iter()
            .enumerate()
            .filter_map(|(index, name)| {
                let count = table.null_count(index);
                (count > 0).then(|| MissingValues {
                    column: name.clone(),
                    count,
                    percent: count as f64 / row_count.max(1) as f64 * 100.0,
                })
            })
            .collect();

        let numeric = classification
            .numeric
            .iter()
            .filter_map(|name| {
                let values = numeric_values(table, table.column_index(name)?);
                let mean = if values.is_empty() {
                    f64::NAN
                } else {
                    values.iter().sum::<f64>() / values.len() as f64
                };
                Some(NumericColumnSummary {
                    column: name.clone(),
                    count: values.len(),
                    mean,
                })
            })
            .collect();

        let text = classification
            .text
            .iter()
            .filter_map(|name| {
                let index = table.column_index(name)?;
                let unique: HashSet<&str> = table
                    .column_values(index)
                    .filter(|v| !DataTable::is_null_value(v))
                    .map(str::trim)
                    .collect();
                Some(TextColumnSummary {
                    column: name.clone(),
                    unique: unique.len(),
                })
            })
            .collect();

        let date = classification
            .date
            .iter()
            .filter_map(|name| {
                let index = table.column_index(name)?;
                let dates: Vec<_> = table.column_values(index).filter_map(parse_date).collect();
                Some(DateColumnSummary {
                    column: name.clone(),
                    earliest: dates.iter().min().map(format_date),
                    latest: dates.iter().max().map(format_date),
                })
            })
            .collect();

        Self {
            row_count,
            column_count: table.column_count(),
            numeric_count: classification.numeric.len(),
            text_count: classification.text.len(),
            date_count: classification.date.len(),
            missing,
            numeric,
            text,
            date,
        }
    }

    /// Returns true if no cell in the table is missing.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}
