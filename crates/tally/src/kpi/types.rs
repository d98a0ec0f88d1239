//! KPI result types.

use std::fmt;
use std::io::Write;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Sum and mean of one numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpiStats {
    /// Sum over non-missing values; 0 when there are none.
    pub sum: f64,
    /// Mean over non-missing values; NaN when there are none.
    pub mean: f64,
    /// Number of non-missing values used.
    pub count: usize,
}

impl KpiStats {
    /// Compute stats over already-filtered values.
    pub fn from_values(values: &[f64]) -> Self {
        let sum: f64 = values.iter().sum();
        let mean = if values.is_empty() {
            f64::NAN
        } else {
            sum / values.len() as f64
        };
        Self {
            sum,
            mean,
            count: values.len(),
        }
    }

    /// Returns false when the mean is undefined.
    pub fn has_mean(&self) -> bool {
        self.count > 0
    }
}

/// Basic KPIs keyed by column, in request order.
pub type KpiResult = IndexMap<String, KpiStats>;

/// Key identifying one group of rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupKey {
    /// A present grouping value (trimmed cell text).
    Value(String),
    /// Rows whose grouping cell is missing.
    Missing,
}

impl GroupKey {
    /// Key for a raw cell.
    pub fn from_cell(cell: &str) -> Self {
        if crate::input::DataTable::is_null_value(cell) {
            GroupKey::Missing
        } else {
            GroupKey::Value(cell.trim().to_string())
        }
    }

    /// The group value, or None for the missing group.
    pub fn as_value(&self) -> Option<&str> {
        match self {
            GroupKey::Value(v) => Some(v),
            GroupKey::Missing => None,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Value(v) => f.write_str(v),
            GroupKey::Missing => f.write_str("<missing>"),
        }
    }
}

/// One group's aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRow {
    pub key: GroupKey,
    /// `<column>_sum` and `<column>_mean` fields in request order.
    pub values: IndexMap<String, f64>,
}

impl GroupRow {
    /// Look up a field such as `sales_sum`.
    pub fn get(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied()
    }
}

/// Per-group sum and mean of the requested columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedKpiResult {
    /// Column the rows were partitioned by.
    pub group_column: String,
    /// Requested numeric columns.
    pub metrics: Vec<String>,
    /// One row per distinct group value, in order of first appearance.
    pub rows: Vec<GroupRow>,
}

impl GroupedKpiResult {
    /// Output field names, `<column>_sum` then `<column>_mean` per metric.
    pub fn field_names(&self) -> Vec<String> {
        self.metrics
            .iter()
            .flat_map(|m| [sum_field(m), mean_field(m)])
            .collect()
    }

    /// Find the row for a group value.
    pub fn row(&self, key: &GroupKey) -> Option<&GroupRow> {
        self.rows.iter().find(|r| &r.key == key)
    }

    /// Write the result as CSV with the group column first.
    ///
    /// The missing group is written as an empty cell.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header = vec![self.group_column.clone()];
        header.extend(self.field_names());
        csv_writer.write_record(&header)?;

        for row in &self.rows {
            let mut record = vec![row.key.as_value().unwrap_or("").to_string()];
            for field in self.field_names() {
                record.push(match row.get(&field) {
                    Some(v) if v.is_finite() => v.to_string(),
                    _ => String::new(),
                });
            }
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

pub(crate) fn sum_field(column: &str) -> String {
    format!("{column}_sum")
}

pub(crate) fn mean_field(column: &str) -> String {
    format!("{column}_mean")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_from_values() {
        let stats = KpiStats::from_values(&[1.0, 2.0, 3.0]);
        assert_eq!(stats.sum, 6.0);
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.count, 3);
    }

    #[test]
    fn test_stats_empty() {
        let stats = KpiStats::from_values(&[]);
        assert_eq!(stats.sum, 0.0);
        assert!(stats.mean.is_nan());
        assert!(!stats.has_mean());
    }

    #[test]
    fn test_group_key_from_cell() {
        assert_eq!(GroupKey::from_cell(" East "), GroupKey::Value("East".into()));
        assert_eq!(GroupKey::from_cell("NA"), GroupKey::Missing);
    }

    #[test]
    fn test_group_key_serializes_missing_as_null() {
        let json = serde_json::to_string(&vec![GroupKey::Value("A".into()), GroupKey::Missing])
            .unwrap();
        assert_eq!(json, r#"["A",null]"#);
    }

    #[test]
    fn test_write_csv() {
        let mut values = IndexMap::new();
        values.insert("sales_sum".to_string(), 30.0);
        values.insert("sales_mean".to_string(), 15.0);
        let result = GroupedKpiResult {
            group_column: "region".to_string(),
            metrics: vec!["sales".to_string()],
            rows: vec![GroupRow {
                key: GroupKey::Value("East".to_string()),
                values,
            }],
        };

        let mut out = Vec::new();
        result.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text, "region,sales_sum,sales_mean\nEast,30,15\n");
    }
}
