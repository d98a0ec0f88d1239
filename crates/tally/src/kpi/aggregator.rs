//! Basic and grouped KPI aggregation.

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{Result, TallyError};
use crate::inference::coerce::{numeric_values, parse_number};
use crate::inference::ColumnClassifier;
use crate::input::DataTable;

use super::types::{mean_field, sum_field, GroupKey, GroupRow, GroupedKpiResult, KpiResult, KpiStats};

/// Computes sum and mean KPIs over numeric columns.
pub struct KpiAggregator;

impl KpiAggregator {
    /// Sum and mean of each requested column.
    ///
    /// Missing cells are excluded from both. Fails with
    /// [`TallyError::InvalidColumn`] if any column is absent or not numeric.
    pub fn aggregate<S: AsRef<str>>(table: &DataTable, columns: &[S]) -> Result<KpiResult> {
        let indices = resolve_numeric_columns(table, columns)?;

        let mut result = KpiResult::new();
        for (name, index) in indices {
            let stats = KpiStats::from_values(&numeric_values(table, index));
            debug!("KPI '{}': sum={} mean={}", name, stats.sum, stats.mean);
            result.insert(name, stats);
        }
        Ok(result)
    }

    /// Per-group sum and mean of each requested column.
    ///
    /// Rows are partitioned by the trimmed text of `group_column`; rows whose
    /// grouping cell is missing form their own group rather than being
    /// dropped. Groups appear in order of first appearance.
    pub fn aggregate_grouped<S: AsRef<str>>(
        table: &DataTable,
        columns: &[S],
        group_column: &str,
    ) -> Result<GroupedKpiResult> {
        let group_index = table
            .column_index(group_column)
            .ok_or_else(|| TallyError::missing_column(group_column))?;
        let indices = resolve_numeric_columns(table, columns)?;

        // group key -> per-metric collected values
        let mut partitions: IndexMap<GroupKey, Vec<Vec<f64>>> = IndexMap::new();
        for row in &table.rows {
            let cell = row.get(group_index).map(String::as_str).unwrap_or("");
            let bucket = partitions
                .entry(GroupKey::from_cell(cell))
                .or_insert_with(|| vec![Vec::new(); indices.len()]);

            for (slot, (_, index)) in indices.iter().enumerate() {
                let value = row.get(*index).map(String::as_str).unwrap_or("");
                if DataTable::is_null_value(value) {
                    continue;
                }
                if let Some(v) = parse_number(value) {
                    bucket[slot].push(v);
                }
            }
        }

        let rows = partitions
            .into_iter()
            .map(|(key, buckets)| {
                let mut values = IndexMap::new();
                for ((name, _), bucket) in indices.iter().zip(&buckets) {
                    let stats = KpiStats::from_values(bucket);
                    values.insert(sum_field(name), stats.sum);
                    values.insert(mean_field(name), stats.mean);
                }
                GroupRow { key, values }
            })
            .collect::<Vec<_>>();

        debug!("Grouped by '{}': {} groups", group_column, rows.len());

        Ok(GroupedKpiResult {
            group_column: group_column.to_string(),
            metrics: indices.into_iter().map(|(name, _)| name).collect(),
            rows,
        })
    }
}

/// Resolve requested columns to positions, rejecting absent or non-numeric
/// ones. Duplicate requests collapse to the first occurrence.
fn resolve_numeric_columns<S: AsRef<str>>(
    table: &DataTable,
    columns: &[S],
) -> Result<Vec<(String, usize)>> {
    let mut resolved: Vec<(String, usize)> = Vec::with_capacity(columns.len());
    for column in columns {
        let name = column.as_ref();
        if resolved.iter().any(|(n, _)| n == name) {
            continue;
        }
        let index = table
            .column_index(name)
            .ok_or_else(|| TallyError::missing_column(name))?;
        if !ColumnClassifier::classify_column(table, index).is_numeric() {
            return Err(TallyError::not_numeric(name));
        }
        resolved.push((name.to_string(), index));
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sales_table() -> DataTable {
        DataTable::from_columns(vec![
            ("region", vec!["East", "East", "West", ""]),
            ("sales", vec!["10", "20", "30", "40"]),
            ("units", vec!["1", "", "3", "4"]),
        ])
    }

    #[test]
    fn test_aggregate_sum_and_mean() {
        let result = KpiAggregator::aggregate(&sales_table(), &["sales", "units"]).unwrap();

        assert_eq!(result["sales"].sum, 100.0);
        assert_eq!(result["sales"].mean, 25.0);
        assert_eq!(result["units"].sum, 8.0);
        assert!((result["units"].mean - 8.0 / 3.0).abs() < 1e-12);
        assert_eq!(result["units"].count, 3);
    }

    #[test]
    fn test_aggregate_preserves_request_order() {
        let result = KpiAggregator::aggregate(&sales_table(), &["units", "sales", "units"]).unwrap();
        let keys: Vec<_> = result.keys().cloned().collect();
        assert_eq!(keys, vec!["units", "sales"]);
    }

    #[test]
    fn test_aggregate_all_missing_column() {
        let table = DataTable::from_columns(vec![("x", vec!["", "NA"])]);
        let result = KpiAggregator::aggregate(&table, &["x"]).unwrap();

        assert_eq!(result["x"].sum, 0.0);
        assert!(result["x"].mean.is_nan());
    }

    #[test]
    fn test_aggregate_rejects_missing_column() {
        let err = KpiAggregator::aggregate(&sales_table(), &["profit"]).unwrap_err();
        assert!(matches!(err, TallyError::InvalidColumn { ref column, .. } if column == "profit"));
    }

    #[test]
    fn test_aggregate_rejects_text_column() {
        let err = KpiAggregator::aggregate(&sales_table(), &["region"]).unwrap_err();
        assert!(matches!(err, TallyError::InvalidColumn { .. }));
    }

    #[test]
    fn test_grouped_keeps_missing_group() {
        let result = KpiAggregator::aggregate_grouped(&sales_table(), &["sales"], "region").unwrap();

        assert_eq!(result.rows.len(), 3);
        let missing = result.row(&GroupKey::Missing).unwrap();
        assert_eq!(missing.get("sales_sum"), Some(40.0));
    }

    #[test]
    fn test_grouped_scenario() {
        let table = DataTable::from_columns(vec![
            ("region", vec!["East", "East", "West"]),
            ("sales", vec!["10", "20", "30"]),
        ]);
        let result = KpiAggregator::aggregate_grouped(&table, &["sales"], "region").unwrap();

        assert_eq!(result.rows.len(), 2);
        let east = result.row(&GroupKey::Value("East".into())).unwrap();
        assert_eq!(east.get("sales_sum"), Some(30.0));
        assert_eq!(east.get("sales_mean"), Some(15.0));
        let west = result.row(&GroupKey::Value("West".into())).unwrap();
        assert_eq!(west.get("sales_sum"), Some(30.0));
        assert_eq!(west.get("sales_mean"), Some(30.0));
        assert_eq!(result.field_names(), vec!["sales_sum", "sales_mean"]);
    }

    #[test]
    fn test_grouped_mean_nan_when_group_has_no_values() {
        let table = DataTable::from_columns(vec![
            ("g", vec!["a", "b"]),
            ("v", vec!["1", ""]),
        ]);
        let result = KpiAggregator::aggregate_grouped(&table, &["v"], "g").unwrap();
        let b = result.row(&GroupKey::Value("b".into())).unwrap();

        assert_eq!(b.get("v_sum"), Some(0.0));
        assert!(b.get("v_mean").unwrap().is_nan());
    }

    #[test]
    fn test_grouped_rejects_missing_group_column() {
        let err = KpiAggregator::aggregate_grouped(&sales_table(), &["sales"], "country").unwrap_err();
        assert!(matches!(err, TallyError::InvalidColumn { ref column, .. } if column == "country"));
    }
}
