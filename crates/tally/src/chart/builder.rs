//! Turns column selections into chart specs.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Result, TallyError};
use crate::inference::parse_number;
use crate::input::DataTable;
use crate::schema::{ColumnClassification, ColumnKind};

use super::types::{ChartData, ChartKind, ChartRequest, ChartSpec};

/// Builds [`ChartSpec`]s from a classified table.
pub struct ChartBuilder;

impl ChartBuilder {
    /// Validate a request against the table and gather the chart's data.
    ///
    /// Returns `InvalidChart` when a required selection is absent or a
    /// selection does not apply to the chart kind, and `InvalidColumn` when a
    /// selected column does not exist or a value column is not numeric.
    pub fn build(
        table: &DataTable,
        classification: &ColumnClassification,
        request: &ChartRequest,
    ) -> Result<ChartSpec> {
        let kind = request.kind;

        if kind == ChartKind::Heatmap {
            unused(request.x.as_deref(), kind, "x")?;
            unused(request.y.as_deref(), kind, "y")?;
            unused(request.color.as_deref(), kind, "color")?;
            unused(request.size.as_deref(), kind, "size")?;
            let (columns, values) = correlation_matrix(table, classification)?;
            return Ok(ChartSpec {
                kind,
                title: title(kind, "", ""),
                x: None,
                y: None,
                color: None,
                size: None,
                data: ChartData::Matrix { columns, values },
            });
        }

        let x = required(request.x.as_deref(), kind, "x")?;
        lookup(table, classification, x)?;

        let y = if kind.needs_y() {
            let y = required(request.y.as_deref(), kind, "y")?;
            require_numeric(table, classification, y)?;
            Some(y)
        } else {
            unused(request.y.as_deref(), kind, "y")?;
            None
        };

        let color = match kind {
            ChartKind::Bar | ChartKind::Line | ChartKind::Scatter => request.color.as_deref(),
            _ => {
                unused(request.color.as_deref(), kind, "color")?;
                None
            }
        };
        if let Some(color) = color {
            lookup(table, classification, color)?;
        }

        let size = if kind == ChartKind::Scatter {
            request.size.as_deref()
        } else {
            unused(request.size.as_deref(), kind, "size")?;
            None
        };
        if let Some(size) = size {
            require_numeric(table, classification, size)?;
        }

        let title = title(kind, x, y.unwrap_or_default());

        let data = if kind == ChartKind::Pie {
            slices(table, x, y.unwrap_or_default())
        } else {
            let mut columns: Vec<&str> = Vec::new();
            for column in [Some(x), y, color, size].into_iter().flatten() {
                if !columns.contains(&column) {
                    columns.push(column);
                }
            }
            records(table, classification, &columns)
        };

        debug!(%kind, %title, "Built chart spec");

        Ok(ChartSpec {
            kind,
            title,
            x: Some(x.to_string()),
            y: y.map(str::to_string),
            color: color.map(str::to_string),
            size: size.map(str::to_string),
            data,
        })
    }
}

fn title(kind: ChartKind, x: &str, y: &str) -> String {
    match kind {
        ChartKind::Bar => format!("Bar Chart: {y} by {x}"),
        ChartKind::Line => format!("Line Chart: {y} over {x}"),
        ChartKind::Scatter => format!("Scatter Plot: {y} vs {x}"),
        ChartKind::Pie => format!("Pie Chart: {y} by {x}"),
        ChartKind::Histogram => format!("Histogram: {x}"),
        ChartKind::Box => format!("Box Plot: {y} by {x}"),
        ChartKind::Heatmap => "Heatmap: Correlation Matrix".to_string(),
    }
}

fn required<'a>(selection: Option<&'a str>, kind: ChartKind, axis: &str) -> Result<&'a str> {
    selection
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| TallyError::InvalidChart(format!("{kind} chart requires a '{axis}' column")))
}

fn unused(selection: Option<&str>, kind: ChartKind, axis: &str) -> Result<()> {
    match selection {
        Some(_) => Err(TallyError::InvalidChart(format!(
            "{kind} chart does not use a '{axis}' column"
        ))),
        None => Ok(()),
    }
}

fn lookup(table: &DataTable, classification: &ColumnClassification, column: &str) -> Result<(usize, ColumnKind)> {
    let index = table
        .column_index(column)
        .ok_or_else(|| TallyError::missing_column(column))?;
    let kind = classification
        .kind_of(column)
        .ok_or_else(|| TallyError::missing_column(column))?;
    Ok((index, kind))
}

fn require_numeric(table: &DataTable, classification: &ColumnClassification, column: &str) -> Result<usize> {
    match lookup(table, classification, column)? {
        (index, ColumnKind::Numeric) => Ok(index),
        _ => Err(TallyError::not_numeric(column)),
    }
}

fn records(table: &DataTable, classification: &ColumnClassification, columns: &[&str]) -> ChartData {
    let resolved: Vec<(usize, bool)> = columns
        .iter()
        .filter_map(|name| {
            let index = table.column_index(name)?;
            let numeric = classification.kind_of(name) == Some(ColumnKind::Numeric);
            Some((index, numeric))
        })
        .collect();

    let rows = (0..table.row_count())
        .map(|row| {
            resolved
                .iter()
                .map(|&(col, numeric)| cell_value(table.get(row, col).unwrap_or(""), numeric))
                .collect()
        })
        .collect();

    ChartData::Records {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        rows,
    }
}

fn cell_value(raw: &str, numeric: bool) -> serde_json::Value {
    if DataTable::is_null_value(raw) {
        return serde_json::Value::Null;
    }
    if numeric {
        parse_number(raw).map_or(serde_json::Value::Null, serde_json::Value::from)
    } else {
        serde_json::Value::String(raw.trim().to_string())
    }
}

/// Sum of `values` per distinct `names` cell, labels in ascending order.
/// Rows without a name are left out.
fn slices(table: &DataTable, names: &str, values: &str) -> ChartData {
    let mut sums: BTreeMap<String, f64> = BTreeMap::new();

    if let (Some(n), Some(v)) = (table.column_index(names), table.column_index(values)) {
        for row in 0..table.row_count() {
            let name = table.get(row, n).unwrap_or("");
            if DataTable::is_null_value(name) {
                continue;
            }
            let total = sums.entry(name.trim().to_string()).or_insert(0.0);
            if let Some(value) = table.get(row, v).and_then(parse_number) {
                *total += value;
            }
        }
    }

    let (labels, values) = sums.into_iter().unzip();
    ChartData::Slices { labels, values }
}

/// Pearson correlation between every pair of numeric columns, using the
/// rows where both values are present.
fn correlation_matrix(
    table: &DataTable,
    classification: &ColumnClassification,
) -> Result<(Vec<String>, Vec<Vec<f64>>)> {
    let columns: Vec<(String, Vec<Option<f64>>)> = classification
        .numeric
        .iter()
        .filter_map(|name| {
            let index = table.column_index(name)?;
            let values = table
                .column_values(index)
                .map(|v| {
                    if DataTable::is_null_value(v) {
                        None
                    } else {
                        parse_number(v)
                    }
                })
                .collect();
            Some((name.clone(), values))
        })
        .collect();

    if columns.is_empty() {
        return Err(TallyError::InvalidChart(
            "No numeric data available for heatmap".to_string(),
        ));
    }

    let n = columns.len();
    let mut matrix = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(&columns[i].1, &columns[j].1);
            let r = if i == j && r.is_finite() { 1.0 } else { r };
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }

    Ok((columns.into_iter().map(|(name, _)| name).collect(), matrix))
}

fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}
