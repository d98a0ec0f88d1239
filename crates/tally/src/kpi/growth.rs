//! First-to-last growth rate of a value column ordered by a date column.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::inference::coerce::{parse_date, parse_number};
use crate::input::DataTable;

/// Why a growth computation produced the rate it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthStatus {
    /// The rate was computed from the earliest and latest rows.
    Computed,
    /// The value or date column does not exist.
    MissingColumn,
    /// No row had both a numeric value and a parseable date.
    NoValidRows,
    /// The earliest value is zero, so a relative change is undefined.
    ZeroBaseline,
}

/// Growth rate together with the reason code behind it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthOutcome {
    /// Percentage change; 0 whenever `status` is not `Computed`.
    pub rate: f64,
    pub status: GrowthStatus,
}

impl GrowthOutcome {
    fn zero(status: GrowthStatus) -> Self {
        Self { rate: 0.0, status }
    }
}

/// Growth rate calculator.
pub struct GrowthRate;

impl GrowthRate {
    /// Percentage change from the earliest to the latest dated value.
    ///
    /// Always returns a number. Every failure (absent column, nothing left
    /// after filtering, zero baseline) yields `0`, which cannot be told apart
    /// from no growth; use [`GrowthRate::evaluate`] to see the reason.
    pub fn compute(table: &DataTable, value_column: &str, date_column: &str) -> f64 {
        Self::evaluate(table, value_column, date_column).rate
    }

    /// Growth rate with its reason code.
    pub fn evaluate(table: &DataTable, value_column: &str, date_column: &str) -> GrowthOutcome {
        let (Some(value_index), Some(date_index)) = (
            table.column_index(value_column),
            table.column_index(date_column),
        ) else {
            return GrowthOutcome::zero(GrowthStatus::MissingColumn);
        };

        let mut points: Vec<_> = table
            .rows
            .iter()
            .filter_map(|row| {
                let value = row.get(value_index).map(String::as_str).unwrap_or("");
                let date = row.get(date_index).map(String::as_str).unwrap_or("");
                if DataTable::is_null_value(value) {
                    return None;
                }
                Some((parse_date(date)?, parse_number(value)?))
            })
            .collect();

        // Stable, so rows sharing a date keep table order
        points.sort_by_key(|(date, _)| *date);

        let (Some(&(_, first)), Some(&(_, last))) = (points.first(), points.last()) else {
            return GrowthOutcome::zero(GrowthStatus::NoValidRows);
        };

        if first == 0.0 {
            return GrowthOutcome::zero(GrowthStatus::ZeroBaseline);
        }

        let rate = (last - first) / first.abs() * 100.0;
        debug!(
            "Growth of '{}' by '{}': first={} last={} rate={}",
            value_column, date_column, first, last, rate
        );

        GrowthOutcome {
            rate,
            status: GrowthStatus::Computed,
        }
    }
}
