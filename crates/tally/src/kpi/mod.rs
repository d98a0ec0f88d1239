//! KPI computation: basic and grouped aggregates, growth rate, export.

mod aggregator;
mod growth;
mod report;
mod types;

pub use aggregator::KpiAggregator;
pub use growth::{GrowthOutcome, GrowthRate, GrowthStatus};
pub use report::KpiReport;
pub use types::{GroupKey, GroupRow, GroupedKpiResult, KpiResult, KpiStats};
