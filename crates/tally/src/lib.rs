//! Tally: KPI aggregation and custom formulas for uploaded tabular datasets.
//!
//! Tally loads a delimited file, classifies every column as numeric, text or
//! date, and answers the questions a KPI dashboard asks of it: totals and
//! averages, the same per group, growth between the earliest and latest date,
//! user-written formulas over aliased columns, and chart specs for a renderer.
//!
//! # Core Principles
//!
//! - **Non-destructive**: The loaded table is never modified; date
//!   normalization produces a new table
//! - **Closed formulas**: Formulas can only reach whitelisted functions and
//!   the columns the caller aliases
//! - **Errors as values**: A bad formula yields an error result, never a panic
//!
//! # Example
//!
//! ```no_run
//! use tally::{AliasMap, Tally};
//!
//! let session = Tally::new().load("sales.csv").unwrap();
//! println!("Numeric columns: {:?}", session.classification().numeric);
//!
//! let kpis = session.basic_kpis(&["revenue"]).unwrap();
//! println!("Total revenue: {}", kpis["revenue"].sum);
//!
//! let mut aliases = AliasMap::new();
//! aliases.insert("rev".into(), "revenue".into());
//! aliases.insert("cost".into(), "cost".into());
//! println!("{:?}", session.evaluate_formula("sum(rev) - sum(cost)", &aliases));
//! ```

pub mod chart;
pub mod config;
pub mod error;
pub mod formula;
pub mod inference;
pub mod input;
pub mod kpi;
pub mod schema;
pub mod telemetry;

mod tally;

pub use crate::tally::{Session, Tally};
pub use chart::{ChartBuilder, ChartData, ChartKind, ChartRequest, ChartSpec};
pub use config::TallyConfig;
pub use error::{Result, TallyError};
pub use formula::{AliasMap, FormulaConfig, FormulaEngine, FormulaError, FormulaResult};
pub use inference::ColumnClassifier;
pub use input::{DataTable, Parser, ParserConfig, SourceMetadata};
pub use kpi::{
    GroupKey, GroupRow, GroupedKpiResult, GrowthOutcome, GrowthRate, GrowthStatus, KpiAggregator,
    KpiReport, KpiResult, KpiStats,
};
pub use schema::{ColumnClassification, ColumnKind, DatasetSummary};
pub use telemetry::{TelemetryConfig, UsageEvent, UsageTracker};
