//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use tally::ChartKind;

/// Tally: KPIs, grouped metrics and custom formulas for tabular data
#[derive(Parser)]
#[command(name = "tally")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Endpoint receiving usage events (overrides the configuration file)
    #[arg(long, global = true, value_name = "URL")]
    pub telemetry_endpoint: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize a data file and classify its columns
    Profile {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute sums, means, grouped metrics and growth rate
    Kpi {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Numeric column to aggregate (repeatable; default: every numeric column)
        #[arg(short, long = "column", value_name = "COL")]
        columns: Vec<String>,

        /// Column to group by
        #[arg(short, long, value_name = "COL")]
        group_by: Option<String>,

        /// Date column for growth rate (default: first date column)
        #[arg(short, long, value_name = "COL")]
        date: Option<String>,

        /// Write the full report as JSON
        #[arg(short, long, value_name = "OUT.json")]
        output: Option<PathBuf>,

        /// Write grouped KPIs as CSV (requires --group-by)
        #[arg(long, value_name = "OUT.csv", requires = "group_by")]
        grouped_csv: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate a formula over aliased columns
    Formula {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Formula, e.g. "sum(rev) - sum(cost)"
        #[arg(value_name = "FORMULA")]
        formula: String,

        /// Alias binding in the form alias=column (repeatable)
        #[arg(short, long = "alias", value_name = "ALIAS=COLUMN")]
        aliases: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build a chart specification
    Chart {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Chart kind (bar, line, scatter, pie, histogram, box, heatmap)
        #[arg(short, long)]
        kind: ChartKind,

        /// Column for the x axis (slice names for pie charts)
        #[arg(short, long)]
        x: Option<String>,

        /// Column for the y axis (slice values for pie charts)
        #[arg(short, long)]
        y: Option<String>,

        /// Column to color by
        #[arg(long)]
        color: Option<String>,

        /// Column sizing scatter points
        #[arg(long)]
        size: Option<String>,

        /// Write the chart spec to a JSON file instead of stdout
        #[arg(short, long, value_name = "OUT.json")]
        output: Option<PathBuf>,
    },
}
