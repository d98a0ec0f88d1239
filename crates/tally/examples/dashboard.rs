//! Example: Print a KPI dashboard for a tabular data file.
//!
//! Usage:
//!   cargo run --example dashboard -- <file_path> [formula alias=column ...]
//!
//! Example:
//!   cargo run --example dashboard -- sales.csv "sum(rev) - sum(cost)" rev=revenue cost=cost

use std::env;
use std::path::Path;

use tally::{AliasMap, FormulaResult, Tally};

fn main() -> tally::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --example dashboard -- <file_path> [formula alias=column ...]");
        eprintln!("\nExample:");
        eprintln!("  cargo run --example dashboard -- sales.csv \"sum(rev) - sum(cost)\" rev=revenue cost=cost");
        std::process::exit(1);
    }

    let file_path = &args[1];
    let path = Path::new(file_path);

    if !path.exists() {
        eprintln!("Error: File not found: {}", file_path);
        std::process::exit(1);
    }

    let separator = "=".repeat(80);
    println!("{}", separator);
    println!("Tally Dashboard: {}", file_path);
    println!("{}", separator);
    println!();

    let session = Tally::new().load(path)?;

    // Dataset overview
    let summary = session.summary();
    println!("## Dataset");
    println!("  Rows: {}", summary.row_count);
    println!("  Columns: {}", summary.column_count);
    println!(
        "  Numeric: {}  Text: {}  Date: {}",
        summary.numeric_count, summary.text_count, summary.date_count
    );
    for missing in &summary.missing {
        println!(
            "  Missing in {:20} {:>6} ({:.1}%)",
            missing.column, missing.count, missing.percent
        );
    }
    println!();

    // Basic KPIs over every numeric column
    let numeric = session.classification().numeric.clone();
    if !numeric.is_empty() {
        println!("## KPIs");
        let kpis = session.basic_kpis(numeric.as_slice())?;
        for (column, stats) in &kpis {
            println!(
                "  {:20} sum={:<14.2} mean={:<12.2} n={}",
                column, stats.sum, stats.mean, stats.count
            );
        }
        println!();
    }

    // Grouped by the first text column
    if let (Some(group), Some(metric)) = (session.classification().text.first(), numeric.first()) {
        println!("## {} by {}", metric, group);
        let grouped = session.grouped_kpis(&[metric.as_str()], group)?;
        for row in grouped.rows.iter().take(20) {
            println!(
                "  {:20} sum={:<14.2} mean={:.2}",
                row.key.to_string(),
                row.get(&format!("{}_sum", metric)).unwrap_or(f64::NAN),
                row.get(&format!("{}_mean", metric)).unwrap_or(f64::NAN)
            );
        }
        if grouped.rows.len() > 20 {
            println!("  ... and {} more groups", grouped.rows.len() - 20);
        }
        println!();
    }

    // Growth over the first date column
    if let (Some(date), Some(metric)) = (session.default_date_column(), numeric.first()) {
        let outcome = session.growth_outcome(metric, date);
        println!("## Growth");
        println!(
            "  {} over {}: {:.2}% ({:?})",
            metric, date, outcome.rate, outcome.status
        );
        println!();
    }

    // Optional formula
    if let Some(formula) = args.get(2) {
        let mut aliases = AliasMap::new();
        for pair in &args[3..] {
            if let Some((alias, column)) = pair.split_once('=') {
                aliases.insert(alias.to_string(), column.to_string());
            }
        }

        println!("## Formula: {}", formula);
        match session.evaluate_formula(formula, &aliases) {
            FormulaResult::Scalar { value } => println!("  = {}", value),
            FormulaResult::Series {
                value,
                sum,
                count,
                min,
                max,
            } => println!(
                "  mean={:.4} sum={:.4} count={} min={:.4} max={:.4}",
                value, sum, count, min, max
            ),
            FormulaResult::Error { message } => println!("  error: {}", message),
        }
        println!();
    }

    println!("{}", separator);
    Ok(())
}
