//! KPI command - totals, averages, grouped metrics and growth rate.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use colored::Colorize;
use tally::{GrowthStatus, Tally};

use super::{fmt_number, load};

/// Arguments of the `kpi` subcommand.
pub struct KpiArgs {
    pub file: PathBuf,
    pub columns: Vec<String>,
    pub group_by: Option<String>,
    pub date: Option<String>,
    pub output: Option<PathBuf>,
    pub grouped_csv: Option<PathBuf>,
    pub json: bool,
}

pub fn run(tally: &Tally, args: KpiArgs) -> Result<(), Box<dyn std::error::Error>> {
    let session = load(tally, &args.file)?;

    let columns = if args.columns.is_empty() {
        session.classification().numeric.clone()
    } else {
        args.columns
    };
    if columns.is_empty() {
        return Err("No numeric columns to aggregate".into());
    }

    // Growth tracks the first selected column along the chosen date axis.
    let date_column = args
        .date
        .as_deref()
        .or_else(|| session.default_date_column())
        .map(str::to_string);
    let growth = date_column
        .as_deref()
        .map(|date| (columns[0].as_str(), date));

    let report = session.report(columns.as_slice(), args.group_by.as_deref(), growth)?;

    if let Some(path) = &args.output {
        report.save(path)?;
        eprintln!("{} {}", "Saved report to".green(), path.display());
    }

    if let Some(path) = &args.grouped_csv {
        if let Some(grouped) = &report.grouped {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            grouped.write_csv(BufWriter::new(File::create(path)?))?;
            eprintln!("{} {}", "Saved grouped KPIs to".green(), path.display());
        }
    }

    if args.json {
        println!("{}", report.to_json()?);
        return Ok(());
    }

    println!(
        "{} {}",
        "KPIs for".cyan().bold(),
        args.file.display().to_string().white()
    );
    println!();
    println!("  {:24} {:>16} {:>16} {:>8}", "column", "sum", "mean", "count");
    for (column, stats) in &report.kpis {
        println!(
            "  {:24} {:>16} {:>16} {:>8}",
            column.white(),
            fmt_number(stats.sum),
            fmt_number(stats.mean),
            stats.count
        );
    }

    if let Some(grouped) = &report.grouped {
        println!();
        println!("{} {}", "Grouped by".yellow().bold(), grouped.group_column);
        let fields = grouped.field_names();
        println!(
            "  {:24} {}",
            grouped.group_column,
            fields
                .iter()
                .map(|f| format!("{:>16}", f))
                .collect::<Vec<_>>()
                .join(" ")
        );
        for row in &grouped.rows {
            let cells: Vec<String> = fields
                .iter()
                .map(|f| format!("{:>16}", row.get(f).map(fmt_number).unwrap_or_default()))
                .collect();
            println!("  {:24} {}", row.key.to_string(), cells.join(" "));
        }
    }

    if let (Some(outcome), Some(date)) = (&report.growth, &date_column) {
        println!();
        let rate = format!("{:.2}%", outcome.rate);
        let rate = if outcome.rate > 0.0 {
            rate.green()
        } else if outcome.rate < 0.0 {
            rate.red()
        } else {
            rate.normal()
        };
        print!(
            "{} {} over {}: {}",
            "Growth".yellow().bold(),
            columns[0],
            date,
            rate.bold()
        );
        match outcome.status {
            GrowthStatus::Computed => println!(),
            GrowthStatus::MissingColumn => println!(" {}", "(column not found)".dimmed()),
            GrowthStatus::NoValidRows => println!(" {}", "(no dated values)".dimmed()),
            GrowthStatus::ZeroBaseline => println!(" {}", "(earliest value is zero)".dimmed()),
        }
    }

    Ok(())
}
