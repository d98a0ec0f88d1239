//! Profile command - summarize a data file and classify its columns.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;
use tally::{ColumnClassification, ColumnKind, DatasetSummary, SourceMetadata, Tally};

use super::{fmt_number, load};

/// JSON output of the profile command.
#[derive(Serialize)]
struct Profile<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a SourceMetadata>,
    classification: &'a ColumnClassification,
    summary: &'a DatasetSummary,
}

pub fn run(tally: &Tally, file: PathBuf, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let session = load(tally, &file)?;
    let summary = session.summary();
    let classification = session.classification();

    if json_output {
        let profile = Profile {
            source: session.source(),
            classification,
            summary: &summary,
        };
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Profile of".cyan().bold(),
        file.display().to_string().white()
    );
    println!();
    println!(
        "{} rows, {} columns ({} numeric, {} text, {} date)",
        summary.row_count.to_string().white().bold(),
        summary.column_count.to_string().white().bold(),
        summary.numeric_count.to_string().green(),
        summary.text_count.to_string().yellow(),
        summary.date_count.to_string().blue()
    );
    println!();

    println!("{}", "Columns:".yellow().bold());
    for name in &session.table().headers {
        let kind = classification.kind_of(name);
        let label = match kind {
            Some(ColumnKind::Numeric) => "numeric".green(),
            Some(ColumnKind::Text) => "text".yellow(),
            Some(ColumnKind::Date) => "date".blue(),
            None => "unknown".dimmed(),
        };
        let detail = match kind {
            Some(ColumnKind::Numeric) => summary
                .numeric
                .iter()
                .find(|n| &n.column == name)
                .map(|n| format!("n={} mean={}", n.count, fmt_number(n.mean))),
            Some(ColumnKind::Text) => summary
                .text
                .iter()
                .find(|t| &t.column == name)
                .map(|t| format!("{} unique", t.unique)),
            Some(ColumnKind::Date) => summary.date.iter().find(|d| &d.column == name).map(|d| {
                format!(
                    "{} to {}",
                    d.earliest.as_deref().unwrap_or("?"),
                    d.latest.as_deref().unwrap_or("?")
                )
            }),
            None => None,
        };
        println!("  {:24} {:8} {}", name, label, detail.unwrap_or_default());
    }

    println!();
    if summary.is_complete() {
        println!("{}", "No missing values".green());
    } else {
        println!("{}", "Missing values:".yellow().bold());
        for missing in &summary.missing {
            println!(
                "  {:24} {:>6} ({:.1}%)",
                missing.column,
                missing.count.to_string().red(),
                missing.percent
            );
        }
    }

    Ok(())
}
