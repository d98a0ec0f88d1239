//! Tally CLI - KPIs and custom formulas for tabular data.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let tally = match commands::build_tally(cli.config.as_deref(), cli.telemetry_endpoint) {
        Ok(tally) => tally,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Profile { file, json } => commands::profile::run(&tally, file, json),

        Commands::Kpi {
            file,
            columns,
            group_by,
            date,
            output,
            grouped_csv,
            json,
        } => commands::kpi::run(
            &tally,
            commands::kpi::KpiArgs {
                file,
                columns,
                group_by,
                date,
                output,
                grouped_csv,
                json,
            },
        ),

        Commands::Formula {
            file,
            formula,
            aliases,
            json,
        } => commands::formula::run(&tally, file, formula, aliases, json),

        Commands::Chart {
            file,
            kind,
            x,
            y,
            color,
            size,
            output,
        } => commands::chart::run(&tally, file, kind, x, y, color, size, output),
    };

    // Usage events are sent on background threads that die with the process.
    tally.flush_usage();

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr. `RUST_LOG` wins; otherwise warnings, or debug with --verbose.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
