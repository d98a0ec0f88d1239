//! Chart command - build a renderer-agnostic chart specification.

use std::fs;
use std::path::PathBuf;

use colored::Colorize;
use tally::{ChartKind, ChartRequest, Tally};

use super::load;

#[allow(clippy::too_many_arguments)]
pub fn run(
    tally: &Tally,
    file: PathBuf,
    kind: ChartKind,
    x: Option<String>,
    y: Option<String>,
    color: Option<String>,
    size: Option<String>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = load(tally, &file)?;

    let mut request = ChartRequest::new(kind);
    if let Some(x) = x {
        request = request.x(x);
    }
    if let Some(y) = y {
        request = request.y(y);
    }
    if let Some(color) = color {
        request = request.color(color);
    }
    if let Some(size) = size {
        request = request.size(size);
    }

    let spec = session.chart(&request)?;
    let json = serde_json::to_string_pretty(&spec)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, json)?;
            eprintln!(
                "{} {} -> {}",
                "Wrote".green().bold(),
                spec.title,
                path.display()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}
