//! CLI command implementations.

pub mod chart;
pub mod formula;
pub mod kpi;
pub mod profile;

use std::path::Path;

use tally::{Session, Tally, TallyConfig};

/// Build a Tally from the optional config file and flag overrides.
pub fn build_tally(
    config_path: Option<&Path>,
    telemetry_endpoint: Option<String>,
) -> Result<Tally, Box<dyn std::error::Error>> {
    let mut config = match config_path {
        Some(path) => TallyConfig::load(path)?,
        None => TallyConfig::default(),
    };
    if telemetry_endpoint.is_some() {
        config.telemetry.endpoint = telemetry_endpoint;
    }
    Ok(Tally::with_config(config))
}

/// Load a data file, failing early with a readable message when it is absent.
pub fn load(tally: &Tally, file: &Path) -> Result<Session, Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }
    Ok(tally.load(file)?)
}

/// Format a KPI number, showing non-finite values as "n/a".
pub fn fmt_number(value: f64) -> String {
    if value.is_finite() {
        format!("{:.2}", value)
    } else {
        "n/a".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_build_tally_flag_overrides_config() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"telemetry": {"endpoint": "http://localhost:1/log"}, "formula": {"max_length": 10}}"#)
            .unwrap();

        let tally = build_tally(Some(file.path()), Some("http://localhost:2/log".into())).unwrap();
        assert_eq!(
            tally.config().telemetry.endpoint.as_deref(),
            Some("http://localhost:2/log")
        );
        assert_eq!(tally.config().formula.max_length, 10);

        let tally = build_tally(Some(file.path()), None).unwrap();
        assert_eq!(
            tally.config().telemetry.endpoint.as_deref(),
            Some("http://localhost:1/log")
        );
    }

    #[test]
    fn test_load_missing_file() {
        let tally = build_tally(None, None).unwrap();
        let err = load(&tally, Path::new("/nonexistent/data.csv")).err().unwrap();
        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn test_fmt_number() {
        assert_eq!(fmt_number(1234.5), "1234.50");
        assert_eq!(fmt_number(f64::NAN), "n/a");
        assert_eq!(fmt_number(f64::INFINITY), "n/a");
    }
}
