//! Top-level configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TallyError};
use crate::formula::{FormulaConfig, MAX_DEPTH_LIMIT};
use crate::input::ParserConfig;
use crate::telemetry::TelemetryConfig;

/// Settings for every component, loadable from a JSON file.
///
/// Sections and fields left out of the file keep their defaults:
///
/// ```json
/// {
///   "parser": { "delimiter": 59 },
///   "formula": { "max_length": 256 },
///   "telemetry": { "endpoint": "https://example.com/log" }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TallyConfig {
    pub parser: ParserConfig,
    pub formula: FormulaConfig,
    pub telemetry: TelemetryConfig,
}

impl TallyConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| TallyError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: TallyConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no component could work with.
    pub fn validate(&self) -> Result<()> {
        if self.formula.max_length == 0 {
            return Err(TallyError::Config(
                "formula.max_length must be greater than 0".to_string(),
            ));
        }
        if self.formula.max_depth == 0 || self.formula.max_depth > MAX_DEPTH_LIMIT {
            return Err(TallyError::Config(format!(
                "formula.max_depth must be between 1 and {}",
                MAX_DEPTH_LIMIT
            )));
        }
        if self.telemetry.timeout_ms == 0 {
            return Err(TallyError::Config(
                "telemetry.timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
