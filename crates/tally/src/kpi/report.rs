//! KPI export bundle.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TallyError};
use crate::input::SourceMetadata;

use super::growth::GrowthOutcome;
use super::types::{GroupedKpiResult, KpiResult};

/// Everything one KPI request produced, ready for export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiReport {
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceMetadata>,
    pub kpis: KpiResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grouped: Option<GroupedKpiResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub growth: Option<GrowthOutcome>,
}

impl KpiReport {
    /// Create a report from basic KPIs.
    pub fn new(kpis: KpiResult) -> Self {
        Self {
            generated_at: Utc::now(),
            source: None,
            kpis,
            grouped: None,
            growth: None,
        }
    }

    /// Attach source metadata.
    pub fn with_source(mut self, source: SourceMetadata) -> Self {
        self.source = Some(source);
        self
    }

    /// Attach grouped KPIs.
    pub fn with_grouped(mut self, grouped: GroupedKpiResult) -> Self {
        self.grouped = Some(grouped);
        self
    }

    /// Attach a growth rate.
    pub fn with_growth(mut self, growth: GrowthOutcome) -> Self {
        self.growth = Some(growth);
        self
    }

    /// Pretty-printed JSON. Non-finite numbers are written as `null`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save the report to a JSON file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    TallyError::Persistence(format!(
                        "Failed to create directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let file = File::create(path).map_err(|e| {
            TallyError::Persistence(format!(
                "Failed to create file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self).map_err(|e| {
            TallyError::Persistence(format!("Failed to serialize KPI report: {}", e))
        })?;

        Ok(())
    }
}
