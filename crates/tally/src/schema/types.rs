//! Core type definitions for column classification.

use serde::{Deserialize, Serialize};

/// The kind a column is classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Every non-missing value is a number.
    Numeric,
    /// Free or categorical text; the fallback kind.
    Text,
    /// Every non-missing value is a calendar date or date-time.
    Date,
}

impl ColumnKind {
    /// Returns true if this kind is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnKind::Numeric)
    }

    /// Returns true if this kind is temporal.
    pub fn is_temporal(&self) -> bool {
        matches!(self, ColumnKind::Date)
    }

    /// Lowercase display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Text => "text",
            ColumnKind::Date => "date",
        }
    }
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
