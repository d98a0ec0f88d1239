//! Partition of a table's columns into numeric, text and date sets.

use serde::{Deserialize, Serialize};

use super::types::ColumnKind;

/// Column names grouped by kind, each list in table order.
///
/// Every column of the classified table appears in exactly one list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnClassification {
    /// Numeric columns.
    pub numeric: Vec<String>,
    /// Text columns.
    pub text: Vec<String>,
    /// Date columns.
    pub date: Vec<String>,
}

impl ColumnClassification {
    /// Create an empty classification.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a column under the given kind.
    pub fn push(&mut self, name: impl Into<String>, kind: ColumnKind) {
        let name = name.into();
        match kind {
            ColumnKind::Numeric => self.numeric.push(name),
            ColumnKind::Text => self.text.push(name),
            ColumnKind::Date => self.date.push(name),
        }
    }

    /// Kind of a column, or None when the column was not classified.
    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        if self.numeric.iter().any(|c| c == name) {
            Some(ColumnKind::Numeric)
        } else if self.date.iter().any(|c| c == name) {
            Some(ColumnKind::Date)
        } else if self.text.iter().any(|c| c == name) {
            Some(ColumnKind::Text)
        } else {
            None
        }
    }

    /// Columns of one kind.
    pub fn columns(&self, kind: ColumnKind) -> &[String] {
        match kind {
            ColumnKind::Numeric => &self.numeric,
            ColumnKind::Text => &self.text,
            ColumnKind::Date => &self.date,
        }
    }

    /// Total number of classified columns.
    pub fn len(&self) -> usize {
        self.numeric.len() + self.text.len() + self.date.len()
    }

    /// Returns true if no columns were classified.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
