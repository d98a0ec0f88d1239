//! Schema types for representing classified table structure.

mod classification;
mod summary;
mod types;

pub use classification::ColumnClassification;
pub use summary::{
    DatasetSummary, DateColumnSummary, MissingValues, NumericColumnSummary, TextColumnSummary,
};
pub use types::ColumnKind;
