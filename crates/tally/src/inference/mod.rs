//! Column classification and value coercion.

mod classifier;
pub mod coerce;

pub use classifier::ColumnClassifier;
pub use coerce::{number_or_zero, parse_date, parse_number};
