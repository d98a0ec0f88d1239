//! Chart specifications for an external renderer.

mod builder;
mod types;

pub use builder::ChartBuilder;
pub use types::{ChartData, ChartKind, ChartRequest, ChartSpec};
