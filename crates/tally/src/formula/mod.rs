//! Custom formula engine.
//!
//! Formulas are arithmetic over aliased columns:
//!
//! ```
//! use tally::formula::{AliasMap, FormulaEngine, FormulaResult};
//! use tally::DataTable;
//!
//! let table = DataTable::from_columns(vec![
//!     ("revenue", vec!["100", "200"]),
//!     ("cost", vec!["50", "50"]),
//! ]);
//! let mut aliases = AliasMap::new();
//! aliases.insert("rev".into(), "revenue".into());
//! aliases.insert("cost".into(), "cost".into());
//!
//! let result = FormulaEngine::new().evaluate("sum(rev) - sum(cost)", &aliases, &table);
//! assert_eq!(result, FormulaResult::Scalar { value: 200.0 });
//! ```

mod engine;
mod error;
mod functions;
mod lexer;
mod parser;
mod result;
mod value;

use indexmap::IndexMap;

pub use engine::{FormulaConfig, FormulaEngine, MAX_DEPTH_LIMIT};
pub use error::FormulaError;
pub use functions::{Builtin, FUNCTION_NAMES};
pub use parser::{parse, BinaryOp, Expr, UnaryOp};
pub use result::FormulaResult;
pub use value::Value;

/// Alias → column name, in the order the user declared them.
pub type AliasMap = IndexMap<String, String>;
