//! Sandboxed evaluation of user formulas over aliased columns.
//!
//! The scope of a formula is closed: the whitelisted functions from
//! [`super::functions`] plus the aliases the caller binds. Names are
//! resolved against that scope before anything runs, so a formula that
//! mentions anything else fails without evaluating a single node.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::inference::number_or_zero;
use crate::input::DataTable;

use super::error::FormulaError;
use super::functions::Builtin;
use super::parser::{parse, Expr, UnaryOp};
use super::result::FormulaResult;
use super::value::Value;
use super::AliasMap;

/// Upper bound on [`FormulaConfig::max_depth`]; larger settings are clamped.
pub const MAX_DEPTH_LIMIT: usize = 256;

/// Limits applied to every formula.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormulaConfig {
    /// Longest accepted formula, in characters.
    pub max_length: usize,
    /// Tallest accepted syntax tree. Every operator, call and sign adds a
    /// level, so `1+1+1` is three deep.
    pub max_depth: usize,
}

impl Default for FormulaConfig {
    fn default() -> Self {
        Self {
            max_length: 1024,
            max_depth: 64,
        }
    }
}

/// Evaluates formulas such as `sum(rev) - sum(cost)` against a table.
#[derive(Debug, Clone, Default)]
pub struct FormulaEngine {
    config: FormulaConfig,
}

type Scope = HashMap<String, Vec<f64>>;

impl FormulaEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FormulaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FormulaConfig {
        &self.config
    }

    /// Evaluate `formula` with each alias bound to its column.
    ///
    /// Never fails: every problem is reported as [`FormulaResult::Error`].
    pub fn evaluate(&self, formula: &str, aliases: &AliasMap, table: &DataTable) -> FormulaResult {
        let result = FormulaResult::from(self.try_evaluate(formula, aliases, table));
        debug!(formula, ?result, "Evaluated formula");
        result
    }

    /// Evaluate and return the raw value, or the first error encountered.
    pub fn try_evaluate(
        &self,
        formula: &str,
        aliases: &AliasMap,
        table: &DataTable,
    ) -> Result<Value, FormulaError> {
        let expr = self.check(formula)?;
        let scope = bind(aliases, table)?;
        resolve(&expr, &scope)?;
        eval(&expr, &scope)
    }

    /// Parse a formula without evaluating it.
    pub fn check(&self, formula: &str) -> Result<Expr, FormulaError> {
        let length = formula.chars().count();
        if length > self.config.max_length {
            return Err(FormulaError::TooLong {
                length,
                limit: self.config.max_length,
            });
        }
        parse(formula, self.config.max_depth.min(MAX_DEPTH_LIMIT))
    }
}

/// Bind every alias to its column, coercing cells to numbers with
/// unparseable and missing cells read as zero.
fn bind(aliases: &AliasMap, table: &DataTable) -> Result<Scope, FormulaError> {
    let mut scope = Scope::with_capacity(aliases.len());

    for (alias, column) in aliases {
        if !is_identifier(alias) {
            return Err(FormulaError::InvalidAlias {
                alias: alias.clone(),
                reason: "aliases must start with a letter or '_' and contain only letters, digits and '_'".to_string(),
            });
        }
        if Builtin::from_name(alias).is_some() {
            return Err(FormulaError::InvalidAlias {
                alias: alias.clone(),
                reason: "the name is reserved for a function".to_string(),
            });
        }
        let Some(index) = table.column_index(column) else {
            return Err(FormulaError::InvalidAlias {
                alias: alias.clone(),
                reason: format!("column '{column}' does not exist"),
            });
        };

        let values = table.column_values(index).map(number_or_zero).collect();
        scope.insert(alias.clone(), values);
    }

    Ok(scope)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Reject any name outside the scope before evaluation starts.
fn resolve(expr: &Expr, scope: &Scope) -> Result<(), FormulaError> {
    match expr {
        Expr::Number(_) => Ok(()),
        Expr::Name(name) => {
            if scope.contains_key(name) {
                Ok(())
            } else if Builtin::from_name(name).is_some() {
                Err(FormulaError::FunctionNotCalled(name.clone()))
            } else {
                Err(FormulaError::UnknownName(name.clone()))
            }
        }
        Expr::Call { name, args } => {
            let Some(builtin) = Builtin::from_name(name) else {
                return Err(FormulaError::FunctionNotAllowed(name.clone()));
            };
            builtin.check_arity(args.len())?;
            args.iter().try_for_each(|arg| resolve(arg, scope))
        }
        Expr::UnaryOp { expr, .. } => resolve(expr, scope),
        Expr::BinaryOp { left, right, .. } => {
            resolve(left, scope)?;
            resolve(right, scope)
        }
    }
}

fn eval(expr: &Expr, scope: &Scope) -> Result<Value, FormulaError> {
    match expr {
        Expr::Number(n) => Ok(Value::Scalar(*n)),
        Expr::Name(name) => scope
            .get(name)
            .map(|values| Value::Series(values.clone()))
            .ok_or_else(|| FormulaError::UnknownName(name.clone())),
        Expr::Call { name, args } => {
            let builtin =
                Builtin::from_name(name).ok_or_else(|| FormulaError::FunctionNotAllowed(name.clone()))?;
            let args = args
                .iter()
                .map(|arg| eval(arg, scope))
                .collect::<Result<Vec<_>, _>>()?;
            builtin.call(args)
        }
        Expr::UnaryOp { op, expr } => {
            let value = eval(expr, scope)?;
            Ok(match op {
                UnaryOp::Plus => value,
                UnaryOp::Negate => value.map(|v| -v),
            })
        }
        Expr::BinaryOp { op, left, right } => {
            let left = eval(left, scope)?;
            let right = eval(right, scope)?;
            left.binary(*op, right)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finance() -> DataTable {
        DataTable::from_columns(vec![
            ("revenue", vec!["100", "200"]),
            ("cost", vec!["50", "50"]),
        ])
    }

    fn aliases(pairs: &[(&str, &str)]) -> AliasMap {
        pairs
            .iter()
            .map(|(a, c)| (a.to_string(), c.to_string()))
            .collect()
    }

    #[test]
    fn test_profit_scalar() {
        let engine = FormulaEngine::new();
        let result = engine.evaluate(
            "sum(rev) - sum(cost)",
            &aliases(&[("rev", "revenue"), ("cost", "cost")]),
            &finance(),
        );
        assert_eq!(result, FormulaResult::Scalar { value: 200.0 });
    }

    #[test]
    fn test_elementwise_ratio_is_series() {
        let table = DataTable::from_columns(vec![
            ("x", vec!["2", "9", "4"]),
            ("y", vec!["1", "3", "4"]),
        ]);
        let result = FormulaEngine::new().evaluate("a / b", &aliases(&[("a", "x"), ("b", "y")]), &table);
        assert_eq!(
            result,
            FormulaResult::Series {
                value: 2.0,
                sum: 6.0,
                count: 3,
                min: 1.0,
                max: 3.0,
            }
        );
    }

    #[test]
    fn test_scalar_broadcast_over_series() {
        let result = FormulaEngine::new().evaluate(
            "rev / sum(rev) * 100",
            &aliases(&[("rev", "revenue")]),
            &finance(),
        );
        let FormulaResult::Series { min, max, count, .. } = result else {
            panic!("expected series, got {result:?}");
        };
        assert_eq!(count, 2);
        assert!((min - 100.0 / 3.0).abs() < 1e-9);
        assert!((max - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_cells_read_as_zero() {
        let table = DataTable::from_columns(vec![("sales", vec!["10", "", "abc", "5"])]);
        let engine = FormulaEngine::new();
        let map = aliases(&[("s", "sales")]);
        assert_eq!(engine.evaluate("sum(s)", &map, &table), FormulaResult::Scalar { value: 15.0 });
        assert_eq!(engine.evaluate("count(s)", &map, &table), FormulaResult::Scalar { value: 4.0 });
    }

    #[test]
    fn test_rejects_host_access() {
        let engine = FormulaEngine::new();
        let table = finance();
        for formula in [
            "__import__('os')",
            "__import__(1)",
            "open(1)",
            "eval(1)",
            "exit",
            "rev.__class__",
        ] {
            let result = engine.evaluate(formula, &AliasMap::new(), &table);
            assert!(result.is_error(), "{formula} should fail, got {result:?}");
        }
    }

    #[test]
    fn test_error_messages() {
        let engine = FormulaEngine::new();
        let table = finance();
        let none = AliasMap::new();

        assert_eq!(
            engine.evaluate("profit * 2", &none, &table).error_message(),
            Some("name 'profit' is not defined")
        );
        assert_eq!(
            engine.evaluate("system(1)", &none, &table).error_message(),
            Some("function 'system' is not allowed")
        );
        assert_eq!(
            engine.evaluate("1 / 0", &none, &table).error_message(),
            Some("division by zero")
        );
    }

    #[test]
    fn test_unknown_name_fails_before_evaluation() {
        // The division by zero is never reached.
        let result = FormulaEngine::new().evaluate("1 / 0 + ghost", &AliasMap::new(), &finance());
        assert_eq!(result.error_message(), Some("name 'ghost' is not defined"));
    }

    #[test]
    fn test_invalid_aliases() {
        let engine = FormulaEngine::new();
        let table = finance();
        for map in [
            aliases(&[("r", "missing_column")]),
            aliases(&[("sum", "revenue")]),
            aliases(&[("2r", "revenue")]),
            aliases(&[("r-1", "revenue")]),
        ] {
            assert!(engine.evaluate("1", &map, &table).is_error());
        }
    }

    #[test]
    fn test_unused_aliases_are_harmless() {
        let result = FormulaEngine::new().evaluate(
            "2 ** 3",
            &aliases(&[("rev", "revenue"), ("cost", "cost")]),
            &finance(),
        );
        assert_eq!(result, FormulaResult::Scalar { value: 8.0 });
    }

    #[test]
    fn test_comparison_flags_feed_arithmetic() {
        let result = FormulaEngine::new().evaluate(
            "sum(rev > 150)",
            &aliases(&[("rev", "revenue")]),
            &finance(),
        );
        assert_eq!(result, FormulaResult::Scalar { value: 1.0 });
    }

    #[test]
    fn test_length_and_depth_limits() {
        let engine = FormulaEngine::with_config(FormulaConfig {
            max_length: 16,
            max_depth: 4,
        });
        let table = finance();
        assert!(matches!(
            engine.try_evaluate("1 + 1 + 1 + 1 + 1 + 1", &AliasMap::new(), &table),
            Err(FormulaError::TooLong { length: 21, limit: 16 })
        ));
        assert!(matches!(
            engine.try_evaluate("((((((1))))))", &AliasMap::new(), &table),
            Err(FormulaError::TooDeep { limit: 4 })
        ));
    }

    #[test]
    fn test_long_chain_is_rejected_not_evaluated() {
        let engine = FormulaEngine::with_config(FormulaConfig {
            max_length: 40_000,
            max_depth: 64,
        });
        let chain = vec!["1"; 20_000].join("+");
        let result = engine.evaluate(&chain, &AliasMap::new(), &finance());
        assert_eq!(
            result.error_message(),
            Some("formula is nested too deeply (limit 64)")
        );

        let short = vec!["1"; 60].join("+");
        assert_eq!(
            engine.evaluate(&short, &AliasMap::new(), &finance()),
            FormulaResult::Scalar { value: 60.0 }
        );
    }

    #[test]
    fn test_depth_setting_is_clamped() {
        let engine = FormulaEngine::with_config(FormulaConfig {
            max_length: 1_000_000,
            max_depth: usize::MAX,
        });
        let chain = vec!["1"; 100_000].join("*");
        assert!(matches!(
            engine.try_evaluate(&chain, &AliasMap::new(), &finance()),
            Err(FormulaError::TooDeep { limit: MAX_DEPTH_LIMIT })
        ));
    }

    #[test]
    fn test_shape_mismatch_is_impossible_within_one_table() {
        let result = FormulaEngine::new().evaluate(
            "rev - cost",
            &aliases(&[("rev", "revenue"), ("cost", "cost")]),
            &finance(),
        );
        assert_eq!(result.value(), Some(100.0));
    }

    #[test]
    fn test_function_used_as_value() {
        let result = FormulaEngine::new().evaluate("sum + 1", &AliasMap::new(), &finance());
        assert_eq!(result.error_message(), Some("'sum' is a function and must be called"));
    }
}
