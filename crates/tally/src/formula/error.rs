//! Formula evaluation failures.

use thiserror::Error;

/// Any failure while parsing or evaluating a formula.
///
/// These never escape [`super::FormulaEngine::evaluate`]; they are rendered
/// into [`super::FormulaResult::Error`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    #[error("formula is empty")]
    Empty,

    #[error("formula is too long ({length} characters, limit {limit})")]
    TooLong { length: usize, limit: usize },

    #[error("formula is nested too deeply (limit {limit})")]
    TooDeep { limit: usize },

    #[error("syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("name '{0}' is not defined")]
    UnknownName(String),

    #[error("function '{0}' is not allowed")]
    FunctionNotAllowed(String),

    #[error("'{0}' is a function and must be called")]
    FunctionNotCalled(String),

    #[error("{function}() takes {expected} but {given} given")]
    Arity {
        function: &'static str,
        expected: &'static str,
        given: usize,
    },

    #[error("{0}")]
    Type(String),

    #[error("operands could not be broadcast together with lengths {left} and {right}")]
    Shape { left: usize, right: usize },

    #[error("division by zero")]
    DivisionByZero,

    #[error("invalid alias '{alias}': {reason}")]
    InvalidAlias { alias: String, reason: String },
}
