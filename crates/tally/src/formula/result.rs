use serde::{Deserialize, Serialize};

use super::error::FormulaError;
use super::value::Value;

/// Outcome of one formula evaluation.
///
/// A column-valued result is summarised rather than returned whole: `value`
/// holds the mean, alongside `sum`, `count`, `min` and `max`. NaN elements
/// (for example `0 / 0` in a row) are left out of every summary field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormulaResult {
    Scalar {
        value: f64,
    },
    Series {
        value: f64,
        sum: f64,
        count: usize,
        min: f64,
        max: f64,
    },
    Error {
        message: String,
    },
}

impl FormulaResult {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Scalar(value) => FormulaResult::Scalar { value },
            Value::Series(values) => {
                let present: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
                let count = present.len();
                let sum: f64 = present.iter().sum();
                let (value, min, max) = if count == 0 {
                    (f64::NAN, f64::NAN, f64::NAN)
                } else {
                    (
                        sum / count as f64,
                        present.iter().copied().fold(f64::INFINITY, f64::min),
                        present.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                    )
                };
                FormulaResult::Series {
                    value,
                    sum,
                    count,
                    min,
                    max,
                }
            }
        }
    }

    pub fn from_error(error: &FormulaError) -> Self {
        FormulaResult::Error {
            message: error.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, FormulaResult::Error { .. })
    }

    /// The headline number: the scalar itself, or the mean of a series.
    pub fn value(&self) -> Option<f64> {
        match self {
            FormulaResult::Scalar { value } | FormulaResult::Series { value, .. } => Some(*value),
            FormulaResult::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            FormulaResult::Error { message } => Some(message),
            _ => None,
        }
    }
}

impl From<std::result::Result<Value, FormulaError>> for FormulaResult {
    fn from(outcome: std::result::Result<Value, FormulaError>) -> Self {
        match outcome {
            Ok(value) => FormulaResult::from_value(value),
            Err(error) => FormulaResult::from_error(&error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_summary() {
        let result = FormulaResult::from_value(Value::Series(vec![2.0, f64::NAN, 4.0, 6.0]));
        assert_eq!(
            result,
            FormulaResult::Series {
                value: 4.0,
                sum: 12.0,
                count: 3,
                min: 2.0,
                max: 6.0,
            }
        );
    }

    #[test]
    fn test_serialized_tag() {
        let json = serde_json::to_string(&FormulaResult::Scalar { value: 200.0 }).unwrap();
        assert_eq!(json, r#"{"kind":"scalar","value":200.0}"#);

        let err = FormulaResult::from_error(&FormulaError::DivisionByZero);
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"kind":"error","message":"division by zero"}"#);
    }

    #[test]
    fn test_empty_series_is_nan_summary() {
        let result = FormulaResult::from_value(Value::Series(Vec::new()));
        let FormulaResult::Series { value, count, sum, .. } = result else {
            panic!("expected series");
        };
        assert!(value.is_nan());
        assert_eq!(count, 0);
        assert_eq!(sum, 0.0);
    }
}
