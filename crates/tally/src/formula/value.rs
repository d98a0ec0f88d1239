//! Runtime values and elementwise arithmetic.

use super::error::FormulaError;
use super::parser::BinaryOp;

/// A formula value: a single number or a column of numbers.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Scalar(f64),
    Series(Vec<f64>),
}

impl Value {
    /// Apply a unary function to every element.
    pub fn map(self, f: impl Fn(f64) -> f64) -> Value {
        match self {
            Value::Scalar(v) => Value::Scalar(f(v)),
            Value::Series(vs) => Value::Series(vs.into_iter().map(f).collect()),
        }
    }

    /// Combine two values elementwise, broadcasting a scalar over a series.
    pub fn zip_with(
        self,
        other: Value,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Value, FormulaError> {
        Ok(match (self, other) {
            (Value::Scalar(a), Value::Scalar(b)) => Value::Scalar(f(a, b)),
            (Value::Scalar(a), Value::Series(ys)) => {
                Value::Series(ys.into_iter().map(|b| f(a, b)).collect())
            }
            (Value::Series(xs), Value::Scalar(b)) => {
                Value::Series(xs.into_iter().map(|a| f(a, b)).collect())
            }
            (Value::Series(xs), Value::Series(ys)) => {
                if xs.len() != ys.len() {
                    return Err(FormulaError::Shape {
                        left: xs.len(),
                        right: ys.len(),
                    });
                }
                Value::Series(xs.into_iter().zip(ys).map(|(a, b)| f(a, b)).collect())
            }
        })
    }

    /// Evaluate a binary operator.
    pub fn binary(self, op: BinaryOp, other: Value) -> Result<Value, FormulaError> {
        if let (Value::Scalar(a), Value::Scalar(b)) = (&self, &other) {
            let divides = matches!(op, BinaryOp::Divide | BinaryOp::Modulo);
            if (divides && *b == 0.0) || (op == BinaryOp::Power && *a == 0.0 && *b < 0.0) {
                return Err(FormulaError::DivisionByZero);
            }
        }
        self.zip_with(other, |a, b| apply(op, a, b))
    }
}

fn apply(op: BinaryOp, a: f64, b: f64) -> f64 {
    let truth = |t: bool| if t { 1.0 } else { 0.0 };
    match op {
        BinaryOp::Add => a + b,
        BinaryOp::Subtract => a - b,
        BinaryOp::Multiply => a * b,
        BinaryOp::Divide => a / b,
        BinaryOp::Modulo => floor_mod(a, b),
        BinaryOp::Power => a.powf(b),
        BinaryOp::Equals => truth(a == b),
        BinaryOp::NotEquals => truth(a != b),
        BinaryOp::Less => truth(a < b),
        BinaryOp::LessEquals => truth(a <= b),
        BinaryOp::Greater => truth(a > b),
        BinaryOp::GreaterEquals => truth(a >= b),
    }
}

/// Remainder taking the sign of the divisor.
fn floor_mod(a: f64, b: f64) -> f64 {
    if b == 0.0 {
        return f64::NAN;
    }
    let r = a % b;
    if r != 0.0 && (r < 0.0) != (b < 0.0) {
        r + b
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_scalar_over_series() {
        let result = Value::Scalar(10.0)
            .binary(BinaryOp::Subtract, Value::Series(vec![1.0, 2.0]))
            .unwrap();
        assert_eq!(result, Value::Series(vec![9.0, 8.0]));
    }

    #[test]
    fn test_series_length_mismatch() {
        let err = Value::Series(vec![1.0])
            .binary(BinaryOp::Add, Value::Series(vec![1.0, 2.0]))
            .unwrap_err();
        assert_eq!(err, FormulaError::Shape { left: 1, right: 2 });
    }

    #[test]
    fn test_scalar_division_by_zero_is_error() {
        assert_eq!(
            Value::Scalar(1.0).binary(BinaryOp::Divide, Value::Scalar(0.0)),
            Err(FormulaError::DivisionByZero)
        );
        assert_eq!(
            Value::Scalar(1.0).binary(BinaryOp::Modulo, Value::Scalar(0.0)),
            Err(FormulaError::DivisionByZero)
        );
    }

    #[test]
    fn test_series_division_by_zero_is_ieee() {
        let Value::Series(vs) = Value::Series(vec![1.0, 0.0])
            .binary(BinaryOp::Divide, Value::Scalar(0.0))
            .unwrap()
        else {
            panic!("expected series");
        };
        assert!(vs[0].is_infinite());
        assert!(vs[1].is_nan());
    }

    #[test]
    fn test_floor_mod_sign_follows_divisor() {
        assert_eq!(floor_mod(7.0, 3.0), 1.0);
        assert_eq!(floor_mod(-7.0, 3.0), 2.0);
        assert_eq!(floor_mod(7.0, -3.0), -2.0);
    }

    #[test]
    fn test_comparisons_yield_flags() {
        let result = Value::Series(vec![1.0, 5.0])
            .binary(BinaryOp::Greater, Value::Scalar(2.0))
            .unwrap();
        assert_eq!(result, Value::Series(vec![0.0, 1.0]));
    }
}
