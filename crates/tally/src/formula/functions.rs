//! The fixed set of callable functions.

use super::error::FormulaError;
use super::value::Value;

/// A whitelisted function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Builtin {
    Sum,
    Mean,
    Median,
    Std,
    Min,
    Max,
    Count,
    Sqrt,
    Abs,
    Round,
}

/// Every callable name. Nothing outside this list can be invoked.
pub const FUNCTION_NAMES: &[&str] = &[
    "sum", "mean", "median", "std", "min", "max", "count", "sqrt", "abs", "round",
];

impl Builtin {
    /// Look up a function by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "sum" => Builtin::Sum,
            "mean" => Builtin::Mean,
            "median" => Builtin::Median,
            "std" => Builtin::Std,
            "min" => Builtin::Min,
            "max" => Builtin::Max,
            "count" => Builtin::Count,
            "sqrt" => Builtin::Sqrt,
            "abs" => Builtin::Abs,
            "round" => Builtin::Round,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Sum => "sum",
            Builtin::Mean => "mean",
            Builtin::Median => "median",
            Builtin::Std => "std",
            Builtin::Min => "min",
            Builtin::Max => "max",
            Builtin::Count => "count",
            Builtin::Sqrt => "sqrt",
            Builtin::Abs => "abs",
            Builtin::Round => "round",
        }
    }

    /// Check the argument count before anything is evaluated.
    pub fn check_arity(&self, given: usize) -> Result<(), FormulaError> {
        let (ok, expected) = match self {
            Builtin::Min | Builtin::Max => (given >= 1, "at least 1 argument"),
            Builtin::Round => ((1..=2).contains(&given), "1 or 2 arguments"),
            _ => (given == 1, "exactly 1 argument"),
        };
        if ok {
            Ok(())
        } else {
            Err(FormulaError::Arity {
                function: self.name(),
                expected,
                given,
            })
        }
    }

    /// Apply the function to evaluated arguments.
    pub fn call(&self, mut args: Vec<Value>) -> Result<Value, FormulaError> {
        self.check_arity(args.len())?;

        match self {
            Builtin::Min | Builtin::Max if args.len() > 1 => {
                let pick = if *self == Builtin::Min { f64::min } else { f64::max };
                let mut acc = args.remove(0);
                for arg in args {
                    acc = acc.zip_with(arg, pick)?;
                }
                Ok(acc)
            }
            Builtin::Sqrt => Ok(args.remove(0).map(f64::sqrt)),
            Builtin::Abs => Ok(args.remove(0).map(f64::abs)),
            Builtin::Round => {
                let digits = match args.get(1) {
                    None => 0,
                    Some(Value::Scalar(d)) if d.fract() == 0.0 && d.abs() <= 300.0 => *d as i32,
                    Some(Value::Scalar(_)) => {
                        return Err(FormulaError::Type(
                            "round() digits must be a whole number".to_string(),
                        ));
                    }
                    Some(Value::Series(_)) => {
                        return Err(FormulaError::Type(
                            "round() digits must be a single number, not a column".to_string(),
                        ));
                    }
                };
                Ok(args.remove(0).map(|v| round_half_even(v, digits)))
            }
            aggregate => {
                let reduced = match args.remove(0) {
                    Value::Scalar(v) => match aggregate {
                        Builtin::Std => 0.0,
                        Builtin::Count => 1.0,
                        _ => v,
                    },
                    Value::Series(values) => reduce(*aggregate, &values),
                };
                Ok(Value::Scalar(reduced))
            }
        }
    }
}

/// Reduce a column to one number. NaN elements are skipped except by
/// `count`, which counts every element.
fn reduce(function: Builtin, values: &[f64]) -> f64 {
    if function == Builtin::Count {
        return values.len() as f64;
    }

    let mut present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    let n = present.len();

    match function {
        Builtin::Sum => present.iter().sum(),
        Builtin::Mean if n > 0 => present.iter().sum::<f64>() / n as f64,
        Builtin::Median if n > 0 => {
            present.sort_by(f64::total_cmp);
            if n % 2 == 1 {
                present[n / 2]
            } else {
                (present[n / 2 - 1] + present[n / 2]) / 2.0
            }
        }
        Builtin::Std if n > 1 => {
            let mean = present.iter().sum::<f64>() / n as f64;
            let ss: f64 = present.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        }
        Builtin::Min if n > 0 => present.iter().copied().fold(f64::INFINITY, f64::min),
        Builtin::Max if n > 0 => present.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        _ => f64::NAN,
    }
}

/// Round to `digits` decimals, ties to even.
fn round_half_even(value: f64, digits: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    if digits == 0 {
        return value.round_ties_even();
    }
    let scale = 10f64.powi(digits);
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round_ties_even() / scale
}
