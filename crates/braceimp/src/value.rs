use std::cmp::Ordering;

use crate::{
    error::RuntimeError,
    expr::{BinaryOperator, RelationalOperator},
    util::SourceSpan,
};

/// Longest string a `+` or `*` may produce, in bytes.
pub const MAX_STRING_LEN: usize = 1 << 30;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Type {
    Integer,
    Float,
    String,
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Integer => write!(f, "integer"),
            Type::Float => write!(f, "float"),
            Type::String => write!(f, "string"),
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum Value {
    Integer(i64),
    Float(f64),
    String(String),
}

/// Unassigned variables read as integer zero.
impl Default for Value {
    fn default() -> Self {
        Value::Integer(0)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(x) if x.is_nan() => write!(f, "nan"),
            // Shortest round-trip form: `3.0`, `0.1`, `1e16`, `1e-5`
            Value::Float(x) => write!(f, "{:?}", x),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl Value {
    pub fn get_type(&self) -> Type {
        match self {
            Value::Integer(_) => Type::Integer,
            Value::Float(_) => Type::Float,
            Value::String(_) => Type::String,
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(x) => Some(*x),
            Value::String(_) => None,
        }
    }

    fn type_error(&self, other: &Value, op: impl ToString, span: SourceSpan) -> RuntimeError {
        RuntimeError::TypeError {
            op: op.to_string(),
            left: self.get_type(),
            right: other.get_type(),
            line: span.line,
            span,
        }
    }

    /// Applies an arithmetic operator. `span` locates the operator token.
    ///
    /// Integer `+ - *` stays integral and reports overflow; any float operand
    /// makes the result a float. `/` always divides as floats. Strings support
    /// `+` with another string and `*` with an integer count; every other mix
    /// of types is a type error.
    pub fn binary_operation(
        self,
        rhs: Value,
        op: BinaryOperator,
        span: SourceSpan,
    ) -> Result<Value, RuntimeError> {
        let overflow = || RuntimeError::Overflow {
            op,
            line: span.line,
            span,
        };

        match (op, &self, &rhs) {
            (BinaryOperator::Add, Value::Integer(a), Value::Integer(b)) => {
                a.checked_add(*b).map(Value::Integer).ok_or_else(overflow)
            }
            (BinaryOperator::Sub, Value::Integer(a), Value::Integer(b)) => {
                a.checked_sub(*b).map(Value::Integer).ok_or_else(overflow)
            }
            (BinaryOperator::Mul, Value::Integer(a), Value::Integer(b)) => {
                a.checked_mul(*b).map(Value::Integer).ok_or_else(overflow)
            }
            (BinaryOperator::Add, Value::String(a), Value::String(b)) => {
                check_string_len(Some(a.len() + b.len()), op, span)?;
                Ok(Value::String(format!("{}{}", a, b)))
            }
            (BinaryOperator::Mul, Value::String(s), Value::Integer(count))
            | (BinaryOperator::Mul, Value::Integer(count), Value::String(s)) => {
                let count = usize::try_from(*count).unwrap_or(0);
                check_string_len(s.len().checked_mul(count), op, span)?;
                Ok(Value::String(s.repeat(count)))
            }
            _ => {
                let (Some(a), Some(b)) = (self.as_number(), rhs.as_number()) else {
                    return Err(self.type_error(&rhs, op, span));
                };

                Ok(Value::Float(match op {
                    BinaryOperator::Add => a + b,
                    BinaryOperator::Sub => a - b,
                    BinaryOperator::Mul => a * b,
                    BinaryOperator::Div => {
                        if b == 0.0 {
                            return Err(RuntimeError::DivisionByZero {
                                line: span.line,
                                span,
                            });
                        }
                        a / b
                    }
                }))
            }
        }
    }

    /// Numeric ordering that stays exact when an integer meets a float.
    fn compare_numbers(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Integer(a), Value::Float(b)) => compare_int_float(*a, *b),
            (Value::Float(a), Value::Integer(b)) => {
                compare_int_float(*b, *a).map(Ordering::reverse)
            }
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            _ => None,
        }
    }

    fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::String(_), _) | (_, Value::String(_)) => false,
            _ => self.compare_numbers(other) == Some(Ordering::Equal),
        }
    }

    fn ordering(
        &self,
        other: &Value,
        op: RelationalOperator,
        span: SourceSpan,
    ) -> Result<Option<Ordering>, RuntimeError> {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Ok(Some(a.cmp(b))),
            (Value::String(_), _) | (_, Value::String(_)) => {
                Err(self.type_error(other, op, span))
            }
            _ => Ok(self.compare_numbers(other)),
        }
    }

    /// Reduces `self <op> rhs` to a boolean.
    ///
    /// `>=` tests the right operand against the left, so `3 >= 5` holds
    /// exactly when `3 <= 5` does.
    pub fn relational_operation(
        &self,
        rhs: &Value,
        op: RelationalOperator,
        span: SourceSpan,
    ) -> Result<bool, RuntimeError> {
        Ok(match op {
            RelationalOperator::Eq => self.equals(rhs),
            RelationalOperator::Neq => !self.equals(rhs),
            RelationalOperator::Lt => self.ordering(rhs, op, span)? == Some(Ordering::Less),
            RelationalOperator::Gt => self.ordering(rhs, op, span)? == Some(Ordering::Greater),
            RelationalOperator::Lte => matches!(
                self.ordering(rhs, op, span)?,
                Some(Ordering::Less | Ordering::Equal)
            ),
            // right >= left
            RelationalOperator::Gte => matches!(
                self.ordering(rhs, op, span)?,
                Some(Ordering::Less | Ordering::Equal)
            ),
        })
    }
}

fn check_string_len(
    len: Option<usize>,
    op: BinaryOperator,
    span: SourceSpan,
) -> Result<(), RuntimeError> {
    match len {
        Some(len) if len <= MAX_STRING_LEN => Ok(()),
        _ => Err(RuntimeError::StringTooLong {
            op,
            limit: MAX_STRING_LEN,
            line: span.line,
            span,
        }),
    }
}

/// Compares `a` with `b` without rounding `a` to a float first.
fn compare_int_float(a: i64, b: f64) -> Option<Ordering> {
    // 2^63, the first float above every i64
    const BOUND: f64 = 9_223_372_036_854_775_808.0;

    if b.is_nan() {
        return None;
    }
    if b >= BOUND {
        return Some(Ordering::Less);
    }
    if b < -BOUND {
        return Some(Ordering::Greater);
    }

    let whole = b.trunc();
    // In range, so the cast is exact
    match a.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0f64.partial_cmp(&(b - whole)),
        unequal => Some(unequal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> SourceSpan {
        SourceSpan::new(1, 0..1)
    }

    fn apply(
        lhs: impl Into<Value>,
        op: BinaryOperator,
        rhs: impl Into<Value>,
    ) -> Result<Value, RuntimeError> {
        lhs.into().binary_operation(rhs.into(), op, span())
    }

    fn compare(
        lhs: impl Into<Value>,
        op: RelationalOperator,
        rhs: impl Into<Value>,
    ) -> Result<bool, RuntimeError> {
        lhs.into().relational_operation(&rhs.into(), op, span())
    }

    #[test]
    fn test_integer_arithmetic_stays_integral() {
        assert_eq!(apply(2i64, BinaryOperator::Add, 3i64), Ok(Value::Integer(5)));
        assert_eq!(apply(2i64, BinaryOperator::Sub, 3i64), Ok(Value::Integer(-1)));
        assert_eq!(apply(4i64, BinaryOperator::Mul, 3i64), Ok(Value::Integer(12)));
    }

    #[test]
    fn test_division_is_always_float() {
        assert_eq!(apply(7i64, BinaryOperator::Div, 2i64), Ok(Value::Float(3.5)));
        assert_eq!(apply(6i64, BinaryOperator::Div, 2i64), Ok(Value::Float(3.0)));
        assert_eq!(apply(6i64, BinaryOperator::Div, 2i64).unwrap().to_string(), "3.0");
    }

    #[test]
    fn test_mixed_numbers_promote_to_float() {
        assert_eq!(apply(1.5, BinaryOperator::Add, 1i64), Ok(Value::Float(2.5)));
        assert_eq!(apply(2i64, BinaryOperator::Mul, 0.5), Ok(Value::Float(1.0)));
    }

    #[test]
    fn test_division_by_zero() {
        assert!(matches!(
            apply(1i64, BinaryOperator::Div, 0i64),
            Err(RuntimeError::DivisionByZero { line: 1, .. })
        ));
    }

    #[test]
    fn test_integer_overflow_is_an_error() {
        assert!(matches!(
            apply(i64::MAX, BinaryOperator::Add, 1i64),
            Err(RuntimeError::Overflow {
                op: BinaryOperator::Add,
                ..
            })
        ));
    }

    #[test]
    fn test_string_operations() {
        assert_eq!(apply("ab", BinaryOperator::Add, "cd"), Ok(Value::from("abcd")));
        assert_eq!(apply("ab", BinaryOperator::Mul, 3i64), Ok(Value::from("ababab")));
        assert_eq!(apply(2i64, BinaryOperator::Mul, "x"), Ok(Value::from("xx")));
        assert_eq!(apply("x", BinaryOperator::Mul, -1i64), Ok(Value::from("")));
    }

    #[test]
    fn test_incompatible_operands_are_type_errors() {
        assert_eq!(
            apply("a", BinaryOperator::Add, 1i64),
            Err(RuntimeError::TypeError {
                op: "+".to_string(),
                left: Type::String,
                right: Type::Integer,
                line: 1,
                span: span(),
            })
        );
        assert!(matches!(
            apply("a", BinaryOperator::Sub, "b"),
            Err(RuntimeError::TypeError { .. })
        ));
        assert!(matches!(
            apply("a", BinaryOperator::Mul, 1.5),
            Err(RuntimeError::TypeError { .. })
        ));
        assert!(matches!(
            apply("a", BinaryOperator::Div, "b"),
            Err(RuntimeError::TypeError { .. })
        ));
    }

    #[test]
    fn test_equality_never_errors() {
        assert_eq!(compare(1i64, RelationalOperator::Eq, 1i64), Ok(true));
        assert_eq!(compare(3i64, RelationalOperator::Eq, 3.0), Ok(true));
        assert_eq!(compare(1i64, RelationalOperator::Eq, "1"), Ok(false));
        assert_eq!(compare("a", RelationalOperator::Neq, "b"), Ok(true));
    }

    #[test]
    fn test_ordering_comparisons() {
        assert_eq!(compare(1i64, RelationalOperator::Lt, 2i64), Ok(true));
        assert_eq!(compare(2i64, RelationalOperator::Gt, 2i64), Ok(false));
        assert_eq!(compare(2i64, RelationalOperator::Lte, 2i64), Ok(true));
        assert_eq!(compare("abc", RelationalOperator::Lt, "abd"), Ok(true));
        assert_eq!(compare(2.5, RelationalOperator::Gt, 2i64), Ok(true));
        assert!(matches!(
            compare("a", RelationalOperator::Lt, 1i64),
            Err(RuntimeError::TypeError { .. })
        ));
    }

    #[test]
    fn test_gte_compares_right_against_left() {
        assert_eq!(compare(3i64, RelationalOperator::Gte, 5i64), Ok(true));
        assert_eq!(compare(5i64, RelationalOperator::Gte, 3i64), Ok(false));
        assert_eq!(compare(4i64, RelationalOperator::Gte, 4i64), Ok(true));
        assert_eq!(
            compare(3i64, RelationalOperator::Gte, 5i64),
            compare(3i64, RelationalOperator::Lte, 5i64)
        );
    }

    #[test]
    fn test_string_growth_is_bounded() {
        assert!(matches!(
            apply("ab", BinaryOperator::Mul, 4_000_000_000_000_000_000i64),
            Err(RuntimeError::StringTooLong { op: BinaryOperator::Mul, .. })
        ));
        assert!(matches!(
            apply(i64::MAX, BinaryOperator::Mul, "x"),
            Err(RuntimeError::StringTooLong { .. })
        ));
    }

    #[test]
    fn test_integer_float_comparison_is_exact() {
        // 2^53 + 1 has no f64 representation
        let big = 9_007_199_254_740_993i64;
        let rounded = 9_007_199_254_740_992.0;
        assert_eq!(compare(big, RelationalOperator::Eq, rounded), Ok(false));
        assert_eq!(compare(big, RelationalOperator::Gt, rounded), Ok(true));
        assert_eq!(compare(rounded, RelationalOperator::Lt, big), Ok(true));
        assert_eq!(compare(big - 1, RelationalOperator::Eq, rounded), Ok(true));

        assert_eq!(compare(2i64, RelationalOperator::Lt, 2.5), Ok(true));
        assert_eq!(compare(-3i64, RelationalOperator::Lt, -2.5), Ok(true));
        assert_eq!(compare(-2i64, RelationalOperator::Gt, -2.5), Ok(true));
        assert_eq!(compare(i64::MAX, RelationalOperator::Lt, 1e19), Ok(true));
        assert_eq!(compare(i64::MIN, RelationalOperator::Gt, -1e19), Ok(true));
        assert_eq!(compare(1i64, RelationalOperator::Eq, f64::NAN), Ok(false));
        assert_eq!(compare(1i64, RelationalOperator::Lt, f64::NAN), Ok(false));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Integer(-4).to_string(), "-4");
        assert_eq!(Value::Float(3.5).to_string(), "3.5");
        assert_eq!(Value::Float(1e15).to_string(), "1000000000000000.0");
        assert_eq!(Value::Float(1e16).to_string(), "1e16");
        assert_eq!(Value::Float(1e17).to_string(), "1e17");
        assert_eq!(Value::Float(2.5e16).to_string(), "2.5e16");
        assert_eq!(Value::Float(1e-5).to_string(), "1e-5");
        assert_eq!(Value::Float(f64::INFINITY).to_string(), "inf");
        assert_eq!(Value::Float(f64::NAN).to_string(), "nan");
        assert_eq!(Value::Float(0.1 + 0.2).to_string(), "0.30000000000000004");
        assert_eq!(Value::from("hi").to_string(), "hi");
        assert_eq!(Value::default().to_string(), "0");
    }
}
