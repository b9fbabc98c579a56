//! The dynamically typed value carried on every stack.

use std::cmp::Ordering;
use std::fmt;

use crate::error::CodeException;

/// A dynamically typed value: integer, float, boolean, or string.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl Default for Value {
    /// A missing value (empty stack pop) materializes as `Int(0)`.
    fn default() -> Self {
        Value::Int(0)
    }
}

impl Value {
    /// `0`, `0.0`, `false`, and `""` are false; everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Bool(b) => *b,
            Value::Str(s) => !s.is_empty(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_) | Value::Bool(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    /// Widens to `f64` for numeric types (booleans count as 0/1).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Str(_) => None,
        }
    }

    /// Narrows to `i64` for numeric types (booleans count as 0/1, floats
    /// truncate toward zero).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Float(f) => Some(*f as i64),
            Value::Bool(b) => Some(if *b { 1 } else { 0 }),
            Value::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Whether both operands are numeric and at least one is a `Float`,
    /// meaning arithmetic between them should widen to `Float`.
    fn wants_float(a: &Value, b: &Value) -> bool {
        matches!(a, Value::Float(_)) || matches!(b, Value::Float(_))
    }

    /// `Int(n) == Float(n) == Bool(n != 0)`; strings only equal strings.
    pub fn values_equal(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Str(x), Value::Str(y)) => x == y,
            (Value::Str(_), _) | (_, Value::Str(_)) => false,
            _ => a.as_f64() == b.as_f64(),
        }
    }

    /// Orders two values: numerics compare numerically, strings compare
    /// lexicographically; mixing a string with a numeric is a type error.
    pub fn compare(a: &Value, b: &Value) -> Result<Ordering, CodeException> {
        match (a, b) {
            (Value::Str(x), Value::Str(y)) => Ok(x.cmp(y)),
            (Value::Str(_), _) | (_, Value::Str(_)) => Err(CodeException::TypeMismatch(format!(
                "can't compare {} with {}",
                a.type_name(),
                b.type_name()
            ))),
            _ => a
                .as_f64()
                .unwrap()
                .partial_cmp(&b.as_f64().unwrap())
                .ok_or_else(|| CodeException::TypeMismatch("NaN is not ordered".into())),
        }
    }

    /// Narrows to `i64` for the bitwise operators, which (unlike the
    /// arithmetic ones) don't accept floats.
    pub fn as_bitwise_int(&self) -> Result<i64, CodeException> {
        match self {
            Value::Int(n) => Ok(*n),
            Value::Bool(b) => Ok(if *b { 1 } else { 0 }),
            other => Err(CodeException::TypeMismatch(format!(
                "bitwise operators need an integer, got {}",
                other.type_name()
            ))),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
        }
    }

    /// `+`: numeric addition widening to float, or string concatenation.
    /// A string and a numeric operand is a type error.
    pub fn add(y: Value, x: Value) -> Result<Value, CodeException> {
        match (&y, &x) {
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
            (Value::Str(_), _) | (_, Value::Str(_)) => Err(CodeException::TypeMismatch(format!(
                "can't add {:?} to {:?}",
                x, y
            ))),
            _ if Value::wants_float(&y, &x) => Ok(Value::Float(y.as_f64().unwrap() + x.as_f64().unwrap())),
            _ => {
                let (a, b) = (y.as_i64().unwrap(), x.as_i64().unwrap());
                Ok(match a.checked_add(b) {
                    Some(n) => Value::Int(n),
                    None => Value::Float(a as f64 + b as f64),
                })
            }
        }
    }

    /// `*`: numeric multiplication widening to float.
    pub fn mul(y: Value, x: Value) -> Result<Value, CodeException> {
        if !y.is_numeric() || !x.is_numeric() {
            return Err(CodeException::TypeMismatch(format!(
                "can't multiply {:?} with {:?}",
                y, x
            )));
        }
        if Value::wants_float(&y, &x) {
            Ok(Value::Float(y.as_f64().unwrap() * x.as_f64().unwrap()))
        } else {
            let (a, b) = (y.as_i64().unwrap(), x.as_i64().unwrap());
            Ok(match a.checked_mul(b) {
                Some(n) => Value::Int(n),
                None => Value::Float(a as f64 * b as f64),
            })
        }
    }

    /// `-` when the top (`x`) is numeric: ordinary subtraction `y - x`.
    pub fn sub_numeric(y: Value, x: Value) -> Result<Value, CodeException> {
        if !y.is_numeric() {
            return Err(CodeException::TypeMismatch(format!(
                "can't subtract {:?} from {:?}",
                x, y
            )));
        }
        if Value::wants_float(&y, &x) {
            Ok(Value::Float(y.as_f64().unwrap() - x.as_f64().unwrap()))
        } else {
            let (a, b) = (y.as_i64().unwrap(), x.as_i64().unwrap());
            Ok(match a.checked_sub(b) {
                Some(n) => Value::Int(n),
                None => Value::Float(a as f64 - b as f64),
            })
        }
    }

    /// `/` when both operands are numeric: integer floor division when both
    /// are integers, otherwise a type mismatch (true division is `:`).
    pub fn idiv(y: Value, x: Value) -> Result<Value, CodeException> {
        match (&y, &x) {
            (Value::Int(a), Value::Int(b)) => {
                if *b == 0 {
                    Err(CodeException::DivisionByZero)
                } else {
                    Ok(Value::Int(floor_div(*a, *b)))
                }
            }
            _ if y.is_numeric() && x.is_numeric() => Err(CodeException::TypeMismatch(format!(
                "can't idivide {:?} by {:?}",
                y, x
            ))),
            _ => Err(CodeException::TypeMismatch(format!(
                "can't idivide {:?} by {:?}",
                y, x
            ))),
        }
    }

    /// `:` when both operands are numeric: true division producing a float.
    pub fn fdiv(y: Value, x: Value) -> Result<Value, CodeException> {
        if !y.is_numeric() || !x.is_numeric() {
            return Err(CodeException::TypeMismatch(format!(
                "can't fdivide {:?} by {:?}",
                y, x
            )));
        }
        let xf = x.as_f64().unwrap();
        if xf == 0.0 {
            return Err(CodeException::DivisionByZero);
        }
        Ok(Value::Float(y.as_f64().unwrap() / xf))
    }

    /// `%` when both operands are numeric: modulo.
    pub fn modulo(y: Value, x: Value) -> Result<Value, CodeException> {
        match (&y, &x) {
            (Value::Int(a), Value::Int(b)) => {
                if *b == 0 {
                    Err(CodeException::DivisionByZero)
                } else {
                    Ok(Value::Int(floor_mod(*a, *b)))
                }
            }
            _ if y.is_numeric() && x.is_numeric() => {
                let xf = x.as_f64().unwrap();
                if xf == 0.0 {
                    Err(CodeException::DivisionByZero)
                } else {
                    Ok(Value::Float(floor_mod_f64(y.as_f64().unwrap(), xf)))
                }
            }
            _ => Err(CodeException::TypeMismatch(format!(
                "can't get modulo of {:?} and {:?}",
                y, x
            ))),
        }
    }

    /// `F` when the lower operand (`y`) is numeric: exponentiation `y ^ x`.
    pub fn pow(y: Value, x: Value) -> Result<Value, CodeException> {
        if !y.is_numeric() || !x.is_numeric() {
            return Err(CodeException::TypeMismatch(format!(
                "can't raise {:?} to the power of {:?}",
                y, x
            )));
        }
        if Value::wants_float(&y, &x) || x.as_f64().unwrap() < 0.0 {
            Ok(Value::Float(y.as_f64().unwrap().powf(x.as_f64().unwrap())))
        } else {
            let base = y.as_i64().unwrap();
            let exp = x.as_i64().unwrap();
            if exp >= 0 && exp <= u32::MAX as i64 {
                match base.checked_pow(exp as u32) {
                    Some(n) => Ok(Value::Int(n)),
                    None => Ok(Value::Float((base as f64).powf(exp as f64))),
                }
            } else {
                Ok(Value::Float(y.as_f64().unwrap().powf(x.as_f64().unwrap())))
            }
        }
    }

    /// Rust-idiomatic textual form used by `p`, `B`, string casts, and `J`.
    pub fn display_string(&self) -> String {
        match self {
            Value::Int(n) => n.to_string(),
            Value::Float(f) => {
                if f.fract() == 0.0 && f.is_finite() {
                    format!("{f:.1}")
                } else {
                    f.to_string()
                }
            }
            Value::Bool(b) => b.to_string(),
            Value::Str(s) => s.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_string())
    }
}

/// Python-style floor division (`a // b`): rounds the quotient toward
/// negative infinity, not toward zero. Differs from `i64::div_euclid` when
/// `b` is negative.
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

/// Python-style floor modulo (`a % b`): the result's sign follows `b`.
/// Differs from `i64::rem_euclid`, whose result is always non-negative.
fn floor_mod(a: i64, b: i64) -> i64 {
    a - floor_div(a, b) * b
}

/// Floating-point counterpart of [`floor_mod`]: Rust's `%` truncates toward
/// zero, but the original's `%` on floats follows Python's floored modulo,
/// whose sign follows `b` rather than `a`.
fn floor_mod_f64(a: f64, b: f64) -> f64 {
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
    fn truthiness() {
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
        assert!(Value::Int(-1).is_truthy());
        assert!(Value::Str("0".into()).is_truthy());
    }

    #[test]
    fn cross_type_equality() {
        assert!(Value::values_equal(&Value::Int(1), &Value::Bool(true)));
        assert!(Value::values_equal(&Value::Int(2), &Value::Float(2.0)));
        assert!(!Value::values_equal(
            &Value::Str("1".into()),
            &Value::Int(1)
        ));
    }

    #[test]
    fn idiv_is_floor_division() {
        let r = Value::idiv(Value::Int(7), Value::Int(2)).unwrap();
        assert_eq!(r, Value::Int(3));
    }

    #[test]
    fn add_strings_concatenates() {
        let r = Value::add(Value::Str("foo".into()), Value::Str("bar".into())).unwrap();
        assert_eq!(r, Value::Str("foobar".into()));
    }

    #[test]
    fn add_mixed_string_numeric_fails() {
        assert!(Value::add(Value::Str("foo".into()), Value::Int(1)).is_err());
    }

    #[test]
    fn add_overflow_widens_to_float() {
        let r = Value::add(Value::Int(i64::MAX), Value::Int(1)).unwrap();
        assert_eq!(r, Value::Float(i64::MAX as f64 + 1.0));
    }

    #[test]
    fn mul_overflow_widens_to_float() {
        let r = Value::mul(Value::Int(i64::MAX), Value::Int(2)).unwrap();
        assert_eq!(r, Value::Float(i64::MAX as f64 * 2.0));
    }

    #[test]
    fn pow_overflow_widens_to_float() {
        let r = Value::pow(Value::Int(2), Value::Int(100)).unwrap();
        assert_eq!(r, Value::Float(2f64.powf(100.0)));
    }

    #[test]
    fn float_modulo_is_floored_like_the_integer_case() {
        let r = Value::modulo(Value::Float(-5.5), Value::Int(2)).unwrap();
        assert_eq!(r, Value::Float(0.5));
    }
}
