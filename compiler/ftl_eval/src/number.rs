//! Template numbers.
//!
//! Integer arithmetic stays exact while it fits `i64` and falls back to
//! `f64` on overflow or when either operand is already a float. Equality and
//! ordering compare mathematical values, so `1 == 1.0`.

use std::cmp::Ordering;
use std::fmt;

/// Errors raised by number arithmetic.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ArithmeticError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("modulo by zero")]
    ModuloByZero,
}

/// 2^63, the first float outside `i64`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

#[derive(Copy, Clone, Debug)]
pub enum Number {
    Int(i64),
    Float(f64),
}

#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    reason = "Numbers widen to f64 exactly as template arithmetic does"
)]
impl Number {
    pub fn to_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    pub fn is_integral(self) -> bool {
        match self {
            Number::Int(_) => true,
            Number::Float(f) => f.is_finite() && f.fract() == 0.0,
        }
    }

    /// The value as an `i64` when it is integral and in range.
    pub fn to_i64(self) -> Option<i64> {
        match self {
            Number::Int(i) => Some(i),
            Number::Float(f) if f.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&f) => {
                Some(f as i64)
            }
            Number::Float(_) => None,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Number::Int(i) => i == 0,
            Number::Float(f) => f == 0.0,
        }
    }

    pub fn is_negative(self) -> bool {
        match self {
            Number::Int(i) => i < 0,
            Number::Float(f) => f < 0.0,
        }
    }

    #[must_use]
    pub fn add(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_add(b)
                .map_or_else(|| Number::Float(a as f64 + b as f64), Number::Int),
            _ => Number::Float(self.to_f64() + rhs.to_f64()),
        }
    }

    #[must_use]
    pub fn sub(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_sub(b)
                .map_or_else(|| Number::Float(a as f64 - b as f64), Number::Int),
            _ => Number::Float(self.to_f64() - rhs.to_f64()),
        }
    }

    #[must_use]
    pub fn mul(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_mul(b)
                .map_or_else(|| Number::Float(a as f64 * b as f64), Number::Int),
            _ => Number::Float(self.to_f64() * rhs.to_f64()),
        }
    }

    /// Division; exact integer quotients stay integers.
    pub fn div(self, rhs: Number) -> Result<Number, ArithmeticError> {
        if rhs.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        if let (Number::Int(a), Number::Int(b)) = (self, rhs) {
            if a.checked_rem(b) == Some(0) {
                if let Some(q) = a.checked_div(b) {
                    return Ok(Number::Int(q));
                }
            }
        }
        Ok(Number::Float(self.to_f64() / rhs.to_f64()))
    }

    pub fn rem(self, rhs: Number) -> Result<Number, ArithmeticError> {
        if rhs.is_zero() {
            return Err(ArithmeticError::ModuloByZero);
        }
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => Ok(a
                .checked_rem(b)
                .map_or(Number::Int(0), Number::Int)),
            _ => Ok(Number::Float(self.to_f64() % rhs.to_f64())),
        }
    }

    #[must_use]
    pub fn pow(self, rhs: Number) -> Number {
        if let (Number::Int(base), Number::Int(exp)) = (self, rhs) {
            if let Ok(exp) = u32::try_from(exp) {
                if let Some(result) = base.checked_pow(exp) {
                    return Number::Int(result);
                }
            }
        }
        Number::Float(self.to_f64().powf(rhs.to_f64()))
    }

    #[must_use]
    pub fn neg(self) -> Number {
        match self {
            Number::Int(i) => i
                .checked_neg()
                .map_or_else(|| Number::Float(-(i as f64)), Number::Int),
            Number::Float(f) => Number::Float(-f),
        }
    }

    #[must_use]
    pub fn abs(self) -> Number {
        if self.is_negative() {
            self.neg()
        } else {
            self
        }
    }

    /// Mathematical ordering; `None` when either side is NaN.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            (Number::Int(a), Number::Float(b)) => compare_int_float(a, b),
            (Number::Float(a), Number::Int(b)) => compare_int_float(b, a).map(Ordering::reverse),
            (Number::Float(a), Number::Float(b)) => a.partial_cmp(&b),
        }
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "Only reached when the float is not an exact i64"
)]
fn compare_int_float(int: i64, float: f64) -> Option<Ordering> {
    match Number::Float(float).to_i64() {
        Some(exact) => Some(int.cmp(&exact)),
        None => (int as f64).partial_cmp(&float),
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Number) -> bool {
        self.compare(*other) == Some(Ordering::Equal)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Int(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

/// The computer-language form used by `?c`: no grouping, `.` decimal
/// separator, `NaN`, `INF` and `-INF` for the non-finite values.
impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Float(x) if x.is_nan() => f.write_str("NaN"),
            Number::Float(x) if x.is_infinite() => {
                f.write_str(if x > 0.0 { "INF" } else { "-INF" })
            }
            Number::Float(x) if x == 0.0 => f.write_str("0"),
            Number::Float(x) => write!(f, "{x}"),
        }
    }
}
