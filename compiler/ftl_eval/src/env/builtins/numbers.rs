//! Number built-ins.

use ftl_ir::{BuiltIn, ExprId};

use crate::env::Environment;
use crate::{Number, TemplateError, Value};

impl Environment<'_> {
    pub(super) fn number_builtin(
        &self,
        builtin: BuiltIn,
        number: Number,
        target: ExprId,
    ) -> Result<Value, TemplateError> {
        let rounded = |f: fn(f64) -> f64| match number {
            Number::Int(_) => number,
            Number::Float(x) => integral(f(x)),
        };
        Ok(match builtin {
            BuiltIn::Abs => Value::Number(number.abs()),
            // Half-up towards positive infinity: -1.5 rounds to -1.
            BuiltIn::Round => Value::Number(rounded(|x| (x + 0.5).floor())),
            BuiltIn::Floor => Value::Number(rounded(f64::floor)),
            BuiltIn::Ceiling => Value::Number(rounded(f64::ceil)),
            BuiltIn::Int => Value::Number(rounded(f64::trunc)),
            BuiltIn::IsInfinite => {
                Value::Boolean(matches!(number, Number::Float(x) if x.is_infinite()))
            }
            BuiltIn::IsNan => Value::Boolean(matches!(number, Number::Float(x) if x.is_nan())),
            BuiltIn::LowerAbc | BuiltIn::UpperAbc => {
                let n = match number.to_i64() {
                    Some(n) if n >= 1 => n,
                    _ => {
                        return Err(self.blame(
                            TemplateError::custom(format!(
                                "?{} needs a positive integer, but the number was {number}",
                                builtin.name()
                            )),
                            target,
                        ));
                    }
                };
                Value::from(alphabetic(n, builtin == BuiltIn::UpperAbc))
            }
            other => {
                return Err(TemplateError::bug(format!(
                    "?{} isn't a number built-in",
                    other.name()
                )))
            }
        })
    }
}

/// A whole-valued float as an integer when it fits.
fn integral(x: f64) -> Number {
    Number::Float(x).to_i64().map_or(Number::Float(x), Number::Int)
}

/// Bijective base-26: 1 is `a`, 26 is `z`, 27 is `aa`.
fn alphabetic(mut n: i64, upper: bool) -> String {
    const LOWER: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";
    const UPPER: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let letters = if upper { UPPER } else { LOWER };
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        let digit = usize::try_from(n % 26).unwrap_or(0);
        out.push(letters[digit]);
        n /= 26;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn alphabetic_numbering() {
        assert_eq!(alphabetic(1, false), "a");
        assert_eq!(alphabetic(26, false), "z");
        assert_eq!(alphabetic(27, true), "AA");
        assert_eq!(alphabetic(52, false), "az");
        assert_eq!(alphabetic(703, false), "aaa");
    }

    #[test]
    fn integral_keeps_large_floats() {
        assert_eq!(integral(3.0), Number::Int(3));
        assert!(matches!(integral(1e300), Number::Float(_)));
        assert!(matches!(integral(f64::NAN), Number::Float(_)));
    }
}
