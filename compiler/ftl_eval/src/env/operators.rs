//! Binary operators: arithmetic, `+` concatenation, comparison.
//!
//! Comparison is strict: two numbers, two strings, two booleans or two
//! dates of the same kind. Any other pair is a type mismatch, so
//! `"1" == 1` fails instead of answering `false`. Strings and booleans
//! only support `==` and `!=`.

use std::cmp::Ordering;

use ftl_ir::{ArithOp, Capabilities, CmpOp, ExprId};
use ftl_output::concat;

use super::{Environment, Operand};
use crate::model::ModelError;
use crate::{DateKind, Number, SimpleHash, TemplateError, TemplateErrorKind, Value};

/// The type two values were compared as.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Comparable {
    Number,
    Date,
    String,
    Boolean,
}

impl Comparable {
    const fn name(self) -> &'static str {
        match self {
            Comparable::Number => "number",
            Comparable::Date => "date",
            Comparable::String => "string",
            Comparable::Boolean => "boolean",
        }
    }
}

/// Why two values can't be compared.
#[derive(Clone, Debug)]
pub(crate) enum Incomparable {
    Types,
    DateKinds(DateKind, DateKind),
    Model(ModelError),
}

impl From<ModelError> for Incomparable {
    fn from(error: ModelError) -> Self {
        Incomparable::Model(error)
    }
}

/// Order two values; `None` ordering for NaN.
pub(crate) fn ordering(
    left: &Value,
    right: &Value,
) -> Result<(Comparable, Option<Ordering>), Incomparable> {
    if let (Some(a), Some(b)) = (left.as_number()?, right.as_number()?) {
        return Ok((Comparable::Number, a.compare(b)));
    }
    if let (Some(a), Some(b)) = (left.as_date()?, right.as_date()?) {
        let known = a.kind != DateKind::Unknown && b.kind != DateKind::Unknown;
        if known && a.kind != b.kind {
            return Err(Incomparable::DateKinds(a.kind, b.kind));
        }
        return Ok((Comparable::Date, Some(a.instant.cmp(&b.instant))));
    }
    if let (Some(a), Some(b)) = (left.as_string()?, right.as_string()?) {
        return Ok((Comparable::String, Some(a.cmp(&b))));
    }
    if let (Some(a), Some(b)) = (left.as_bool()?, right.as_bool()?) {
        return Ok((Comparable::Boolean, Some(a.cmp(&b))));
    }
    Err(Incomparable::Types)
}

/// `==` that answers `false` for values of different types.
pub(crate) fn loosely_equal(left: &Value, right: &Value) -> bool {
    matches!(ordering(left, right), Ok((_, Some(Ordering::Equal))))
}

const COMPARABLE: Capabilities = Capabilities::NUMBER
    .union(Capabilities::STRING)
    .union(Capabilities::DATE)
    .union(Capabilities::BOOLEAN);

impl Environment<'_> {
    pub(crate) fn eval_arith(
        &mut self,
        op: ArithOp,
        left: ExprId,
        right: ExprId,
    ) -> Result<Value, TemplateError> {
        if op == ArithOp::Add {
            let l = self.eval(left)?;
            let r = self.eval(right)?;
            return self.add_values(&l, &r, left.into(), right.into());
        }
        let a = self.eval_number(left)?;
        let b = self.eval_number(right)?;
        arith_numbers(op, a, b)
            .map(Value::Number)
            .map_err(|e| self.blame(e, right))
    }

    /// `+`: adds numbers, concatenates text, markup, sequences; merges hashes.
    pub(crate) fn add_values(
        &mut self,
        left: &Value,
        right: &Value,
        l_at: Operand,
        r_at: Operand,
    ) -> Result<Value, TemplateError> {
        let (ln, rn) = (self.facet(left.as_number(), l_at)?, self.facet(right.as_number(), r_at)?);
        if let (Some(a), Some(b)) = (ln, rn) {
            return Ok(Value::Number(a.add(b)));
        }
        match (left, right) {
            (Value::Markup(a), Value::Markup(b)) => {
                return concat(a, b)
                    .map(Value::Markup)
                    .map_err(|e| self.blame_at(TemplateError::markup(&e), r_at));
            }
            (Value::Markup(markup), text) if text.has(Capabilities::STRINGABLE) => {
                let plain = self.to_text(text, r_at)?;
                let escaped = markup
                    .format()
                    .escape_plain_text(plain)
                    .map_err(|e| TemplateError::markup(&e))?;
                return concat(markup, &escaped)
                    .map(Value::Markup)
                    .map_err(|e| self.blame_at(TemplateError::markup(&e), r_at));
            }
            (text, Value::Markup(markup)) if text.has(Capabilities::STRINGABLE) => {
                let plain = self.to_text(text, l_at)?;
                let escaped = markup
                    .format()
                    .escape_plain_text(plain)
                    .map_err(|e| TemplateError::markup(&e))?;
                return concat(&escaped, markup)
                    .map(Value::Markup)
                    .map_err(|e| self.blame_at(TemplateError::markup(&e), l_at));
            }
            _ => {}
        }
        if left.has(Capabilities::STRINGABLE) && right.has(Capabilities::STRINGABLE) {
            let mut text = self.to_text(left, l_at)?;
            text.push_str(&self.to_text(right, r_at)?);
            return Ok(Value::from(text));
        }
        if left.is_sequence() && right.is_sequence() {
            let mut items = self.collect(left, l_at)?;
            items.extend(self.collect(right, r_at)?);
            return Ok(Value::sequence(items));
        }
        if left.has(Capabilities::HASH_EX) && right.has(Capabilities::HASH_EX) {
            let merged = match (left, right) {
                (Value::Hash(a), Value::Hash(b)) => a.merged(b),
                _ => {
                    let mut merged = self.to_simple_hash(left, l_at)?;
                    for (key, value) in self.to_simple_hash(right, r_at)?.iter() {
                        merged.insert(key, value.clone());
                    }
                    merged
                }
            };
            return Ok(Value::hash(merged));
        }
        let blamed = if left.has(Capabilities::STRINGABLE) { r_at } else { l_at };
        let value = if left.has(Capabilities::STRINGABLE) { right } else { left };
        Err(self.type_mismatch(
            blamed,
            Capabilities::STRINGABLE | Capabilities::SEQUENCE | Capabilities::HASH_EX,
            value,
        ))
    }

    /// All items of a finite sequence or collection.
    pub(crate) fn collect(
        &self,
        value: &Value,
        at: impl Into<Operand>,
    ) -> Result<Vec<Value>, TemplateError> {
        let at = at.into();
        if let Value::Range(range) = value {
            if range.is_unbounded() {
                let error = TemplateError::custom(format!(
                    "Can't convert the right-unbounded range {} to a finite sequence",
                    self.operand_text(at)
                ));
                return Err(self.blame_at(error, at));
            }
        }
        match self.facet(value.collect_items(), at)? {
            Some(items) => Ok(items),
            None => Err(self.type_mismatch(
                at,
                Capabilities::SEQUENCE | Capabilities::COLLECTION,
                value,
            )),
        }
    }

    fn to_simple_hash(&self, value: &Value, at: Operand) -> Result<SimpleHash, TemplateError> {
        match self.facet(value.hash_entries(), at)? {
            Some(entries) => Ok(entries
                .into_iter()
                .filter_map(|(key, value)| value.map(|v| (key, v)))
                .collect()),
            None => Err(self.type_mismatch(at, Capabilities::HASH_EX, value)),
        }
    }

    pub(crate) fn eval_cmp(
        &mut self,
        op: CmpOp,
        left: ExprId,
        right: ExprId,
    ) -> Result<bool, TemplateError> {
        let l = self.eval(left)?;
        let r = self.eval(right)?;
        self.compare_values(op, &l, &r, left.into(), right.into())
    }

    pub(crate) fn compare_values(
        &self,
        op: CmpOp,
        left: &Value,
        right: &Value,
        l_at: Operand,
        r_at: Operand,
    ) -> Result<bool, TemplateError> {
        let (kind, order) = match ordering(left, right) {
            Ok(found) => found,
            Err(Incomparable::Model(e)) => return self.facet(Err(e), r_at),
            Err(Incomparable::DateKinds(a, b)) => {
                return Err(self.blame_at(
                    TemplateError::custom(format!(
                        "Can't compare a {} value with a {} value",
                        a.name(),
                        b.name()
                    )),
                    r_at,
                ));
            }
            Err(Incomparable::Types) => return Err(self.incomparable(left, right, l_at, r_at)),
        };
        if !op.is_equality() && matches!(kind, Comparable::String | Comparable::Boolean) {
            return Err(self.blame_at(
                TemplateError::custom(format!(
                    "Can't use operator \"{}\" on {} values",
                    op.as_symbol(),
                    kind.name()
                )),
                r_at,
            ));
        }
        Ok(match order {
            None => op == CmpOp::NotEq,
            Some(order) => match op {
                CmpOp::Eq => order == Ordering::Equal,
                CmpOp::NotEq => order != Ordering::Equal,
                CmpOp::Lt => order == Ordering::Less,
                CmpOp::LtEq => order != Ordering::Greater,
                CmpOp::Gt => order == Ordering::Greater,
                CmpOp::GtEq => order != Ordering::Less,
            },
        })
    }

    fn incomparable(
        &self,
        left: &Value,
        right: &Value,
        l_at: Operand,
        r_at: Operand,
    ) -> TemplateError {
        let expected = match left.capabilities() & COMPARABLE {
            caps if caps.is_empty() => COMPARABLE,
            caps => caps,
        };
        let message = format!(
            "Can't compare values of these types. Allowed comparisons are between two numbers, \
             two strings, two dates, or two booleans.\n\
             Left hand operand ==> {} is {}.\n\
             Right hand operand ==> {} is {}.",
            self.operand_text(l_at),
            left.type_description(),
            self.operand_text(r_at),
            right.type_description(),
        );
        let error = TemplateError::new(
            TemplateErrorKind::TypeMismatch {
                expected,
                actual: right.type_description(),
            },
            message,
        );
        self.blame_at(error, r_at)
    }
}

pub(crate) fn arith_numbers(op: ArithOp, a: Number, b: Number) -> Result<Number, TemplateError> {
    match op {
        ArithOp::Add => Ok(a.add(b)),
        ArithOp::Sub => Ok(a.sub(b)),
        ArithOp::Mul => Ok(a.mul(b)),
        ArithOp::Div => a.div(b).map_err(TemplateError::arithmetic),
        ArithOp::Rem => a.rem(b).map_err(TemplateError::arithmetic),
        ArithOp::Pow => Ok(a.pow(b)),
    }
}
