//! Built-ins: `expr?name` and `expr?name(args)`.
//!
//! [`Environment::eval_builtin`] takes care of what differs between
//! built-ins before any work is done:
//!
//! - `?has_content`, `?default` and `?if_exists` accept a missing target
//! - `?then` and `?switch` evaluate only the arguments they pick
//! - `?filter`, `?map`, `?take_while` and `?drop_while` take a lambda or a
//!   function instead of plain arguments
//!
//! Every other built-in gets an evaluated target that has one of the
//! capabilities in [`BuiltIn::target`], and evaluated arguments. The
//! per-type modules do the rest.

mod convert;
mod numbers;
mod sequences;
mod strings;

use ftl_ir::{BuiltIn, Capabilities, CmpOp, ExprId, ExprRange};

use super::Environment;
use crate::{TemplateError, Value};

/// Evaluated arguments with the expressions they came from.
pub(super) struct Args<'t> {
    values: Vec<Value>,
    ids: &'t [ExprId],
}

impl Args<'_> {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn get(&self, index: usize) -> Option<(&Value, ExprId)> {
        let value = self.values.get(index)?;
        Some((value, self.ids.get(index).copied().unwrap_or(ExprId::INVALID)))
    }
}

impl Environment<'_> {
    pub(crate) fn eval_builtin(
        &mut self,
        target: ExprId,
        builtin: BuiltIn,
        args: ExprRange,
    ) -> Result<Option<Value>, TemplateError> {
        let template = self.template;
        let ids = template.ast.exprs(args);
        if builtin.accepts_missing_target() {
            let value = self.eval_guarded(target)?;
            return self.missing_tolerant(builtin, value, ids);
        }
        match builtin {
            BuiltIn::Then => {
                let pick = usize::from(!self.eval_bool(target)?);
                return match ids.get(pick) {
                    Some(&chosen) => self.eval_nullable(chosen),
                    None => Err(TemplateError::bug("?then without two arguments")),
                };
            }
            BuiltIn::Switch => return self.switch_builtin(target, ids),
            _ => {}
        }

        let value = self.eval(target)?;
        if !value.has(builtin.target()) {
            return Err(self.type_mismatch(target, builtin.target(), &value));
        }
        if builtin.accepts_lambda() {
            return self.apply_callback(builtin, &value, target, ids).map(Some);
        }
        let mut values = Vec::with_capacity(ids.len());
        for &id in ids {
            values.push(self.eval(id)?);
        }
        let args = Args { values, ids };
        self.apply(builtin, &value, target, &args)
    }

    fn apply(
        &mut self,
        builtin: BuiltIn,
        value: &Value,
        target: ExprId,
        args: &Args<'_>,
    ) -> Result<Option<Value>, TemplateError> {
        use BuiltIn as B;
        let result = match builtin {
            B::UpperCase
            | B::LowerCase
            | B::CapFirst
            | B::UncapFirst
            | B::Capitalize
            | B::Trim
            | B::Length
            | B::Contains
            | B::StartsWith
            | B::EndsWith
            | B::IndexOf
            | B::LastIndexOf
            | B::Replace
            | B::Split
            | B::LeftPad
            | B::RightPad
            | B::KeepBefore
            | B::KeepAfter
            | B::KeepBeforeLast
            | B::KeepAfterLast
            | B::RemoveBeginning
            | B::RemoveEnding
            | B::EnsureStartsWith
            | B::EnsureEndsWith
            | B::ChopLinebreak
            | B::WordList
            | B::Matches
            | B::JsString
            | B::JsonString
            | B::Url => {
                let text = self.require_string(value, target)?;
                self.string_builtin(builtin, &text, target, args)?
            }
            B::Abs
            | B::Round
            | B::Floor
            | B::Ceiling
            | B::Int
            | B::IsInfinite
            | B::IsNan
            | B::LowerAbc
            | B::UpperAbc => {
                let number = self.require_number(value, target)?;
                self.number_builtin(builtin, number, target)?
            }
            B::Number | B::Boolean | B::C | B::String => {
                self.convert_builtin(builtin, value, target, args)?
            }
            B::Html | B::Xml | B::Xhtml | B::Rtf => self.legacy_escape(builtin, value, target)?,
            B::Date | B::Time | B::Datetime | B::IsoUtc => {
                self.date_builtin(builtin, value, target, args)?
            }
            B::Esc | B::NoEsc | B::MarkupString => self.markup_builtin(builtin, value, target)?,
            B::Size
            | B::First
            | B::Last
            | B::Reverse
            | B::Sort
            | B::SortBy
            | B::Join
            | B::SeqContains
            | B::SeqIndexOf
            | B::SeqLastIndexOf
            | B::Chunk
            | B::Min
            | B::Max
            | B::Sequence
            | B::Keys
            | B::Values => return self.sequence_builtin(builtin, value, target, args),
            B::IsString
            | B::IsNumber
            | B::IsBoolean
            | B::IsDate
            | B::IsSequence
            | B::IsHash
            | B::IsHashEx
            | B::IsCollection
            | B::IsEnumerable
            | B::IsIndexable
            | B::IsMacro
            | B::IsDirective
            | B::IsMethod
            | B::IsMarkupOutput => Value::Boolean(type_test(builtin, value)),
            B::HasContent
            | B::Default
            | B::IfExists
            | B::Then
            | B::Switch
            | B::Filter
            | B::Map
            | B::TakeWhile
            | B::DropWhile => {
                return Err(TemplateError::bug(format!(
                    "?{} reached the eager built-in dispatch",
                    builtin.name()
                )));
            }
        };
        Ok(Some(result))
    }

    fn missing_tolerant(
        &mut self,
        builtin: BuiltIn,
        value: Option<Value>,
        args: &[ExprId],
    ) -> Result<Option<Value>, TemplateError> {
        match builtin {
            BuiltIn::HasContent => {
                let present = match &value {
                    Some(value) => self.has_content(value)?,
                    None => false,
                };
                Ok(Some(Value::Boolean(present)))
            }
            BuiltIn::Default => {
                if value.is_some() {
                    return Ok(value);
                }
                for &arg in args {
                    if let Some(fallback) = self.eval_nullable(arg)? {
                        return Ok(Some(fallback));
                    }
                }
                Ok(None)
            }
            _ => Ok(Some(value.unwrap_or(Value::Empty))),
        }
    }

    fn has_content(&self, value: &Value) -> Result<bool, TemplateError> {
        Ok(match value {
            Value::String(text) => !text.is_empty(),
            Value::Sequence(items) => !items.is_empty(),
            Value::Hash(hash) => !hash.is_empty(),
            Value::Range(range) => !range.is_empty(),
            Value::Markup(markup) => !markup.is_empty(),
            Value::Empty => false,
            Value::Number(_) | Value::Boolean(_) | Value::Date(_) | Value::Macro(_) => true,
            Value::Adapted(_) => {
                let facets = || -> crate::model::ModelResult<bool> {
                    if let Some(text) = value.as_string()? {
                        return Ok(!text.is_empty());
                    }
                    if let Some(size) = value.seq_size()? {
                        return Ok(size > 0);
                    }
                    if let Some(size) = value.hash_size()? {
                        return Ok(size > 0);
                    }
                    Ok(true)
                };
                facets().map_err(|e| TemplateError::custom(e.to_string()))?
            }
        })
    }

    /// `value?switch(case1, result1, case2, result2, ..., default)`.
    fn switch_builtin(
        &mut self,
        target: ExprId,
        args: &[ExprId],
    ) -> Result<Option<Value>, TemplateError> {
        let subject = self.eval(target)?;
        let mut pairs = args.chunks_exact(2);
        for pair in pairs.by_ref() {
            let &[case, result] = pair else {
                continue;
            };
            let candidate = self.eval(case)?;
            if self.compare_values(CmpOp::Eq, &subject, &candidate, target.into(), case.into())? {
                return self.eval_nullable(result);
            }
        }
        match *pairs.remainder() {
            [default] => self.eval_nullable(default),
            _ => Err(self.blame(
                TemplateError::custom(
                    "The value didn't match any ?switch case, and no default was given",
                ),
                target,
            )),
        }
    }

    fn arg<'v>(
        &self,
        args: &'v Args<'_>,
        index: usize,
    ) -> Result<(&'v Value, ExprId), TemplateError> {
        args.get(index)
            .ok_or_else(|| TemplateError::bug(format!("built-in argument {index} is missing")))
    }

    fn arg_string(&self, args: &Args<'_>, index: usize) -> Result<String, TemplateError> {
        let (value, id) = self.arg(args, index)?;
        self.require_string(value, id)
    }

    fn opt_arg_string(
        &self,
        args: &Args<'_>,
        index: usize,
    ) -> Result<Option<String>, TemplateError> {
        match args.get(index) {
            Some((value, id)) => self.require_string(value, id).map(Some),
            None => Ok(None),
        }
    }

    fn arg_int(&self, args: &Args<'_>, index: usize) -> Result<i64, TemplateError> {
        let (value, id) = self.arg(args, index)?;
        self.require_int(value, id)
    }
}

fn type_test(builtin: BuiltIn, value: &Value) -> bool {
    let has = |caps: Capabilities| value.has(caps);
    match builtin {
        BuiltIn::IsString => has(Capabilities::STRING),
        BuiltIn::IsNumber => has(Capabilities::NUMBER),
        BuiltIn::IsBoolean => has(Capabilities::BOOLEAN),
        BuiltIn::IsDate => has(Capabilities::DATE),
        BuiltIn::IsSequence | BuiltIn::IsIndexable => has(Capabilities::SEQUENCE),
        BuiltIn::IsHash => has(Capabilities::HASH | Capabilities::HASH_EX),
        BuiltIn::IsHashEx => has(Capabilities::HASH_EX),
        BuiltIn::IsCollection => has(Capabilities::COLLECTION),
        BuiltIn::IsEnumerable => has(Capabilities::SEQUENCE | Capabilities::COLLECTION),
        BuiltIn::IsMacro => matches!(value, Value::Macro(m) if !m.is_function),
        BuiltIn::IsDirective => has(Capabilities::DIRECTIVE),
        BuiltIn::IsMethod => has(Capabilities::METHOD),
        BuiltIn::IsMarkupOutput => has(Capabilities::MARKUP),
        _ => false,
    }
}

/// A count as a template number.
fn count(n: usize) -> Value {
    Value::int(i64::try_from(n).unwrap_or(i64::MAX))
}
