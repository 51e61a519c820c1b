//! Expression evaluation.
//!
//! [`Environment::eval_nullable`] is the core: `Ok(None)` means the
//! expression evaluated to null or missing. [`Environment::eval`] turns that
//! into an invalid-reference error blaming the expression, and
//! [`Environment::eval_guarded`] is what `??`, `!` and the missing-tolerant
//! built-ins use: a parenthesised operand tolerates missing values anywhere
//! inside it.

use ftl_ir::{
    Capabilities, ExprId, ExprKind, ExprRange, HashEntryRange, RangeKind, SpecialVar, StrPart,
    StrPartRange,
};
use ftl_stack::ensure_sufficient_stack;

use super::Environment;
use crate::{DateValue, Number, RangeValue, SimpleHash, TemplateError, Value};

impl Environment<'_> {
    pub(crate) fn eval(&mut self, expr: ExprId) -> Result<Value, TemplateError> {
        match self.eval_nullable(expr)? {
            Some(value) => Ok(value),
            None => Err(self.missing(expr)),
        }
    }

    /// Invalid reference to `expr`; the fast variant under `??`/`!`.
    pub(crate) fn missing(&self, expr: ExprId) -> TemplateError {
        if self.tolerance > 0 {
            TemplateError::fast_invalid_reference()
        } else {
            self.blame(TemplateError::invalid_reference(self.canonical(expr)), expr)
        }
    }

    pub(crate) fn eval_guarded(&mut self, expr: ExprId) -> Result<Option<Value>, TemplateError> {
        let ExprKind::Paren(inner) = self.template.ast.expr(expr).kind else {
            return self.eval_nullable(expr);
        };
        self.tolerance += 1;
        let result = self.eval_nullable(inner);
        self.tolerance -= 1;
        match result {
            Err(error) if error.is_invalid_reference() => Ok(None),
            other => other,
        }
    }

    pub(crate) fn eval_nullable(&mut self, expr: ExprId) -> Result<Option<Value>, TemplateError> {
        ensure_sufficient_stack(|| self.eval_inner(expr))
    }

    fn eval_inner(&mut self, id: ExprId) -> Result<Option<Value>, TemplateError> {
        let template = self.template;
        let kind = template.ast.expr(id).kind;
        let value = match kind {
            ExprKind::Bool(b) => Value::Boolean(b),
            ExprKind::Int(i) => Value::int(i),
            ExprKind::Float(bits) => Value::Number(Number::Float(f64::from_bits(bits))),
            ExprKind::Str(text) => Value::string(template.name(text)),
            ExprKind::Interpolated(parts) => self.eval_interpolated(parts)?,
            ExprKind::Sequence(items) => self.eval_sequence(items)?,
            ExprKind::Hash(entries) => self.eval_hash(entries)?,
            ExprKind::Ident(name) => return self.lookup(name).map_err(|e| self.blame(e, id)),
            ExprKind::Special(var) => return self.special_var(var, id),
            ExprKind::Dot { receiver, name } => {
                let target = self.eval(receiver)?;
                if !target.is_hash() {
                    return Err(self.type_mismatch(receiver, Capabilities::HASH, &target));
                }
                return self.facet(target.hash_get(template.name(name)), id);
            }
            ExprKind::Index { receiver, index } => return self.eval_index(receiver, index),
            ExprKind::Arith { op, left, right } => self.eval_arith(op, left, right)?,
            ExprKind::Cmp { op, left, right } => Value::Boolean(self.eval_cmp(op, left, right)?),
            ExprKind::And { left, right } => {
                Value::Boolean(self.eval_bool(left)? && self.eval_bool(right)?)
            }
            ExprKind::Or { left, right } => {
                Value::Boolean(self.eval_bool(left)? || self.eval_bool(right)?)
            }
            ExprKind::Not(inner) => Value::Boolean(!self.eval_bool(inner)?),
            ExprKind::Neg(inner) => Value::Number(self.eval_number(inner)?.neg()),
            ExprKind::Pos(inner) => Value::Number(self.eval_number(inner)?),
            ExprKind::Exists(inner) => Value::Boolean(self.eval_guarded(inner)?.is_some()),
            ExprKind::Default { expr, fallback } => {
                return match self.eval_guarded(expr)? {
                    Some(value) => Ok(Some(value)),
                    None if fallback.is_valid() => self.eval_nullable(fallback),
                    None => Ok(Some(Value::Empty)),
                };
            }
            ExprKind::Paren(inner) => return self.eval_nullable(inner),
            ExprKind::Range { start, end, kind } => {
                Value::Range(self.eval_range(start, end, kind)?)
            }
            ExprKind::BuiltIn {
                target,
                builtin,
                args,
            } => return self.eval_builtin(target, builtin, args),
            ExprKind::LoopVar { var, builtin, args } => {
                self.eval_loop_var(id, var, builtin, args)?
            }
            ExprKind::Call { callee, args } => return self.eval_call(callee, args),
            ExprKind::Lambda { .. } => {
                return Err(self.blame(
                    TemplateError::custom(
                        "A lambda expression can only be the argument of ?filter, ?map, \
                         ?take_while or ?drop_while",
                    ),
                    id,
                ));
            }
        };
        Ok(Some(value))
    }

    fn eval_interpolated(&mut self, parts: StrPartRange) -> Result<Value, TemplateError> {
        let template = self.template;
        let mut text = String::new();
        for part in template.ast.str_parts(parts) {
            match *part {
                StrPart::Text(name) => text.push_str(template.name(name)),
                StrPart::Interp(expr) => {
                    let piece = self.eval_text(expr)?;
                    text.push_str(&piece);
                }
            }
        }
        Ok(Value::from(text))
    }

    fn eval_sequence(&mut self, items: ExprRange) -> Result<Value, TemplateError> {
        let template = self.template;
        let ids = template.ast.exprs(items);
        let mut values = Vec::with_capacity(ids.len());
        for &item in ids {
            values.push(self.eval(item)?);
        }
        Ok(Value::sequence(values))
    }

    fn eval_hash(&mut self, entries: HashEntryRange) -> Result<Value, TemplateError> {
        let template = self.template;
        let mut hash = SimpleHash::new();
        for entry in template.ast.hash_entries(entries) {
            let key = self.eval(entry.key)?;
            let key = self.require_string(&key, entry.key)?;
            let value = self.eval(entry.value)?;
            hash.insert(key, value);
        }
        Ok(Value::hash(hash))
    }

    fn eval_range(
        &mut self,
        start: ExprId,
        end: ExprId,
        kind: RangeKind,
    ) -> Result<RangeValue, TemplateError> {
        let from = self.eval_int(start)?;
        Ok(match kind {
            RangeKind::Inclusive => RangeValue::inclusive(from, self.eval_int(end)?),
            RangeKind::Exclusive => RangeValue::exclusive(from, self.eval_int(end)?),
            RangeKind::Length => RangeValue::with_length(from, self.eval_int(end)?),
            RangeKind::Unbounded => RangeValue::unbounded(from),
        })
    }

    /// `target[index]`: sequence element, hash member, character or slice.
    fn eval_index(
        &mut self,
        receiver: ExprId,
        index: ExprId,
    ) -> Result<Option<Value>, TemplateError> {
        let target = self.eval(receiver)?;
        let key = self.eval(index)?;
        if let Value::Range(range) = key {
            let truncate = matches!(
                self.template.ast.expr(index).kind,
                ExprKind::Range {
                    kind: RangeKind::Length,
                    ..
                }
            );
            return self.slice(&target, range, truncate, receiver, index).map(Some);
        }
        if let Some(number) = self.facet(key.as_number(), index)? {
            let position = self.position(number, index)?;
            if target.is_sequence() {
                return self.facet(target.seq_get(position), receiver);
            }
            if let Some(text) = self.facet(target.as_string(), receiver)? {
                return match text.chars().nth(position) {
                    Some(c) => Ok(Some(Value::from(c.to_string()))),
                    None => Err(self.blame(
                        TemplateError::custom(format!(
                            "String index {position} is out of bounds, the string has only {} \
                             characters",
                            text.chars().count()
                        )),
                        index,
                    )),
                };
            }
            return Err(self.type_mismatch(
                receiver,
                Capabilities::SEQUENCE | Capabilities::STRING,
                &target,
            ));
        }
        if let Some(name) = self.facet(key.as_string(), index)? {
            if !target.is_hash() {
                return Err(self.type_mismatch(receiver, Capabilities::HASH, &target));
            }
            return self.facet(target.hash_get(&name), receiver);
        }
        Err(self.type_mismatch(index, Capabilities::NUMBER | Capabilities::STRING, &key))
    }

    fn position(&self, number: Number, at: ExprId) -> Result<usize, TemplateError> {
        number
            .to_i64()
            .and_then(|i| usize::try_from(i).ok())
            .ok_or_else(|| {
                self.blame(
                    TemplateError::custom(format!(
                        "An index must be a non-negative integer, but it was {number}"
                    )),
                    at,
                )
            })
    }

    fn slice(
        &self,
        target: &Value,
        range: RangeValue,
        truncate: bool,
        receiver: ExprId,
        index: ExprId,
    ) -> Result<Value, TemplateError> {
        if target.is_sequence() {
            let len = self.facet(target.seq_size(), receiver)?.unwrap_or(0);
            let positions = slice_positions(range, len, truncate)
                .map_err(|message| self.blame(TemplateError::custom(message), index))?;
            let mut items = Vec::with_capacity(positions.len());
            for position in positions {
                if let Some(item) = self.facet(target.seq_get(position), receiver)? {
                    items.push(item);
                }
            }
            return Ok(Value::sequence(items));
        }
        if let Some(text) = self.facet(target.as_string(), receiver)? {
            let chars: Vec<char> = text.chars().collect();
            let positions = slice_positions(range, chars.len(), truncate)
                .map_err(|message| self.blame(TemplateError::custom(message), index))?;
            return Ok(Value::from(positions.into_iter().map(|i| chars[i]).collect::<String>()));
        }
        Err(self.type_mismatch(receiver, Capabilities::SEQUENCE | Capabilities::STRING, target))
    }

    fn special_var(&mut self, var: SpecialVar, at: ExprId) -> Result<Option<Value>, TemplateError> {
        let (format, auto_escape) = self.current_format();
        let value = match var {
            SpecialVar::Now => Value::Date(DateValue::now()),
            SpecialVar::OutputFormat => Value::from(format.name()),
            SpecialVar::AutoEsc => Value::Boolean(auto_escape),
            SpecialVar::Locale => Value::from(self.settings.locale.as_str()),
            SpecialVar::Lang => Value::from(self.settings.language()),
            SpecialVar::Version => Value::from(env!("CARGO_PKG_VERSION")),
            SpecialVar::TemplateName => Value::from(self.name),
            SpecialVar::OutputEncoding => match &self.settings.output_encoding {
                Some(encoding) => Value::from(encoding.as_str()),
                None => return Ok(None),
            },
            SpecialVar::DataModel => self.data_model.clone(),
            SpecialVar::Main => Value::hash(self.main.clone()),
            SpecialVar::Globals => Value::hash(self.globals_view(at)?),
            SpecialVar::Vars => Value::hash(self.vars_view(at)?),
            SpecialVar::Locals => {
                if self.current_frame == 0 {
                    return Ok(None);
                }
                Value::hash(self.frame_locals())
            }
            SpecialVar::Error => match self.recovered.last() {
                Some(error) => Value::from(error.message.as_str()),
                None => {
                    return Err(self.blame(
                        TemplateError::custom(
                            "The .error variable is only available inside #recover",
                        ),
                        at,
                    ));
                }
            },
        };
        Ok(Some(value))
    }

    fn frame_locals(&self) -> SimpleHash {
        let template = self.template;
        let mut locals: Vec<_> = self.frames[self.current_frame]
            .locals
            .iter()
            .filter_map(|(name, value)| value.clone().map(|v| (template.name(*name), v)))
            .collect();
        locals.sort_by(|a, b| a.0.cmp(b.0));
        locals.into_iter().collect()
    }

    /// Listable data-model variables overlaid with the globals.
    fn globals_view(&self, at: ExprId) -> Result<SimpleHash, TemplateError> {
        let mut view: SimpleHash = self
            .facet(self.data_model.hash_entries(), at)?
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect();
        if let Some(shared) = self.shared {
            for (key, value) in shared.iter() {
                if !view.contains_key(key) {
                    view.insert(key, value.clone());
                }
            }
        }
        for (key, value) in self.globals.iter() {
            view.insert(key, value.clone());
        }
        Ok(view)
    }

    /// Every variable visible here, innermost scope winning.
    fn vars_view(&self, at: ExprId) -> Result<SimpleHash, TemplateError> {
        let mut view = self.globals_view(at)?;
        for (key, value) in self.main.iter() {
            view.insert(key, value.clone());
        }
        if self.current_frame > 0 {
            for (key, value) in self.frame_locals().iter() {
                view.insert(key, value.clone());
            }
        }
        let template = self.template;
        for ctx in self.locals.iter().filter(|ctx| ctx.frame == self.current_frame) {
            if let super::scope::ContextKind::Iteration(iteration) = &ctx.kind {
                let bound = [
                    (iteration.binding.key, &iteration.key),
                    (iteration.binding.value, &iteration.value),
                ];
                for (name, value) in bound {
                    if let (false, Some(value)) = (name.is_empty(), value) {
                        view.insert(template.name(name), value.clone());
                    }
                }
            }
        }
        Ok(view)
    }
}

/// Positions selected by a slicing range over `len` elements.
fn slice_positions(range: RangeValue, len: usize, truncate: bool) -> Result<Vec<usize>, String> {
    if range.is_empty() {
        return Ok(Vec::new());
    }
    let start = usize::try_from(range.start())
        .map_err(|_| {
            format!(
                "Negative range start index ({}) isn't allowed for a slice",
                range.start()
            )
        })?;
    if range.is_unbounded() {
        if start > len {
            return Err(format!(
                "Range start index {start} is out of bounds, the sliced value has only {len} \
                 elements"
            ));
        }
        return Ok((start..len).collect());
    }
    let mut positions = Vec::new();
    for step in 0..range.len().unwrap_or(0) {
        let Some(position) = range.get(step).and_then(|p| usize::try_from(p).ok()) else {
            return Err("Negative index in a slicing range".to_owned());
        };
        if position >= len {
            if truncate {
                break;
            }
            return Err(format!(
                "Range index {position} is out of bounds, the sliced value has only {len} elements"
            ));
        }
        positions.push(position);
    }
    Ok(positions)
}
