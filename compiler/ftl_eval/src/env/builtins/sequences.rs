//! Sequence, collection and hash built-ins, and the ones taking a lambda.

use std::cmp::Ordering;

use ftl_ir::{BuiltIn, Capabilities, ExprId, ExprKind, Name};

use super::{count, Args};
use crate::env::operators::{loosely_equal, ordering, Comparable};
use crate::env::scope::ContextKind;
use crate::env::Environment;
use crate::{DateValue, Number, TemplateError, Value};

/// `x -> expr`, or a function or method value.
enum Callback {
    Lambda { param: Name, body: ExprId },
    Function { value: Value, at: ExprId },
}

/// Sort key of one item; all keys of a sort must be of one variant.
enum SortKey {
    Number(Number),
    Text { folded: String, original: String },
    Date(DateValue),
    Boolean(bool),
}

impl SortKey {
    fn kind(&self) -> &'static str {
        match self {
            SortKey::Number(_) => "number",
            SortKey::Text { .. } => "string",
            SortKey::Date(_) => "date",
            SortKey::Boolean(_) => "boolean",
        }
    }

    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => {
                a.compare(*b).unwrap_or(Ordering::Equal)
            }
            (
                SortKey::Text { folded: a, original: x },
                SortKey::Text { folded: b, original: y },
            ) => a.cmp(b).then_with(|| x.cmp(y)),
            (SortKey::Date(a), SortKey::Date(b)) => a.instant.cmp(&b.instant),
            (SortKey::Boolean(a), SortKey::Boolean(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl Environment<'_> {
    pub(super) fn sequence_builtin(
        &mut self,
        builtin: BuiltIn,
        value: &Value,
        target: ExprId,
        args: &Args<'_>,
    ) -> Result<Option<Value>, TemplateError> {
        let result = match builtin {
            BuiltIn::Size => self.size(value, target)?,
            BuiltIn::First => {
                let Some(mut items) = self.facet(value.iter_items(), target)? else {
                    return Err(self.type_mismatch(target, builtin.target(), value));
                };
                return self.facet(items.next().transpose().map(Option::flatten), target);
            }
            BuiltIn::Last => {
                let size = self.facet(value.seq_size(), target)?.unwrap_or(0);
                if size == 0 {
                    return Ok(None);
                }
                return self.facet(value.seq_get(size - 1), target);
            }
            BuiltIn::Reverse => {
                let mut items = self.collect(value, target)?;
                items.reverse();
                Value::sequence(items)
            }
            BuiltIn::Sort => {
                let items = self.collect(value, target)?;
                let keys = items.clone();
                Value::sequence(self.sorted(items, keys, target)?)
            }
            BuiltIn::SortBy => {
                let items = self.collect(value, target)?;
                let path = self.sort_path(args)?;
                let mut keys = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    keys.push(self.sort_key_value(item, &path, i, target)?);
                }
                Value::sequence(self.sorted(items, keys, target)?)
            }
            BuiltIn::Join => {
                let items = self.collect(value, target)?;
                let separator = self.arg_string(args, 0)?;
                if items.is_empty() {
                    let empty = self.opt_arg_string(args, 1)?.unwrap_or_default();
                    return Ok(Some(Value::from(empty)));
                }
                let mut text = String::new();
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        text.push_str(&separator);
                    }
                    let piece = self.to_text(item, target)?;
                    text.push_str(&piece);
                }
                if let Some(suffix) = self.opt_arg_string(args, 2)? {
                    text.push_str(&suffix);
                }
                Value::from(text)
            }
            BuiltIn::SeqContains => {
                let (needle, _) = self.arg(args, 0)?;
                let items = self.collect(value, target)?;
                Value::Boolean(items.iter().any(|item| loosely_equal(item, needle)))
            }
            BuiltIn::SeqIndexOf | BuiltIn::SeqLastIndexOf => {
                let (needle, _) = self.arg(args, 0)?;
                let items = self.collect(value, target)?;
                let start = match args.get(1) {
                    Some((start, id)) => Some(self.require_int(start, id)?),
                    None => None,
                };
                let found = if builtin == BuiltIn::SeqIndexOf {
                    let from = usize::try_from(start.unwrap_or(0).max(0)).unwrap_or(usize::MAX);
                    items
                        .iter()
                        .enumerate()
                        .skip(from)
                        .find(|(_, item)| loosely_equal(item, needle))
                        .map(|(i, _)| i)
                } else {
                    let last = match start {
                        Some(start) if start < 0 => None,
                        Some(start) => Some(usize::try_from(start).unwrap_or(usize::MAX)),
                        None => Some(usize::MAX),
                    };
                    last.and_then(|last| {
                        items
                            .iter()
                            .enumerate()
                            .take(last.saturating_add(1))
                            .rev()
                            .find(|(_, item)| loosely_equal(item, needle))
                            .map(|(i, _)| i)
                    })
                };
                found.map_or(Value::int(-1), count)
            }
            BuiltIn::Chunk => {
                let size = self.arg_int(args, 0)?;
                let size = match usize::try_from(size) {
                    Ok(size) if size >= 1 => size,
                    _ => {
                        let (_, id) = self.arg(args, 0)?;
                        return Err(self.blame(
                            TemplateError::custom(format!(
                                "The chunk size must be at least 1, but it was {size}"
                            )),
                            id,
                        ));
                    }
                };
                let filler = args.get(1).map(|(value, _)| value.clone());
                let items = self.collect(value, target)?;
                let chunks = items
                    .chunks(size)
                    .map(|chunk| {
                        let mut chunk = chunk.to_vec();
                        if let Some(filler) = &filler {
                            chunk.resize(size, filler.clone());
                        }
                        Value::sequence(chunk)
                    })
                    .collect();
                Value::sequence(chunks)
            }
            BuiltIn::Min | BuiltIn::Max => {
                let items = self.collect(value, target)?;
                return self.extreme(items, builtin == BuiltIn::Max, target);
            }
            BuiltIn::Sequence => Value::sequence(self.collect(value, target)?),
            BuiltIn::Keys | BuiltIn::Values => {
                let Some(entries) = self.facet(value.hash_entries(), target)? else {
                    return Err(self.type_mismatch(target, Capabilities::HASH_EX, value));
                };
                let items = if builtin == BuiltIn::Keys {
                    entries.into_iter().map(|(key, _)| Value::from(key)).collect()
                } else {
                    entries.into_iter().filter_map(|(_, value)| value).collect()
                };
                Value::sequence(items)
            }
            other => {
                return Err(TemplateError::bug(format!(
                    "?{} isn't a sequence built-in",
                    other.name()
                )))
            }
        };
        Ok(Some(result))
    }

    fn size(&self, value: &Value, target: ExprId) -> Result<Value, TemplateError> {
        if let Value::Range(range) = value {
            if range.is_unbounded() {
                if self.settings.legacy_unbounded_range_size {
                    return Ok(Value::int(i64::from(i32::MAX)));
                }
                return Err(self.blame(
                    TemplateError::custom("Can't get the size of a right-unbounded range"),
                    target,
                ));
            }
        }
        if let Some(size) = self.facet(value.seq_size(), target)? {
            return Ok(count(size));
        }
        match self.facet(value.hash_size(), target)? {
            Some(size) => Ok(count(size)),
            None => Err(self.type_mismatch(target, BuiltIn::Size.target(), value)),
        }
    }

    fn sort_path(&self, args: &Args<'_>) -> Result<Vec<String>, TemplateError> {
        let (key, id) = self.arg(args, 0)?;
        if key.is_sequence() {
            let mut path = Vec::new();
            for part in self.collect(key, id)? {
                path.push(self.require_string(&part, id)?);
            }
            return Ok(path);
        }
        Ok(vec![self.require_string(key, id)?])
    }

    fn sort_key_value(
        &self,
        item: &Value,
        path: &[String],
        index: usize,
        target: ExprId,
    ) -> Result<Value, TemplateError> {
        let mut current = item.clone();
        for key in path {
            if !current.is_hash() {
                return Err(self.blame(
                    TemplateError::custom(format!(
                        "?sort_by: item {index} isn't a hash, so it has no {key:?} subvariable"
                    )),
                    target,
                ));
            }
            current = match self.facet(current.hash_get(key), target)? {
                Some(next) => next,
                None => {
                    return Err(self.blame(
                        TemplateError::custom(format!(
                            "?sort_by: item {index} has no {key:?} subvariable"
                        )),
                        target,
                    ));
                }
            };
        }
        Ok(current)
    }

    /// Stable sort of `items` by `keys`: numbers, dates, booleans, or strings
    /// compared case-insensitively first.
    fn sorted(
        &self,
        items: Vec<Value>,
        keys: Vec<Value>,
        target: ExprId,
    ) -> Result<Vec<Value>, TemplateError> {
        let mut keyed: Vec<(SortKey, Value)> = Vec::with_capacity(items.len());
        for (i, (item, key)) in items.into_iter().zip(keys).enumerate() {
            let sort_key = self.sort_key(&key, target)?;
            if let Some((first, _)) = keyed.first() {
                if first.kind() != sort_key.kind() {
                    return Err(self.blame(
                        TemplateError::custom(format!(
                            "Can't sort values of different types: item 0 is a {}, item {i} is \
                             a {}",
                            first.kind(),
                            sort_key.kind()
                        )),
                        target,
                    ));
                }
            }
            keyed.push((sort_key, item));
        }
        keyed.sort_by(|(a, _), (b, _)| a.compare(b));
        Ok(keyed.into_iter().map(|(_, item)| item).collect())
    }

    fn sort_key(&self, key: &Value, target: ExprId) -> Result<SortKey, TemplateError> {
        if let Some(number) = self.facet(key.as_number(), target)? {
            return Ok(SortKey::Number(number));
        }
        if let Some(date) = self.facet(key.as_date(), target)? {
            return Ok(SortKey::Date(date));
        }
        if let Some(text) = self.facet(key.as_string(), target)? {
            return Ok(SortKey::Text {
                folded: text.to_lowercase(),
                original: text.into_owned(),
            });
        }
        if let Some(b) = self.facet(key.as_bool(), target)? {
            return Ok(SortKey::Boolean(b));
        }
        Err(self.blame(
            TemplateError::custom(format!(
                "Can't sort by {}; only numbers, strings, dates and booleans can be sorted",
                key.type_description()
            )),
            target,
        ))
    }

    /// `?min` / `?max` of numbers or dates; `None` for an empty sequence.
    fn extreme(
        &self,
        items: Vec<Value>,
        max: bool,
        target: ExprId,
    ) -> Result<Option<Value>, TemplateError> {
        let mut best: Option<Value> = None;
        for item in items {
            let Some(current) = &best else {
                best = Some(item);
                continue;
            };
            let order = match ordering(&item, current) {
                Ok((Comparable::Number | Comparable::Date, order)) => order,
                _ => {
                    return Err(self.blame(
                        TemplateError::custom(format!(
                            "?{} needs numbers or dates of one kind, but found {} and {}",
                            if max { "max" } else { "min" },
                            current.type_description(),
                            item.type_description()
                        )),
                        target,
                    ));
                }
            };
            let wanted = if max { Ordering::Greater } else { Ordering::Less };
            if order == Some(wanted) {
                best = Some(item);
            }
        }
        Ok(best)
    }

    /// `?filter`, `?map`, `?take_while`, `?drop_while`.
    pub(super) fn apply_callback(
        &mut self,
        builtin: BuiltIn,
        value: &Value,
        target: ExprId,
        args: &[ExprId],
    ) -> Result<Value, TemplateError> {
        let Some(&arg) = args.first() else {
            return Err(TemplateError::bug("lambda built-in without an argument"));
        };
        let callback = self.callback(arg)?;
        let items = self.collect(value, target)?;
        let mut out = Vec::with_capacity(items.len());
        let mut dropping = true;
        for item in items {
            match builtin {
                BuiltIn::Map => match self.invoke(&callback, item.clone())? {
                    Some(mapped) => out.push(mapped),
                    None => {
                        return Err(self.blame(
                            TemplateError::custom("The ?map function returned null"),
                            arg,
                        ));
                    }
                },
                BuiltIn::Filter => {
                    if self.predicate(&callback, item.clone(), arg)? {
                        out.push(item);
                    }
                }
                BuiltIn::TakeWhile => {
                    if !self.predicate(&callback, item.clone(), arg)? {
                        break;
                    }
                    out.push(item);
                }
                _ => {
                    if dropping && self.predicate(&callback, item.clone(), arg)? {
                        continue;
                    }
                    dropping = false;
                    out.push(item);
                }
            }
        }
        Ok(Value::sequence(out))
    }

    fn callback(&mut self, arg: ExprId) -> Result<Callback, TemplateError> {
        if let ExprKind::Lambda { param, body } = self.template.ast.expr(arg).kind {
            return Ok(Callback::Lambda { param, body });
        }
        let value = self.eval(arg)?;
        if value.has(Capabilities::METHOD) {
            Ok(Callback::Function { value, at: arg })
        } else {
            Err(self.type_mismatch(arg, Capabilities::METHOD, &value))
        }
    }

    fn invoke(&mut self, callback: &Callback, item: Value) -> Result<Option<Value>, TemplateError> {
        match callback {
            Callback::Lambda { param, body } => {
                let mark = self.locals.len();
                self.push_local(ContextKind::Lambda {
                    param: *param,
                    value: Some(item),
                });
                let result = self.eval_nullable(*body);
                self.locals.truncate(mark);
                result
            }
            Callback::Function {
                value: Value::Macro(m),
                ..
            } => self.call_function(*m, vec![Some(item)]).map(Some),
            Callback::Function { value, at } => match value {
                Value::Adapted(model) => match model.as_method() {
                    Some(method) => self.facet(method.call(&[item]), *at),
                    None => Err(self.type_mismatch(*at, Capabilities::METHOD, value)),
                },
                _ => Err(self.type_mismatch(*at, Capabilities::METHOD, value)),
            },
        }
    }

    fn predicate(
        &mut self,
        callback: &Callback,
        item: Value,
        at: ExprId,
    ) -> Result<bool, TemplateError> {
        match self.invoke(callback, item)? {
            Some(result) => self.require_bool(&result, at),
            None => Err(self.blame(
                TemplateError::custom("The filter condition evaluated to null"),
                at,
            )),
        }
    }
}
