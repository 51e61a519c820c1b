//! Runtime values.
//!
//! [`Value`] is cheap to clone: strings, sequences, hashes and host objects
//! sit behind `Arc`s, so values can be shared by concurrent renders through
//! the shared variables of a configuration.
//!
//! Facet accessors (`as_string`, `as_number`, `hash_get`, `iter_items`, ...)
//! answer for the built-in variants and for [`Value::Adapted`] host objects
//! alike; host failures surface as [`ModelError`]s for the caller to blame on
//! an expression.

mod hash;
mod range;

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use ftl_ir::{Capabilities, ElementId};
use ftl_output::MarkupValue;

use crate::model::{ModelError, ModelResult, TemplateModel};
use crate::{DateValue, Number};

pub use hash::SimpleHash;
pub use range::RangeValue;

/// Items produced when listing a value; `None` is a null element.
pub type ItemIter = Box<dyn Iterator<Item = ModelResult<Option<Value>>>>;

/// A macro or function defined by the template being rendered.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MacroRef {
    /// The `#macro`/`#function` element.
    pub element: ElementId,
    pub is_function: bool,
}

#[derive(Clone)]
pub enum Value {
    String(Arc<str>),
    Number(Number),
    Boolean(bool),
    Date(DateValue),
    Sequence(Arc<Vec<Value>>),
    Hash(Arc<SimpleHash>),
    Range(RangeValue),
    Markup(MarkupValue),
    Macro(MacroRef),
    /// Result of a bare `expr!` on a missing value: an empty string, an
    /// empty sequence and an empty hash at once.
    Empty,
    Adapted(Arc<dyn TemplateModel>),
}

/// Outcome of resolving a name in a scope that can hold nulls.
///
/// Loop variables and macro parameters can be bound to null; such a binding
/// still hides outer variables of the same name, unlike an absent one.
#[derive(Clone, Debug, PartialEq)]
pub enum Lookup {
    Absent,
    Null,
    Present(Value),
}

impl Lookup {
    pub fn from_option(value: Option<Value>) -> Lookup {
        value.map_or(Lookup::Null, Lookup::Present)
    }

    pub fn into_option(self) -> Option<Value> {
        match self {
            Lookup::Present(value) => Some(value),
            Lookup::Absent | Lookup::Null => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Lookup::Absent)
    }
}

impl Value {
    pub fn string(text: impl Into<Arc<str>>) -> Value {
        Value::String(text.into())
    }

    pub fn sequence(items: Vec<Value>) -> Value {
        Value::Sequence(Arc::new(items))
    }

    pub fn hash(hash: SimpleHash) -> Value {
        Value::Hash(Arc::new(hash))
    }

    pub fn adapted(model: impl TemplateModel + 'static) -> Value {
        Value::Adapted(Arc::new(model))
    }

    pub fn int(value: i64) -> Value {
        Value::Number(Number::Int(value))
    }

    pub fn capabilities(&self) -> Capabilities {
        match self {
            Value::String(_) => Capabilities::STRING,
            Value::Number(_) => Capabilities::NUMBER,
            Value::Boolean(_) => Capabilities::BOOLEAN,
            Value::Date(_) => Capabilities::DATE,
            Value::Sequence(_) | Value::Range(_) => {
                Capabilities::SEQUENCE | Capabilities::COLLECTION
            }
            Value::Hash(_) => Capabilities::HASH | Capabilities::HASH_EX,
            Value::Markup(_) => Capabilities::MARKUP,
            Value::Macro(m) if m.is_function => Capabilities::METHOD,
            Value::Macro(_) => Capabilities::DIRECTIVE,
            Value::Empty => {
                Capabilities::STRING
                    | Capabilities::SEQUENCE
                    | Capabilities::COLLECTION
                    | Capabilities::HASH
                    | Capabilities::HASH_EX
            }
            Value::Adapted(model) => model.capabilities(),
        }
    }

    pub fn has(&self, capability: Capabilities) -> bool {
        self.capabilities().intersects(capability)
    }

    /// Description used in type-mismatch messages: "a sequence".
    pub fn type_description(&self) -> String {
        match self {
            Value::String(_) => "a string".to_owned(),
            Value::Number(_) => "a number".to_owned(),
            Value::Boolean(_) => "a boolean".to_owned(),
            Value::Date(d) => format!("a {} value", d.kind.name()),
            Value::Sequence(_) => "a sequence".to_owned(),
            Value::Hash(_) => "an extended hash".to_owned(),
            Value::Range(_) => "a sequence (range)".to_owned(),
            Value::Markup(m) => format!("a markup output ({})", m.format()),
            Value::Macro(m) if m.is_function => "a function".to_owned(),
            Value::Macro(_) => "a macro".to_owned(),
            Value::Empty => "an empty value".to_owned(),
            Value::Adapted(model) => {
                format!("a host object ({})", model.capabilities().describe())
            }
        }
    }

    pub fn as_string(&self) -> ModelResult<Option<Cow<'_, str>>> {
        match self {
            Value::String(s) => Ok(Some(Cow::Borrowed(s))),
            Value::Empty => Ok(Some(Cow::Borrowed(""))),
            Value::Adapted(model) => match model.as_scalar() {
                Some(scalar) => scalar.as_str().map(|s| Some(Cow::Owned(s))),
                None => Ok(None),
            },
            _ => Ok(None),
        }
    }

    pub fn as_number(&self) -> ModelResult<Option<Number>> {
        match self {
            Value::Number(n) => Ok(Some(*n)),
            Value::Adapted(model) => model.as_number_model().map(|n| n.as_number()).transpose(),
            _ => Ok(None),
        }
    }

    pub fn as_bool(&self) -> ModelResult<Option<bool>> {
        match self {
            Value::Boolean(b) => Ok(Some(*b)),
            Value::Adapted(model) => model.as_boolean().map(|b| b.as_bool()).transpose(),
            _ => Ok(None),
        }
    }

    pub fn as_date(&self) -> ModelResult<Option<DateValue>> {
        match self {
            Value::Date(d) => Ok(Some(*d)),
            Value::Adapted(model) => model.as_date_model().map(|d| d.as_date()).transpose(),
            _ => Ok(None),
        }
    }

    pub fn is_hash(&self) -> bool {
        self.has(Capabilities::HASH | Capabilities::HASH_EX)
    }

    /// Member lookup; `Ok(None)` for a missing key or a non-hash.
    pub fn hash_get(&self, key: &str) -> ModelResult<Option<Value>> {
        match self {
            Value::Hash(hash) => Ok(hash.get(key).cloned()),
            Value::Adapted(model) => {
                if let Some(hash) = model.as_hash_ex() {
                    hash.get(key)
                } else if let Some(hash) = model.as_hash() {
                    hash.get(key)
                } else {
                    Ok(None)
                }
            }
            _ => Ok(None),
        }
    }

    /// Keys and values of a listable hash, in order.
    pub fn hash_entries(&self) -> ModelResult<Option<Vec<(String, Option<Value>)>>> {
        match self {
            Value::Hash(hash) => Ok(Some(
                hash.iter()
                    .map(|(k, v)| (k.to_owned(), Some(v.clone())))
                    .collect(),
            )),
            Value::Empty => Ok(Some(Vec::new())),
            Value::Adapted(model) => match model.as_hash_ex() {
                Some(hash) => {
                    let keys = hash.keys()?;
                    let values = hash.values()?;
                    Ok(Some(keys.into_iter().zip(values).collect()))
                }
                None => Ok(None),
            },
            _ => Ok(None),
        }
    }

    /// Number of keys of a listable hash.
    pub fn hash_size(&self) -> ModelResult<Option<usize>> {
        match self {
            Value::Hash(hash) => Ok(Some(hash.len())),
            Value::Empty => Ok(Some(0)),
            Value::Adapted(model) => model.as_hash_ex().map(|h| h.size()).transpose(),
            _ => Ok(None),
        }
    }

    pub fn is_sequence(&self) -> bool {
        self.has(Capabilities::SEQUENCE)
    }

    /// Length of an indexable sequence; `None` for non-sequences and
    /// unbounded ranges.
    pub fn seq_size(&self) -> ModelResult<Option<usize>> {
        match self {
            Value::Sequence(items) => Ok(Some(items.len())),
            Value::Range(range) => Ok(range
                .len()
                .map(|len| usize::try_from(len).unwrap_or(usize::MAX))),
            Value::Empty => Ok(Some(0)),
            Value::Adapted(model) => model.as_sequence().map(|s| s.size()).transpose(),
            _ => Ok(None),
        }
    }

    /// Element at `index`; `Ok(None)` past the end or for a null element.
    pub fn seq_get(&self, index: usize) -> ModelResult<Option<Value>> {
        match self {
            Value::Sequence(items) => Ok(items.get(index).cloned()),
            Value::Range(range) => Ok(u64::try_from(index)
                .ok()
                .and_then(|i| range.get(i))
                .map(Value::int)),
            Value::Adapted(model) => match model.as_sequence() {
                Some(seq) => {
                    if index < seq.size()? {
                        seq.get(index)
                    } else {
                        Ok(None)
                    }
                }
                None => Ok(None),
            },
            _ => Ok(None),
        }
    }

    /// Iterate a sequence or collection; `None` when the value is neither.
    pub fn iter_items(&self) -> ModelResult<Option<ItemIter>> {
        match self {
            Value::Sequence(items) => {
                let items = Arc::clone(items);
                let len = items.len();
                Ok(Some(Box::new(
                    (0..len).map(move |i| Ok(items.get(i).cloned())),
                )))
            }
            Value::Range(range) => Ok(Some(Box::new(
                range.iter().map(|i| Ok(Some(Value::int(i)))),
            ))),
            Value::Empty => Ok(Some(Box::new(std::iter::empty()))),
            Value::Adapted(model) => {
                if let Some(seq) = model.as_sequence() {
                    let size = seq.size()?;
                    let model = Arc::clone(model);
                    Ok(Some(Box::new((0..size).map(move |i| {
                        model.as_sequence().map_or(Ok(None), |s| s.get(i))
                    }))))
                } else if let Some(collection) = model.as_collection() {
                    let items: Vec<Option<Value>> = collection.iter()?.collect();
                    Ok(Some(Box::new(items.into_iter().map(Ok))))
                } else {
                    Ok(None)
                }
            }
            _ => Ok(None),
        }
    }

    /// All items of a finite sequence or collection, nulls dropped.
    pub fn collect_items(&self) -> ModelResult<Option<Vec<Value>>> {
        if let Value::Range(range) = self {
            if range.is_unbounded() {
                return Err(ModelError::new(
                    "Can't convert a right-unbounded range to a finite sequence",
                ));
            }
        }
        let Some(iter) = self.iter_items()? else {
            return Ok(None);
        };
        let mut items = Vec::new();
        for item in iter {
            if let Some(item) = item? {
                items.push(item);
            }
        }
        Ok(Some(items))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s:?}"),
            Value::Number(n) => write!(f, "{n:?}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Date(d) => write!(f, "{d:?}"),
            Value::Sequence(items) => f.debug_list().entries(items.iter()).finish(),
            Value::Hash(hash) => f.debug_map().entries(hash.iter()).finish(),
            Value::Range(range) => write!(f, "{range:?}"),
            Value::Markup(m) => write!(f, "{m:?}"),
            Value::Macro(m) => write!(f, "{m:?}"),
            Value::Empty => f.write_str("Empty"),
            Value::Adapted(model) => write!(f, "Adapted({model:?})"),
        }
    }
}

/// Structural equality for built-in variants; host objects compare by
/// identity.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => a == b,
            (Value::Hash(a), Value::Hash(b)) => a == b,
            (Value::Range(a), Value::Range(b)) => a == b,
            (Value::Markup(a), Value::Markup(b)) => a == b,
            (Value::Macro(a), Value::Macro(b)) => a == b,
            (Value::Empty, Value::Empty) => true,
            (Value::Adapted(a), Value::Adapted(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::String(text.into())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::String(text.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(Number::Float(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::sequence(items)
    }
}

impl From<SimpleHash> for Value {
    fn from(hash: SimpleHash) -> Self {
        Value::hash(hash)
    }
}

#[cfg(test)]
mod tests;
