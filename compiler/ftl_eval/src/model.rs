//! Capability traits for host objects in the data model.
//!
//! A host object implements [`TemplateModel`] and returns `Some` from each
//! facet it supports; one object may be a hash and a string at the same time.
//! Values reach templates as [`Value::Adapted`].
//!
//! Collection elements and hash values may be null: `Ok(None)` from a getter
//! means "missing or null", which templates see as an invalid reference
//! unless guarded with `??` or `!`.

use std::fmt;

use ftl_ir::Capabilities;

use crate::{DateValue, Number, Value};

/// A failure inside a host object, reported to the template as a custom error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ModelError(pub String);

impl ModelError {
    pub fn new(message: impl Into<String>) -> Self {
        ModelError(message.into())
    }
}

pub type ModelResult<T> = Result<T, ModelError>;

pub trait HashModel: Send + Sync {
    fn get(&self, key: &str) -> ModelResult<Option<Value>>;
}

/// A hash whose keys and values can be listed.
pub trait HashExModel: HashModel {
    fn keys(&self) -> ModelResult<Vec<String>>;
    /// Values in the same order as [`keys`](HashExModel::keys).
    fn values(&self) -> ModelResult<Vec<Option<Value>>>;
    fn size(&self) -> ModelResult<usize>;
}

pub trait SequenceModel: Send + Sync {
    fn get(&self, index: usize) -> ModelResult<Option<Value>>;
    fn size(&self) -> ModelResult<usize>;
}

/// A one-shot iterable.
pub trait CollectionModel: Send + Sync {
    fn iter(&self) -> ModelResult<Box<dyn Iterator<Item = Option<Value>> + '_>>;
}

pub trait ScalarModel: Send + Sync {
    fn as_str(&self) -> ModelResult<String>;
}

pub trait NumberModel: Send + Sync {
    fn as_number(&self) -> ModelResult<Number>;
}

pub trait BooleanModel: Send + Sync {
    fn as_bool(&self) -> ModelResult<bool>;
}

pub trait DateModel: Send + Sync {
    fn as_date(&self) -> ModelResult<DateValue>;
}

/// Callable from expressions: `obj(args)`.
pub trait MethodModel: Send + Sync {
    fn call(&self, args: &[Value]) -> ModelResult<Option<Value>>;
}

/// Callable as a user directive: `<@obj name=value>body</@obj>`.
///
/// The body, when the call has one, is rendered before `execute` runs and
/// passed as text. The returned text is written to the output verbatim.
pub trait DirectiveModel: Send + Sync {
    fn execute(&self, params: &[(String, Value)], body: Option<&str>) -> ModelResult<String>;
}

/// A host object exposing zero or more capability facets.
pub trait TemplateModel: Send + Sync + fmt::Debug {
    fn as_hash(&self) -> Option<&dyn HashModel> {
        None
    }

    fn as_hash_ex(&self) -> Option<&dyn HashExModel> {
        None
    }

    fn as_sequence(&self) -> Option<&dyn SequenceModel> {
        None
    }

    fn as_collection(&self) -> Option<&dyn CollectionModel> {
        None
    }

    fn as_scalar(&self) -> Option<&dyn ScalarModel> {
        None
    }

    fn as_number_model(&self) -> Option<&dyn NumberModel> {
        None
    }

    fn as_boolean(&self) -> Option<&dyn BooleanModel> {
        None
    }

    fn as_date_model(&self) -> Option<&dyn DateModel> {
        None
    }

    fn as_method(&self) -> Option<&dyn MethodModel> {
        None
    }

    fn as_directive(&self) -> Option<&dyn DirectiveModel> {
        None
    }

    /// The facets this object exposes.
    fn capabilities(&self) -> Capabilities {
        let facets = [
            (self.as_hash().is_some(), Capabilities::HASH),
            (
                self.as_hash_ex().is_some(),
                Capabilities::HASH | Capabilities::HASH_EX,
            ),
            (self.as_sequence().is_some(), Capabilities::SEQUENCE),
            (self.as_collection().is_some(), Capabilities::COLLECTION),
            (self.as_scalar().is_some(), Capabilities::STRING),
            (self.as_number_model().is_some(), Capabilities::NUMBER),
            (self.as_boolean().is_some(), Capabilities::BOOLEAN),
            (self.as_date_model().is_some(), Capabilities::DATE),
            (self.as_method().is_some(), Capabilities::METHOD),
            (self.as_directive().is_some(), Capabilities::DIRECTIVE),
        ];
        facets
            .into_iter()
            .filter(|(present, _)| *present)
            .fold(Capabilities::empty(), |caps, (_, cap)| caps | cap)
    }
}
