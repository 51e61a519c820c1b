//! Macro frames and the local-context stack.
//!
//! Frame 0 stands for the top level. Every macro or function call pushes a
//! frame holding its `#local` variables and parameters; `#nested` runs the
//! caller's body with the caller's frame made current again.
//!
//! Local contexts (loop variables, nested-content parameters, lambda
//! parameters) are tagged with the frame that pushed them, so a macro body
//! never sees the loop variables of its call site.

use std::iter::Peekable;

use ftl_ir::{ElementRange, LoopBinding, Name, NameRange};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::model::ModelResult;
use crate::{Lookup, Value};

/// One listing step: `(item, None)` for sequences, `(key, value)` for hashes.
pub(crate) type Entry = (Option<Value>, Option<Value>);

pub(crate) type EntryIter = Peekable<Box<dyn Iterator<Item = ModelResult<Entry>>>>;

#[derive(Default)]
pub(crate) struct MacroFrame {
    pub(crate) locals: FxHashMap<Name, Option<Value>>,
    pub(crate) caller: Option<Caller>,
}

/// Where `#nested` continues: the call-site body and its frame.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Caller {
    pub(crate) frame: usize,
    pub(crate) body: ElementRange,
    pub(crate) loop_vars: NameRange,
}

pub(crate) struct LocalContext {
    pub(crate) frame: usize,
    pub(crate) kind: ContextKind,
}

pub(crate) enum ContextKind {
    Iteration(Iteration),
    NestedParams(SmallVec<[(Name, Option<Value>); 4]>),
    Lambda { param: Name, value: Option<Value> },
    /// A `#list` without `as`, holding the entries until `#items` takes them.
    /// The flag tells whether the entries are key-value pairs.
    PendingItems(Option<(EntryIter, bool)>),
}

impl ContextKind {
    pub(crate) fn lookup(&self, name: Name) -> Lookup {
        match self {
            ContextKind::Iteration(iteration) => iteration.lookup(name),
            ContextKind::NestedParams(params) => params
                .iter()
                .find(|(param, _)| *param == name)
                .map_or(Lookup::Absent, |(_, value)| Lookup::from_option(value.clone())),
            ContextKind::Lambda { param, value } if *param == name => {
                Lookup::from_option(value.clone())
            }
            ContextKind::Lambda { .. } | ContextKind::PendingItems(_) => Lookup::Absent,
        }
    }
}

/// State of one `#list` or `#items` iteration.
pub(crate) struct Iteration {
    pub(crate) binding: LoopBinding,
    pub(crate) index: usize,
    pub(crate) has_next: bool,
    pub(crate) key: Option<Value>,
    pub(crate) value: Option<Value>,
}

impl Iteration {
    pub(crate) fn new(binding: LoopBinding) -> Self {
        Iteration {
            binding,
            index: 0,
            has_next: false,
            key: None,
            value: None,
        }
    }

    fn lookup(&self, name: Name) -> Lookup {
        if !self.binding.declares(name) {
            Lookup::Absent
        } else if name == self.binding.key {
            Lookup::from_option(self.key.clone())
        } else {
            Lookup::from_option(self.value.clone())
        }
    }
}
