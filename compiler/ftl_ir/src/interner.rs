//! Per-template string interner.
//!
//! Filled while parsing, then frozen inside the parsed template and shared
//! read-only by every render. Lookups by string are used when a template
//! reaches a variable through a computed name (`.vars["x"]`).

use rustc_hash::FxHashMap;

use crate::Name;

/// Interns strings into [`Name`]s.
#[derive(Clone, Debug)]
pub struct StringInterner {
    strings: Vec<Box<str>>,
    map: FxHashMap<Box<str>, Name>,
}

impl StringInterner {
    /// Create an interner holding only the empty string.
    pub fn new() -> Self {
        let mut interner = StringInterner {
            strings: Vec::new(),
            map: FxHashMap::default(),
        };
        let empty = interner.intern("");
        debug_assert_eq!(empty, Name::EMPTY);
        interner
    }

    /// Intern `s`, returning the existing name if already present.
    ///
    /// # Panics
    /// Panics after `u32::MAX` distinct strings; sources are limited to
    /// `u32::MAX` bytes, so this cannot happen for a parsed template.
    pub fn intern(&mut self, s: &str) -> Name {
        if let Some(&name) = self.map.get(s) {
            return name;
        }
        let raw = u32::try_from(self.strings.len())
            .unwrap_or_else(|_| panic!("interner overflow: more than u32::MAX strings"));
        let name = Name::from_raw(raw);
        self.strings.push(s.into());
        self.map.insert(s.into(), name);
        name
    }

    /// The string behind `name`.
    pub fn lookup(&self, name: Name) -> &str {
        self.strings.get(name.index()).map_or("", |s| s)
    }

    /// The name of `s`, if some part of the template mentions it.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.map.get(s).copied()
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}
