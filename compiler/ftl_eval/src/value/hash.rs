//! Ordered string-keyed hash.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::Value;

/// Hash literal and `#assign` target values: insertion-ordered, string keys.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimpleHash {
    entries: Vec<(Arc<str>, Value)>,
    index: FxHashMap<Arc<str>, usize>,
}

impl SimpleHash {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; a replaced key keeps its position.
    pub fn insert(&mut self, key: impl Into<Arc<str>>, value: Value) {
        let key = key.into();
        if let Some(&slot) = self.index.get(&key) {
            self.entries[slot].1 = value;
        } else {
            self.index.insert(Arc::clone(&key), self.entries.len());
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (&**k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| &**k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// `self + other`: keys of `other` win, new keys are appended.
    #[must_use]
    pub fn merged(&self, other: &SimpleHash) -> SimpleHash {
        let mut result = self.clone();
        for (key, value) in &other.entries {
            result.insert(Arc::clone(key), value.clone());
        }
        result
    }
}

impl<K: Into<Arc<str>>> FromIterator<(K, Value)> for SimpleHash {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut hash = SimpleHash::new();
        for (key, value) in iter {
            hash.insert(key, value);
        }
        hash
    }
}
