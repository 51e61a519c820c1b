//! Interned string identifier.

use std::fmt;

/// Index into a template's [`StringInterner`](crate::StringInterner).
///
/// Used for variable names, hash keys written in the source, string literal
/// contents and text blocks, so that the trees stay `Copy`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string; also marks "no name" in optional slots.
    pub const EMPTY: Name = Name(0);

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}
