//! Arena ids and ranges.
//!
//! Both trees of a template are flattened into arenas: nodes are addressed by
//! a `u32` id, and child lists by a `start`/`len` range into a side table.

/// Define `u32` index types with an `INVALID` sentinel.
macro_rules! define_id {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => { $(
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Sentinel for an absent optional child.
            pub const INVALID: Self = Self(u32::MAX);

            #[inline]
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }

            /// `Some(self)` unless this is the sentinel.
            #[inline]
            pub const fn valid(self) -> Option<Self> {
                if self.is_valid() {
                    Some(self)
                } else {
                    None
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", stringify!($name), self.0)
                } else {
                    write!(f, "{}::INVALID", stringify!($name))
                }
            }
        }
    )* };
}

/// Define range types over arena side tables.
macro_rules! define_range {
    ($($name:ident),* $(,)?) => { $(
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
        pub struct $name {
            pub start: u32,
            pub len: u32,
        }

        impl $name {
            pub const EMPTY: Self = Self { start: 0, len: 0 };

            #[inline]
            pub const fn new(start: u32, len: u32) -> Self {
                Self { start, len }
            }

            #[inline]
            pub const fn is_empty(&self) -> bool {
                self.len == 0
            }

            #[inline]
            pub const fn len(&self) -> usize {
                self.len as usize
            }

            #[inline]
            pub(crate) fn to_range(self) -> ::std::ops::Range<usize> {
                self.start as usize..(self.start + self.len) as usize
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}({}..{})", stringify!($name), self.start, self.start + self.len)
            }
        }
    )* };
}

define_id!(
    /// Index into the expression arena.
    ExprId,
    /// Index into the element arena.
    ElementId,
);

define_range!(
    ExprRange,
    ElementRange,
    StrPartRange,
    HashEntryRange,
    IfArmRange,
    CaseRange,
    ParamRange,
    ArgRange,
    AssignRange,
    NameRange,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel() {
        assert!(!ExprId::INVALID.is_valid());
        assert_eq!(ExprId::default(), ExprId::INVALID);
        assert_eq!(ElementId::new(3).valid(), Some(ElementId::new(3)));
        assert_eq!(ElementId::INVALID.valid(), None);
        assert_eq!(format!("{:?}", ExprId::new(7)), "ExprId(7)");
    }

    #[test]
    fn range_len() {
        let r = ExprRange::new(4, 3);
        assert_eq!(r.len(), 3);
        assert_eq!(r.to_range(), 4..7);
        assert!(ElementRange::EMPTY.is_empty());
    }
}
