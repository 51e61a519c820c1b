//! Parse context flags.
//!
//! Directive placement rules (`#break` needs a loop or switch, `#nested`
//! needs a macro, ...) are checked against these flags. Expression-level
//! flags change how individual tokens are read.

/// Context flags for parsing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseContext(u16);

impl ParseContext {
    pub const NONE: Self = Self(0);

    /// Inside a `#list ... as` body or an `#items` body.
    /// Makes `#break` and `#continue` valid.
    pub const IN_LOOP: Self = Self(1 << 0);

    /// Inside `#switch`; makes `#break` valid.
    pub const IN_SWITCH: Self = Self(1 << 1);

    /// Inside a `#macro` body; makes `#nested` and `#return` valid.
    pub const IN_MACRO: Self = Self(1 << 2);

    /// Inside a `#function` body; makes `#return value` valid.
    pub const IN_FUNCTION: Self = Self(1 << 3);

    /// Inside a `#list` that has no `as` clause; makes `#items` valid.
    pub const LIST_WITHOUT_AS: Self = Self(1 << 4);

    /// Where `#sep` may appear.
    pub const CAN_SEP: Self = Self(1 << 5);

    /// `=` separates names from values instead of comparing.
    /// Set in assignments, named arguments and parameter defaults.
    pub const NO_SINGLE_EQ: Self = Self(1 << 6);

    /// Flags that never cross a macro or user-call boundary.
    pub const LOOP_FLAGS: Self = Self(
        Self::IN_LOOP.0 | Self::IN_SWITCH.0 | Self::LIST_WITHOUT_AS.0 | Self::CAN_SEP.0,
    );

    #[inline]
    pub const fn new() -> Self {
        Self::NONE
    }

    /// Check if any of `flag`'s bits is set.
    #[inline]
    pub const fn has(self, flag: Self) -> bool {
        (self.0 & flag.0) != 0
    }

    #[inline]
    #[must_use]
    pub const fn with(self, flag: Self) -> Self {
        Self(self.0 | flag.0)
    }

    #[inline]
    #[must_use]
    pub const fn without(self, flag: Self) -> Self {
        Self(self.0 & !flag.0)
    }

    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

#[cfg(test)]
mod tests;
