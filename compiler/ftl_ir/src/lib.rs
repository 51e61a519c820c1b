//! FTL IR: the data structures shared by the parser and the evaluator.
//!
//! - Spans and line/column positions for diagnostics
//! - Interned names
//! - The expression tree and the element (directive) tree of a template,
//!   both flattened into one [`Ast`] arena
//! - Built-in names and the immutable [`BuiltInTable`]
//! - Canonical source forms of every node
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: identifiers, string literals and text blocks are
//!   [`Name`]s, so nodes stay small and `Copy`.
//! - **Flatten Everything**: children are `u32` ids and ranges, never boxes.
//! - **Closed Sets**: [`ExprKind`] and [`ElementKind`] are exhaustive enums;
//!   the evaluator matches on them.
//!
//! Floats are stored as `u64` bits so every node derives `Hash` and `Eq`.

/// Compile-time assertion that a type has a specific size.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod arena;
mod builtins;
pub mod canonical;
mod capability;
pub mod element;
pub mod expr;
mod interner;
mod name;
mod ranges;
mod span;
mod syntax;

pub use arena::Ast;
pub use builtins::{
    camel_to_snake, snake_to_camel, BuiltIn, BuiltInRef, BuiltInTable, LoopVarBuiltIn, VARIADIC,
};
pub use canonical::Canonical;
pub use capability::Capabilities;
pub use element::{
    Arg, AssignOp, AssignScope, Assignment, CaseKind, Element, ElementKind, IfArm, LoopBinding,
    MacroParam, SwitchCase,
};
pub use expr::{
    ArithOp, CmpOp, Expr, ExprKind, HashEntry, RangeKind, SpecialVar, StrPart,
};
pub use interner::StringInterner;
pub use name::Name;
pub use ranges::{
    ArgRange, AssignRange, CaseRange, ElementId, ElementRange, ExprId, ExprRange,
    HashEntryRange, IfArmRange, NameRange, ParamRange, StrPartRange,
};
pub use span::{LineIndex, SourcePos, Span, SpanError};
pub use syntax::{InterpolationSyntax, TagSyntax};

// Nodes are copied out of the arena on every visit.
static_assert_size!(Span, 8);
static_assert_size!(Name, 4);
static_assert_size!(ExprId, 4);
