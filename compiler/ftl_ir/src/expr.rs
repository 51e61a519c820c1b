//! Expression nodes.
//!
//! All children are [`ExprId`]s into the template's arena; string data is
//! interned. `ExprKind` is `Copy` so the evaluator can match on it without
//! borrowing the arena.

use std::fmt;

use crate::builtins::{BuiltIn, LoopVarBuiltIn};
use crate::{ExprId, ExprRange, HashEntryRange, Name, Span, StrPartRange};

#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {:?}", self.kind, self.span)
    }
}

/// Expression variants.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ExprKind {
    /// `true`, `false`
    Bool(bool),
    /// Integer literal that fits `i64`.
    Int(i64),
    /// Decimal literal, stored as `f64` bits.
    Float(u64),
    /// String literal without interpolations (raw `r"..."` strings included).
    Str(Name),
    /// String literal with `${...}` parts.
    Interpolated(StrPartRange),
    /// `[a, b, c]`
    Sequence(ExprRange),
    /// `{"k": v, ...}`
    Hash(HashEntryRange),
    /// Top-level variable.
    Ident(Name),
    /// `.now`, `.vars` and the other special variables.
    Special(SpecialVar),
    /// `receiver.name`
    Dot { receiver: ExprId, name: Name },
    /// `receiver[index]`; a range index slices.
    Index { receiver: ExprId, index: ExprId },
    Arith {
        op: ArithOp,
        left: ExprId,
        right: ExprId,
    },
    Cmp {
        op: CmpOp,
        left: ExprId,
        right: ExprId,
    },
    And { left: ExprId, right: ExprId },
    Or { left: ExprId, right: ExprId },
    Not(ExprId),
    Neg(ExprId),
    /// Unary plus; a no-op that still requires a number.
    Pos(ExprId),
    /// `expr??`
    Exists(ExprId),
    /// `expr!fallback`; `fallback` is invalid for the bare `expr!` form.
    Default { expr: ExprId, fallback: ExprId },
    Paren(ExprId),
    /// `start..end`; `end` is invalid for the right-unbounded `start..`.
    Range {
        start: ExprId,
        end: ExprId,
        kind: RangeKind,
    },
    /// `target?name` or `target?name(args)`.
    BuiltIn {
        target: ExprId,
        builtin: BuiltIn,
        args: ExprRange,
    },
    /// `loopVar?index` and friends, resolved by loop variable name.
    LoopVar {
        var: Name,
        builtin: LoopVarBuiltIn,
        args: ExprRange,
    },
    /// `callee(args)`
    Call { callee: ExprId, args: ExprRange },
    /// `x -> body`; only valid as a built-in argument.
    Lambda { param: Name, body: ExprId },
}

impl ExprKind {
    /// Whether the node is a literal whose value never changes.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            ExprKind::Bool(_) | ExprKind::Int(_) | ExprKind::Float(_) | ExprKind::Str(_)
        )
    }
}

/// One piece of an interpolated string literal.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum StrPart {
    Text(Name),
    Interp(ExprId),
}

/// `key: value` in a hash literal.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct HashEntry {
    pub key: ExprId,
    pub value: ExprId,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    /// `**`
    Pow,
}

impl ArithOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Rem => "%",
            ArithOp::Pow => "**",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl CmpOp {
    /// Spelling used in canonical forms; the relational operators use their
    /// word aliases so the form is valid inside angle-bracket tags.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::NotEq => "!=",
            CmpOp::Lt => "lt",
            CmpOp::LtEq => "lte",
            CmpOp::Gt => "gt",
            CmpOp::GtEq => "gte",
        }
    }

    pub const fn is_equality(self) -> bool {
        matches!(self, CmpOp::Eq | CmpOp::NotEq)
    }
}

/// How the right end of a range is read.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum RangeKind {
    /// `a..b`
    Inclusive,
    /// `a..<b` or `a..!b`
    Exclusive,
    /// `a..*n`, `n` items long
    Length,
    /// `a..`
    Unbounded,
}

impl RangeKind {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            RangeKind::Inclusive | RangeKind::Unbounded => "..",
            RangeKind::Exclusive => "..<",
            RangeKind::Length => "..*",
        }
    }
}

/// Special variables, written `.name`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SpecialVar {
    Now,
    OutputFormat,
    AutoEsc,
    Locale,
    Lang,
    Vars,
    Version,
    DataModel,
    Globals,
    Main,
    Locals,
    Error,
    TemplateName,
    OutputEncoding,
}

impl SpecialVar {
    pub const ALL: [SpecialVar; 14] = [
        SpecialVar::Now,
        SpecialVar::OutputFormat,
        SpecialVar::AutoEsc,
        SpecialVar::Locale,
        SpecialVar::Lang,
        SpecialVar::Vars,
        SpecialVar::Version,
        SpecialVar::DataModel,
        SpecialVar::Globals,
        SpecialVar::Main,
        SpecialVar::Locals,
        SpecialVar::Error,
        SpecialVar::TemplateName,
        SpecialVar::OutputEncoding,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            SpecialVar::Now => "now",
            SpecialVar::OutputFormat => "output_format",
            SpecialVar::AutoEsc => "auto_esc",
            SpecialVar::Locale => "locale",
            SpecialVar::Lang => "lang",
            SpecialVar::Vars => "vars",
            SpecialVar::Version => "version",
            SpecialVar::DataModel => "data_model",
            SpecialVar::Globals => "globals",
            SpecialVar::Main => "main",
            SpecialVar::Locals => "locals",
            SpecialVar::Error => "error",
            SpecialVar::TemplateName => "template_name",
            SpecialVar::OutputEncoding => "output_encoding",
        }
    }

    /// Look up by name, accepting the camelCase spelling too.
    pub fn from_name(name: &str) -> Option<SpecialVar> {
        let snake = crate::builtins::camel_to_snake(name);
        Self::ALL.into_iter().find(|v| v.name() == snake)
    }
}
