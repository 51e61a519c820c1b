//! Directive and text nodes.
//!
//! A parsed template is one root [`ElementRange`]; every block element owns
//! its children as ranges into the arena's element lists, in document order.

use std::fmt;

use ftl_output::OutputFormat;

use crate::{
    ArgRange, AssignRange, CaseRange, ElementRange, ExprId, ExprRange, IfArmRange, Name,
    NameRange, ParamRange, Span,
};

#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Element {
    pub kind: ElementKind,
    pub span: Span,
}

impl Element {
    pub fn new(kind: ElementKind, span: Span) -> Self {
        Element { kind, span }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {:?}", self.kind, self.span)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ElementKind {
    /// Static text.
    Text(Name),
    /// Text from a `#noparse` block.
    NoParse(Name),
    /// `${expr}`, with the format and auto-escaping in force where it appears.
    Interpolation {
        expr: ExprId,
        format: OutputFormat,
        auto_escape: bool,
    },
    /// `#if` / `#elseif` / `#else`
    If(IfArmRange),
    /// `#list source as binding` (or without `as` when `#items` is used).
    List {
        source: ExprId,
        binding: LoopBinding,
        body: ElementRange,
        else_body: ElementRange,
    },
    /// `#items as binding` inside a `#list` that had no `as`.
    Items {
        binding: LoopBinding,
        body: ElementRange,
    },
    /// `#sep`
    Sep(ElementRange),
    /// `#switch value` with `#case`, `#on` and `#default` arms.
    Switch { value: ExprId, cases: CaseRange },
    /// `#attempt` ... `#recover` ...
    Attempt {
        body: ElementRange,
        recover: ElementRange,
    },
    AutoEsc(ElementRange),
    NoAutoEsc(ElementRange),
    /// `#outputformat "name"`
    OutputFormatBlock {
        format: OutputFormat,
        body: ElementRange,
    },
    /// `#assign`, `#global` or `#local` with one or more assignments.
    Assign {
        scope: AssignScope,
        assignments: AssignRange,
    },
    /// `<#assign x>...</#assign>`
    AssignCapture {
        scope: AssignScope,
        target: Name,
        body: ElementRange,
        format: OutputFormat,
        auto_escape: bool,
    },
    /// `#macro` or `#function` definition.
    MacroDef {
        name: Name,
        params: ParamRange,
        /// Name of the `rest...` parameter, or empty.
        catch_all: Name,
        body: ElementRange,
        is_function: bool,
    },
    /// `<@callee args; loopVars>body</@callee>`
    UserCall {
        callee: ExprId,
        args: ArgRange,
        /// Names bound by `#nested` arguments.
        loop_vars: NameRange,
        body: ElementRange,
        has_body: bool,
    },
    /// `#nested args`
    Nested(ExprRange),
    /// `#return` with an optional value.
    Return(ExprId),
    Break,
    Continue,
    /// `#stop` with an optional message.
    Stop(ExprId),
    Comment(Name),
    /// `#setting name=value`
    Setting { name: Name, value: ExprId },
    Flush,
    /// `#compress`
    Compress(ElementRange),
    /// The `#ftl` header, kept for canonical output.
    FtlHeader(ArgRange),
}

impl ElementKind {
    /// Short description used in instruction-stack traces.
    pub fn describe(&self) -> &'static str {
        match self {
            ElementKind::Text(_) | ElementKind::NoParse(_) => "text",
            ElementKind::Interpolation { .. } => "${...}",
            ElementKind::If(_) => "#if",
            ElementKind::List { .. } => "#list",
            ElementKind::Items { .. } => "#items",
            ElementKind::Sep(_) => "#sep",
            ElementKind::Switch { .. } => "#switch",
            ElementKind::Attempt { .. } => "#attempt",
            ElementKind::AutoEsc(_) => "#autoesc",
            ElementKind::NoAutoEsc(_) => "#noautoesc",
            ElementKind::OutputFormatBlock { .. } => "#outputformat",
            ElementKind::Assign { scope, .. } | ElementKind::AssignCapture { scope, .. } => {
                scope.directive()
            }
            ElementKind::MacroDef {
                is_function: true, ..
            } => "#function",
            ElementKind::MacroDef { .. } => "#macro",
            ElementKind::UserCall { .. } => "@...",
            ElementKind::Nested(_) => "#nested",
            ElementKind::Return(_) => "#return",
            ElementKind::Break => "#break",
            ElementKind::Continue => "#continue",
            ElementKind::Stop(_) => "#stop",
            ElementKind::Comment(_) => "comment",
            ElementKind::Setting { .. } => "#setting",
            ElementKind::Flush => "#flush",
            ElementKind::Compress(_) => "#compress",
            ElementKind::FtlHeader(_) => "#ftl",
        }
    }
}

/// Loop variables bound by `#list` or `#items`.
///
/// `key` is empty when the list has no `as` clause; `value` is set only when
/// listing a hash as `key, value`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct LoopBinding {
    pub key: Name,
    pub value: Name,
}

impl LoopBinding {
    pub fn is_bound(&self) -> bool {
        !self.key.is_empty()
    }

    pub fn is_hash_listing(&self) -> bool {
        !self.value.is_empty()
    }

    /// Whether `name` is one of the variables this binding declares.
    pub fn declares(&self, name: Name) -> bool {
        !name.is_empty() && (self.key == name || self.value == name)
    }
}

/// One arm of an `#if`; `cond` is invalid for `#else`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct IfArm {
    pub cond: ExprId,
    pub body: ElementRange,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CaseKind {
    /// `#case`, falls through into the next arm.
    Case,
    /// `#on`, never falls through.
    On,
    Default,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SwitchCase {
    pub kind: CaseKind,
    pub values: ExprRange,
    pub body: ElementRange,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AssignScope {
    /// `#assign`: the main namespace.
    Namespace,
    /// `#global`
    Global,
    /// `#local`: the current macro or function frame.
    Local,
}

impl AssignScope {
    pub const fn directive(self) -> &'static str {
        match self {
            AssignScope::Namespace => "#assign",
            AssignScope::Global => "#global",
            AssignScope::Local => "#local",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AssignOp {
    Set,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Inc,
    Dec,
}

impl AssignOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            AssignOp::Set => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Rem => "%=",
            AssignOp::Inc => "++",
            AssignOp::Dec => "--",
        }
    }
}

/// `target op value`; `value` is invalid for `++` and `--`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Assignment {
    pub target: Name,
    pub op: AssignOp,
    pub value: ExprId,
}

/// A macro parameter with an optional default expression.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct MacroParam {
    pub name: Name,
    pub default: ExprId,
}

/// A call or header argument; `name` is empty for positional arguments.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Arg {
    pub name: Name,
    pub value: ExprId,
}
