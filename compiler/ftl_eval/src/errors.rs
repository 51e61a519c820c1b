//! Errors raised while rendering a template.
//!
//! # Structured Error Categories
//!
//! [`TemplateErrorKind`] says what went wrong; [`TemplateError`] adds the
//! human-readable message, the canonical form of the blamed expression, the
//! source position and the instruction stack. Factory functions fill in
//! `kind` and `message` together; the interpreter attaches the location and
//! stack as the error travels outwards.
//!
//! [`RenderError`] is what a render returns: a template error, or one of the
//! ways rendering ends without one (`#stop`, interruption, a failing writer).

use std::fmt;
use std::io;

use ftl_ir::{Capabilities, SourcePos, Span};
use ftl_output::OutputError;

use crate::number::ArithmeticError;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplateErrorKind {
    /// A variable or member that is null or missing was used.
    ///
    /// The `fast` variant is raised under `??` and `!`, where it is always
    /// caught, and carries no message.
    InvalidReference { fast: bool },
    /// A value lacks every capability the operation accepts.
    TypeMismatch {
        expected: Capabilities,
        actual: String,
    },
    /// A value can't be converted to text (a boolean without
    /// `boolean_format`, a number the format rejects, a sequence).
    Unformattable,
    Arithmetic(ArithmeticError),
    /// Markup of incompatible formats, or escaping without a markup format.
    Markup,
    /// Any other template-level failure (bad arguments, bad settings, host
    /// model errors).
    Custom,
    /// An internal invariant didn't hold.
    Bug,
    Io,
    /// `#stop` reached from inside a function called by an expression.
    Stopped,
    Interrupted,
}

impl TemplateErrorKind {
    /// Whether `#attempt` may recover from this kind.
    pub const fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            TemplateErrorKind::Bug
                | TemplateErrorKind::Io
                | TemplateErrorKind::Stopped
                | TemplateErrorKind::Interrupted
        )
    }
}

impl fmt::Display for TemplateErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidReference { .. } => write!(f, "invalid reference"),
            Self::TypeMismatch { expected, actual } => {
                write!(f, "expected {}, found {actual}", expected.describe())
            }
            Self::Unformattable => write!(f, "value can't be formatted"),
            Self::Arithmetic(e) => write!(f, "{e}"),
            Self::Markup => write!(f, "markup error"),
            Self::Custom => write!(f, "template error"),
            Self::Bug => write!(f, "internal error"),
            Self::Io => write!(f, "I/O error"),
            Self::Stopped => write!(f, "stopped"),
            Self::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// One enclosing element at the point of failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackEntry {
    /// Short element description (`#list`, `${...}`, `@...`).
    pub description: String,
    pub pos: SourcePos,
}

/// A runtime template error.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateError {
    pub kind: TemplateErrorKind,
    pub message: String,
    /// Canonical source of the expression the error is about.
    pub blamed: Option<String>,
    pub span: Option<Span>,
    pub pos: Option<SourcePos>,
    pub tips: Vec<String>,
    /// Enclosing elements, innermost first.
    pub stack: Vec<StackEntry>,
}

impl TemplateError {
    pub fn new(kind: TemplateErrorKind, message: impl Into<String>) -> Self {
        TemplateError {
            kind,
            message: message.into(),
            blamed: None,
            span: None,
            pos: None,
            tips: Vec::new(),
            stack: Vec::new(),
        }
    }

    pub fn custom(message: impl Into<String>) -> Self {
        Self::new(TemplateErrorKind::Custom, message)
    }

    pub fn bug(message: impl Into<String>) -> Self {
        Self::new(TemplateErrorKind::Bug, message)
    }

    pub fn unformattable(message: impl Into<String>) -> Self {
        Self::new(TemplateErrorKind::Unformattable, message)
    }

    /// Missing value under `??` or `!`; never shown to a user.
    pub fn fast_invalid_reference() -> Self {
        Self::new(TemplateErrorKind::InvalidReference { fast: true }, String::new())
    }

    pub fn invalid_reference(blamed: impl Into<String>) -> Self {
        let blamed = blamed.into();
        let mut error = Self::new(
            TemplateErrorKind::InvalidReference { fast: false },
            format!("The following has evaluated to null or missing:\n==> {blamed}"),
        );
        error.blamed = Some(blamed);
        error.with_tip(
            "If the failing expression is known to legally refer to something that's \
             sometimes null or missing, use a default value like myOptionalVar!myDefault, \
             or test it with myOptionalVar??.",
        )
    }

    pub fn type_mismatch(
        expected: Capabilities,
        actual: impl Into<String>,
        blamed: impl Into<String>,
    ) -> Self {
        let actual = actual.into();
        let blamed = blamed.into();
        let message = format!(
            "Expected {}, but this has evaluated to {actual}:\n==> {blamed}",
            with_article(&expected.describe())
        );
        let mut error = Self::new(TemplateErrorKind::TypeMismatch { expected, actual }, message);
        error.blamed = Some(blamed);
        error
    }

    pub fn arithmetic(error: ArithmeticError) -> Self {
        Self::new(TemplateErrorKind::Arithmetic(error), format!("Arithmetic error: {error}"))
    }

    pub fn markup(error: &OutputError) -> Self {
        Self::new(TemplateErrorKind::Markup, error.to_string())
    }

    pub fn io(error: &io::Error) -> Self {
        Self::new(TemplateErrorKind::Io, format!("Failed to write output: {error}"))
    }

    pub fn stopped(message: Option<String>) -> Self {
        Self::new(TemplateErrorKind::Stopped, message.unwrap_or_default())
    }

    pub fn interrupted() -> Self {
        Self::new(TemplateErrorKind::Interrupted, "Template processing was interrupted")
    }

    #[must_use]
    pub fn with_tip(mut self, tip: impl Into<String>) -> Self {
        self.tips.push(tip.into());
        self
    }

    #[must_use]
    pub fn with_blamed(mut self, blamed: impl Into<String>) -> Self {
        self.blamed = Some(blamed.into());
        self
    }

    pub fn is_recoverable(&self) -> bool {
        self.kind.is_recoverable()
    }

    pub fn is_invalid_reference(&self) -> bool {
        matches!(self.kind, TemplateErrorKind::InvalidReference { .. })
    }
}

fn with_article(description: &str) -> String {
    let article = match description.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    };
    format!("{article} {description}")
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if self.stack.is_empty() {
            if let Some(pos) = self.pos {
                write!(f, "\n\n  at {pos}")?;
            }
        }
        for tip in &self.tips {
            write!(f, "\n\nTip: {tip}")?;
        }
        if let Some((first, rest)) = self.stack.split_first() {
            write!(
                f,
                "\n\nFTL stack trace:\n  - Failed at: {}  [{}]",
                first.description, first.pos
            )?;
            for entry in rest {
                write!(f, "\n  - Reached through: {}  [{}]", entry.description, entry.pos)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for TemplateError {}

/// Why a render ended without producing all of its output.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Template(TemplateError),

    #[error("template processing was stopped{}", stop_suffix(.message))]
    Stopped { message: Option<String> },

    #[error("template processing was interrupted")]
    Interrupted,

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

fn stop_suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

impl From<TemplateError> for RenderError {
    fn from(error: TemplateError) -> Self {
        match error.kind {
            TemplateErrorKind::Stopped => RenderError::Stopped {
                message: Some(error.message).filter(|m| !m.is_empty()),
            },
            TemplateErrorKind::Interrupted => RenderError::Interrupted,
            _ => RenderError::Template(error),
        }
    }
}

#[cfg(test)]
mod tests;
