//! Lexer for FTL templates.
//!
//! Lexing happens at two levels:
//!
//! - The [`scanner`] splits template source into [`Piece`]s: static text,
//!   `${...}` interpolations, directive tags (`<#if ...>`), user-directive
//!   calls (`<@m .../>`), comments and `#noparse` blocks. Static text is
//!   scanned with `memchr`; the extent of each tag is found by running the
//!   expression tokenizer over it, so a `>` inside a string or inside
//!   parentheses does not end the tag.
//! - [`tokenize`] turns the parameter text of a tag or the body of an
//!   interpolation into [`Token`]s for the parser, using a `logos` lexer.
//!
//! [`strip_whitespace`] removes the indentation and line break of lines that
//! contain only FTL tags, and [`cook`] handles string literal escapes.

pub mod cook;
mod raw_token;
pub mod scanner;
mod strip;
mod tokens;

pub use scanner::{scan, Directive, Piece, Scanned};
pub use strip::strip_whitespace;
pub use tokens::{tokenize, Token, TokenKind};

use ftl_ir::Span;

/// What went wrong while lexing.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorKind {
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),
    #[error("unterminated string literal (missing closing {quote})")]
    UnterminatedString { quote: char },
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unclosed tag: no closing {expected:?} found")]
    UnclosedTag { expected: char },
    #[error("unclosed interpolation: no closing {expected:?} found")]
    UnclosedInterpolation { expected: char },
    #[error("unclosed comment")]
    UnclosedComment,
    #[error("#noparse has no matching end tag")]
    UnclosedNoParse,
    #[error("unknown directive: #{0}")]
    UnknownDirective(String),
    #[error("#{0} is not supported: templates are parsed without a loader")]
    UnsupportedDirective(String),
    #[error("invalid escape sequence {0:?} in string literal")]
    InvalidEscape(String),
    #[error("template source exceeds {} bytes", u32::MAX)]
    SourceTooLarge,
}

/// A lexing error with its location.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        LexError { kind, span }
    }
}
