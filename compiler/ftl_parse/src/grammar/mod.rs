//! Grammar productions.
//!
//! - `expr`: binary and unary operators
//! - `primary`: literals, names, postfix operators and built-ins
//! - `elements`: template structure and block directives
//! - `directive`: parameters of individual directives

mod directive;
mod elements;
mod expr;
mod primary;

use ftl_ir::{ArgRange, Span};
use ftl_lexer::{tokenize, TokenKind};

use crate::{Cursor, ParseError, ParseErrorKind, Parser};

/// The `#ftl` header, parsed before anything else.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Header {
    pub span: Span,
    pub args: ArgRange,
}

impl Parser<'_> {
    /// Point the cursor at the tokens of `span`.
    pub(crate) fn begin_tokens(&mut self, span: Span) -> Result<(), ParseError> {
        let tokens = tokenize(self.source, span)
            .map_err(|e| self.error(ParseErrorKind::Lex(e.kind), e.span))?;
        self.cursor = Cursor::new(tokens);
        Ok(())
    }

    /// Fail unless every token has been consumed.
    pub(crate) fn finish_tokens(&self, expected: &'static str) -> Result<(), ParseError> {
        if self.cursor.at_end() {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    pub(crate) fn unexpected(&self, expected: &'static str) -> ParseError {
        self.error(
            ParseErrorKind::UnexpectedToken {
                found: self.cursor.kind(),
                expected,
            },
            self.cursor.span(),
        )
    }

    pub(crate) fn expect(
        &mut self,
        kind: TokenKind,
        expected: &'static str,
    ) -> Result<Span, ParseError> {
        if self.cursor.check(kind) {
            Ok(self.cursor.advance().span)
        } else {
            Err(self.unexpected(expected))
        }
    }

}

impl<'a> Parser<'a> {
    /// Source text of a span.
    pub(crate) fn slice(&self, span: Span) -> &'a str {
        &self.source[span.to_range()]
    }
}
