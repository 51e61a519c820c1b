//! Token cursor for one tag or interpolation.

use ftl_ir::Span;
use ftl_lexer::{Token, TokenKind};

/// Cursor over the tokens of a single tag's parameters.
///
/// The token list always ends with [`TokenKind::Eof`]; reading past the end
/// keeps returning that token.
#[derive(Clone, Debug, Default)]
pub struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl Cursor {
    pub fn new(tokens: Vec<Token>) -> Self {
        debug_assert!(
            tokens.last().is_some_and(|t| t.kind == TokenKind::Eof),
            "token list must end with Eof"
        );
        Cursor { tokens, pos: 0 }
    }

    #[inline]
    pub fn current(&self) -> Token {
        self.peek(0)
    }

    #[inline]
    pub fn kind(&self) -> TokenKind {
        self.current().kind
    }

    #[inline]
    pub fn span(&self) -> Span {
        self.current().span
    }

    /// The token `n` positions ahead of the current one.
    pub fn peek(&self, n: usize) -> Token {
        let eof = Token {
            kind: TokenKind::Eof,
            span: Span::DUMMY,
        };
        self.tokens
            .get(self.pos + n)
            .or_else(|| self.tokens.last())
            .copied()
            .unwrap_or(eof)
    }

    #[inline]
    pub fn peek_kind(&self, n: usize) -> TokenKind {
        self.peek(n).kind
    }

    /// Span of the most recently consumed token.
    pub fn previous_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span,
            None => Span::point(self.span().start),
        }
    }

    pub fn advance(&mut self) -> Token {
        let token = self.current();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    #[inline]
    pub fn check(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    /// Consume the current token if it is `kind`.
    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn token(kind: TokenKind, start: u32, end: u32) -> Token {
        Token {
            kind,
            span: Span::new(start, end),
        }
    }

    #[test]
    fn advance_stops_at_eof() {
        let mut cursor = Cursor::new(vec![
            token(TokenKind::Ident, 0, 1),
            token(TokenKind::Eof, 1, 1),
        ]);
        assert_eq!(cursor.previous_span(), Span::point(0));
        assert_eq!(cursor.advance().kind, TokenKind::Ident);
        assert!(cursor.at_end());
        cursor.advance();
        assert!(cursor.at_end());
        assert_eq!(cursor.previous_span(), Span::new(0, 1));
        assert_eq!(cursor.peek_kind(5), TokenKind::Eof);
    }

    #[test]
    fn eat_only_matching() {
        let mut cursor = Cursor::new(vec![
            token(TokenKind::Comma, 0, 1),
            token(TokenKind::Eof, 1, 1),
        ]);
        assert!(!cursor.eat(TokenKind::Ident));
        assert!(cursor.eat(TokenKind::Comma));
        assert!(cursor.at_end());
    }

    #[test]
    fn default_cursor_is_at_end() {
        let cursor = Cursor::default();
        assert!(cursor.at_end());
    }
}
