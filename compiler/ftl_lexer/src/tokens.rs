//! Expression tokens handed to the parser.

use std::fmt;

use ftl_ir::Span;
use logos::Logos;

use crate::raw_token::RawToken;
use crate::{LexError, LexErrorKind};

/// Cooked token kind.
///
/// Entities and word aliases are folded into the operator they stand for,
/// so the parser sees `Gt` for `>`, `gt` and `&gt;` alike.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    True,
    False,
    As,
    Ident,
    Int,
    Decimal,
    /// Quoted string, escapes still in place.
    Str,
    /// `r"..."`, taken verbatim.
    RawStr,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Semicolon,
    Ellipsis,
    DotDotLt,
    DotDotStar,
    DotDot,
    Dot,
    DoubleQuestion,
    Question,
    Arrow,
    EqEq,
    Eq,
    NotEq,
    Bang,
    Lt,
    LtEq,
    Gt,
    GtEq,
    PlusPlus,
    MinusMinus,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    Plus,
    Minus,
    StarStar,
    Star,
    Slash,
    Percent,
    AndAnd,
    OrOr,
    Eof,
}

impl TokenKind {
    /// Description used in "expected ..." messages.
    pub const fn describe(self) -> &'static str {
        match self {
            TokenKind::True => "`true`",
            TokenKind::False => "`false`",
            TokenKind::As => "`as`",
            TokenKind::Ident => "name",
            TokenKind::Int | TokenKind::Decimal => "number",
            TokenKind::Str | TokenKind::RawStr => "string",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::Comma => "`,`",
            TokenKind::Colon => "`:`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Ellipsis => "`...`",
            TokenKind::DotDotLt => "`..<`",
            TokenKind::DotDotStar => "`..*`",
            TokenKind::DotDot => "`..`",
            TokenKind::Dot => "`.`",
            TokenKind::DoubleQuestion => "`??`",
            TokenKind::Question => "`?`",
            TokenKind::Arrow => "`->`",
            TokenKind::EqEq => "`==`",
            TokenKind::Eq => "`=`",
            TokenKind::NotEq => "`!=`",
            TokenKind::Bang => "`!`",
            TokenKind::Lt => "`lt`",
            TokenKind::LtEq => "`lte`",
            TokenKind::Gt => "`gt`",
            TokenKind::GtEq => "`gte`",
            TokenKind::PlusPlus => "`++`",
            TokenKind::MinusMinus => "`--`",
            TokenKind::PlusEq => "`+=`",
            TokenKind::MinusEq => "`-=`",
            TokenKind::StarEq => "`*=`",
            TokenKind::SlashEq => "`/=`",
            TokenKind::PercentEq => "`%=`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::StarStar => "`**`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Percent => "`%`",
            TokenKind::AndAnd => "`&&`",
            TokenKind::OrOr => "`||`",
            TokenKind::Eof => "end of expression",
        }
    }

    /// Whether this token can begin an operand.
    pub const fn starts_operand(self) -> bool {
        matches!(
            self,
            TokenKind::True
                | TokenKind::False
                | TokenKind::Ident
                | TokenKind::Int
                | TokenKind::Decimal
                | TokenKind::Str
                | TokenKind::RawStr
                | TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::LBrace
                | TokenKind::Dot
                | TokenKind::Bang
                | TokenKind::Minus
                | TokenKind::Plus
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

impl From<RawToken> for TokenKind {
    fn from(raw: RawToken) -> Self {
        match raw {
            RawToken::True => TokenKind::True,
            RawToken::False => TokenKind::False,
            RawToken::As => TokenKind::As,
            RawToken::GtWord | RawToken::Gt | RawToken::GtEntity => TokenKind::Gt,
            RawToken::GtEqWord | RawToken::GtEq | RawToken::GtEqEntity => TokenKind::GtEq,
            RawToken::LtWord | RawToken::Lt | RawToken::LtEntity => TokenKind::Lt,
            RawToken::LtEqWord | RawToken::LtEq | RawToken::LtEqEntity => TokenKind::LtEq,
            RawToken::AndEntity | RawToken::AndAnd => TokenKind::AndAnd,
            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::LBracket => TokenKind::LBracket,
            RawToken::RBracket => TokenKind::RBracket,
            RawToken::LBrace => TokenKind::LBrace,
            RawToken::RBrace => TokenKind::RBrace,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Colon => TokenKind::Colon,
            RawToken::Semicolon => TokenKind::Semicolon,
            RawToken::Ellipsis => TokenKind::Ellipsis,
            RawToken::DotDotLt | RawToken::DotDotBang => TokenKind::DotDotLt,
            RawToken::DotDotStar => TokenKind::DotDotStar,
            RawToken::DotDot => TokenKind::DotDot,
            RawToken::Dot => TokenKind::Dot,
            RawToken::DoubleQuestion => TokenKind::DoubleQuestion,
            RawToken::Question => TokenKind::Question,
            RawToken::Arrow => TokenKind::Arrow,
            RawToken::EqEq => TokenKind::EqEq,
            RawToken::Eq => TokenKind::Eq,
            RawToken::NotEq => TokenKind::NotEq,
            RawToken::Bang => TokenKind::Bang,
            RawToken::PlusPlus => TokenKind::PlusPlus,
            RawToken::MinusMinus => TokenKind::MinusMinus,
            RawToken::PlusEq => TokenKind::PlusEq,
            RawToken::MinusEq => TokenKind::MinusEq,
            RawToken::StarEq => TokenKind::StarEq,
            RawToken::SlashEq => TokenKind::SlashEq,
            RawToken::PercentEq => TokenKind::PercentEq,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::StarStar => TokenKind::StarStar,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Percent => TokenKind::Percent,
            RawToken::OrOr => TokenKind::OrOr,
            RawToken::Int => TokenKind::Int,
            RawToken::Decimal => TokenKind::Decimal,
            RawToken::Str => TokenKind::Str,
            RawToken::RawStr => TokenKind::RawStr,
            RawToken::Ident => TokenKind::Ident,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Tokenize the expression text at `span` of `source`.
///
/// Spans in the result are absolute; the list always ends with an
/// [`TokenKind::Eof`] token at `span.end`.
pub fn tokenize(source: &str, span: Span) -> Result<Vec<Token>, LexError> {
    let base = span.start;
    let text = &source[span.to_range()];
    let mut tokens = Vec::with_capacity(text.len() / 3 + 1);
    let mut lexer = RawToken::lexer(text);
    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let token_span = Span::from_range(range).offset_by(base);
        match result {
            Ok(raw) => tokens.push(Token {
                kind: raw.into(),
                span: token_span,
            }),
            Err(()) => {
                return Err(LexError::new(
                    unexpected_kind(lexer.slice()),
                    token_span,
                ))
            }
        }
    }
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::point(span.end),
    });
    Ok(tokens)
}

pub(crate) fn unexpected_kind(slice: &str) -> LexErrorKind {
    match slice.chars().next() {
        Some(quote @ ('"' | '\'')) => LexErrorKind::UnterminatedString { quote },
        Some(c) => LexErrorKind::UnexpectedChar(c),
        None => LexErrorKind::UnexpectedEof,
    }
}

#[cfg(test)]
mod tests;
