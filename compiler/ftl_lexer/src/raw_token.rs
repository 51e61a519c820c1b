//! Raw expression tokens produced by logos.

use logos::Logos;

/// Tokens inside tags and interpolations.
///
/// `Gt`, `GtEq` and `RBracket` are kept distinct from their entity forms
/// because the scanner uses them to find where a tag ends.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
pub(crate) enum RawToken {
    // === Keywords ===
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("as")]
    As,
    #[token("gt")]
    GtWord,
    #[token("gte")]
    GtEqWord,
    #[token("lt")]
    LtWord,
    #[token("lte")]
    LtEqWord,

    // === Entities ===
    #[token("&lt;")]
    LtEntity,
    #[token("&lt;=")]
    LtEqEntity,
    #[token("&gt;")]
    GtEntity,
    #[token("&gt;=")]
    GtEqEntity,
    #[token("&amp;&amp;")]
    AndEntity,

    // === Symbols ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token("...")]
    Ellipsis,
    #[token("..<")]
    DotDotLt,
    #[token("..!")]
    DotDotBang,
    #[token("..*")]
    DotDotStar,
    #[token("..")]
    DotDot,
    #[token(".")]
    Dot,
    #[token("??")]
    DoubleQuestion,
    #[token("?")]
    Question,
    #[token("->")]
    Arrow,

    // === Operators ===
    #[token("==")]
    EqEq,
    #[token("=")]
    Eq,
    #[token("!=")]
    NotEq,
    #[token("!")]
    Bang,
    #[token("<=")]
    LtEq,
    #[token("<")]
    Lt,
    #[token(">=")]
    GtEq,
    #[token(">")]
    Gt,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("**")]
    StarStar,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&&")]
    #[token("&")]
    AndAnd,
    #[token("||")]
    #[token("|")]
    OrOr,

    // === Literals ===
    #[regex(r"[0-9]+")]
    Int,
    #[regex(r"[0-9]+\.[0-9]+")]
    Decimal,
    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r"'([^'\\]|\\.)*'")]
    Str,
    #[regex(r#"r"[^"]*""#)]
    #[regex(r"r'[^']*'")]
    RawStr,

    #[regex(r"[\p{L}_$@][\p{L}\p{N}_$@]*", priority = 1)]
    Ident,
}
