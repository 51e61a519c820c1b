#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use pretty_assertions::assert_eq;

fn kinds(src: &str) -> Vec<TokenKind> {
    tokenize(src, Span::new(0, u32::try_from(src.len()).unwrap()))
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn ranges_are_not_decimals() {
    assert_eq!(
        kinds("1..5"),
        vec![TokenKind::Int, TokenKind::DotDot, TokenKind::Int, TokenKind::Eof]
    );
    assert_eq!(kinds("1.5"), vec![TokenKind::Decimal, TokenKind::Eof]);
    assert_eq!(
        kinds("0..<3 1..!3 1..*2"),
        vec![
            TokenKind::Int,
            TokenKind::DotDotLt,
            TokenKind::Int,
            TokenKind::Int,
            TokenKind::DotDotLt,
            TokenKind::Int,
            TokenKind::Int,
            TokenKind::DotDotStar,
            TokenKind::Int,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn comparison_aliases_fold() {
    assert_eq!(
        kinds("a gt b &gt; c > d gte e"),
        vec![
            TokenKind::Ident,
            TokenKind::Gt,
            TokenKind::Ident,
            TokenKind::Gt,
            TokenKind::Ident,
            TokenKind::Gt,
            TokenKind::Ident,
            TokenKind::GtEq,
            TokenKind::Ident,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn keywords_are_not_prefixes() {
    assert_eq!(
        kinds("trueish asset"),
        vec![TokenKind::Ident, TokenKind::Ident, TokenKind::Eof]
    );
}

#[test]
fn strings() {
    assert_eq!(
        kinds(r#""a\"b" 'c' r"\d""#),
        vec![TokenKind::Str, TokenKind::Str, TokenKind::RawStr, TokenKind::Eof]
    );
}

#[test]
fn spans_are_absolute() {
    let src = "<#if x>";
    let tokens = tokenize(src, Span::new(5, 6)).unwrap();
    assert_eq!(tokens[0].span, Span::new(5, 6));
    assert_eq!(tokens[1].span, Span::point(6));
}

#[test]
fn unterminated_string() {
    let src = "\"abc";
    let err = tokenize(src, Span::new(0, 4)).unwrap_err();
    assert_eq!(err.kind, LexErrorKind::UnterminatedString { quote: '"' });
}
