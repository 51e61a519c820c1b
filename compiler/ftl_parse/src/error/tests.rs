use super::*;
use pretty_assertions::assert_eq;

#[test]
fn location_is_line_and_column() {
    let source = "a\nbc <#if>";
    let err = ParseError::new(
        source,
        ParseErrorKind::UnexpectedToken {
            found: TokenKind::Eof,
            expected: "expression",
        },
        Span::new(5, 10),
    );
    assert_eq!(err.pos, SourcePos { line: 2, column: 4 });
    assert_eq!(
        err.to_string(),
        "found end of expression, expected expression (line 2, column 4)"
    );
}

#[test]
fn builtin_messages() {
    let unknown = ParseErrorKind::UnknownBuiltIn {
        name: "uper_case".into(),
        suggestion: Some("upper_case"),
    };
    assert_eq!(
        unknown.to_string(),
        "unknown built-in: ?uper_case (did you mean ?upper_case?)"
    );
    let arity = ParseErrorKind::BuiltInArity {
        name: "left_pad",
        min: 1,
        max: 2,
        found: 0,
    };
    assert_eq!(arity.to_string(), "?left_pad takes 1 to 2 arguments, got 0");
    let none = ParseErrorKind::BuiltInArity {
        name: "size",
        min: 0,
        max: 0,
        found: 1,
    };
    assert_eq!(none.to_string(), "?size takes no arguments, got 1");
}

#[test]
fn end_tag_message() {
    let kind = ParseErrorKind::UnexpectedEndTag {
        found: "</#list>".into(),
        expected: Some("</#if>".into()),
    };
    assert_eq!(kind.to_string(), "unexpected end tag </#list>; expected </#if>");
}
