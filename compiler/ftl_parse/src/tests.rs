#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use ftl_ir::{ElementKind, SourcePos};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn parse_with(source: &str, settings: &ParserSettings) -> Result<ParsedTemplate, ParseError> {
    parse(
        source,
        settings,
        &BuiltInTable::new(),
        &OutputFormatRegistry::standard(),
    )
}

fn parse_default(source: &str) -> Result<ParsedTemplate, ParseError> {
    parse_with(source, &ParserSettings::default())
}

#[test]
fn settings_choose_the_root_format() {
    let settings = ParserSettings {
        output_format: OutputFormat::Html,
        ..ParserSettings::default()
    };
    let t = parse_with("${x}", &settings).unwrap();
    assert_eq!(t.output_format, OutputFormat::Html);
    assert!(t.auto_escape);

    let settings = ParserSettings {
        output_format: OutputFormat::Html,
        auto_escape: false,
        ..ParserSettings::default()
    };
    assert!(!parse_with("${x}", &settings).unwrap().auto_escape);
}

#[test]
fn plain_formats_never_auto_escape() {
    let t = parse_default("${x}").unwrap();
    assert_eq!(t.output_format, OutputFormat::Undefined);
    assert!(!t.auto_escape);
}

#[test]
fn bracket_interpolation_syntax() {
    let settings = ParserSettings {
        interpolation_syntax: InterpolationSyntax::Bracket,
        ..ParserSettings::default()
    };
    let t = parse_with("a [=x] ${y}", &settings).unwrap();
    assert_eq!(t.canonical(), "a [=x] ${y}");
    let interpolations = t
        .ast
        .elements(t.root)
        .iter()
        .filter(|id| matches!(t.ast.element(**id).kind, ElementKind::Interpolation { .. }))
        .count();
    assert_eq!(interpolations, 1);
}

#[test]
fn macros_are_collected_in_document_order() {
    let t = parse_default(
        "<#macro a></#macro><#if x><#function b><#return 1></#function></#if><#macro c></#macro>",
    )
    .unwrap();
    let names: Vec<&str> = t
        .macros
        .iter()
        .map(|id| match t.ast.element(*id).kind {
            ElementKind::MacroDef { name, .. } => t.name(name),
            _ => "?",
        })
        .collect();
    assert_eq!(names, ["a", "b", "c"]);
}

#[test]
fn errors_carry_line_and_column() {
    let err = parse_default("line one\n  <#if x>").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnclosedDirective("if"));
    assert_eq!(err.pos, SourcePos { line: 2, column: 3 });
    assert_eq!(
        err.to_string(),
        "unclosed #if: its end tag is missing (line 2, column 3)"
    );
}

#[test]
fn lexer_errors_are_reported_as_parse_errors() {
    let err = parse_default("${x").unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::Lex(_)));
}

#[test]
fn deep_nesting_does_not_overflow() {
    let depth = 500;
    let source = format!("{}x{}", "<#if a>".repeat(depth), "</#if>".repeat(depth));
    let t = parse_default(&source).unwrap();
    assert_eq!(t.ast.elements(t.root).len(), 1);

    let expr = format!("${{{}1{}}}", "(".repeat(depth), ")".repeat(depth));
    assert!(parse_default(&expr).is_ok());
}

fn ident() -> impl Strategy<Value = String> {
    "[a-z]{0,5}".prop_map(|s| format!("v_{s}"))
}

fn expr() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        ident(),
        (0i64..1000).prop_map(|n| n.to_string()),
        "[a-z ]{0,6}".prop_map(|s| format!("\"{s}\"")),
    ];
    leaf.prop_recursive(3, 12, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{a} + {b}")),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{a} lt {b}")),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{a}!{b}")),
            inner.clone().prop_map(|a| format!("({a})")),
            inner.clone().prop_map(|a| format!("{a}??")),
            inner.prop_map(|a| format!("[{a}]")),
        ]
    })
}

fn template() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        "[a-z ]{1,8}",
        expr().prop_map(|e| format!("${{{e}}}")),
        (ident(), expr()).prop_map(|(v, e)| format!("<#assign {v} = {e}>")),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        let body = prop::collection::vec(inner, 0..4).prop_map(|parts| parts.concat());
        prop_oneof![
            (expr(), body.clone()).prop_map(|(c, b)| format!("<#if {c}>{b}</#if>")),
            (expr(), body.clone(), body.clone())
                .prop_map(|(c, b, e)| format!("<#if {c}>{b}<#else>{e}</#if>")),
            (ident(), ident(), body.clone())
                .prop_map(|(s, x, b)| format!("<#list {s} as {x}>{b}</#list>")),
            body.prop_map(|b| format!("<#compress>{b}</#compress>")),
        ]
    })
}

proptest! {
    #[test]
    fn canonical_form_reparses_to_itself(source in template()) {
        let settings = ParserSettings {
            strip_whitespace: false,
            ..ParserSettings::default()
        };
        let first = parse_with(&source, &settings).unwrap().canonical();
        let second = parse_with(&first, &settings).unwrap().canonical();
        prop_assert_eq!(first, second);
    }
}
