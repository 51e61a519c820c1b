//! End-to-end rendering through the public API.

#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use ftlc::{
    json, Configuration, InterpolationSyntax, OutputFormat, RenderError, SimpleHash, Template,
    TemplateErrorKind, Value,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn parse(source: &str) -> Template {
    Configuration::default().parse("test.ftl", source).unwrap()
}

fn empty() -> Value {
    Value::hash(SimpleHash::new())
}

fn render(source: &str) -> String {
    parse(source).render_to_string(empty()).unwrap()
}

fn render_json(source: &str, data: &str) -> String {
    let model = json::data_model_from_str(data).unwrap();
    parse(source).render_to_string(model).unwrap()
}

fn render_err(source: &str) -> RenderError {
    let Err(error) = parse(source).render_to_string(empty()) else {
        panic!("{source:?} rendered without an error");
    };
    error
}

#[test]
fn if_else() {
    assert_eq!(render("<#if 1 == 1>yes<#else>no</#if>"), "yes");
    assert_eq!(render("<#if 1 == 2>yes<#elseif 2 == 2>two<#else>no</#if>"), "two");
}

#[test]
fn list_with_separator() {
    assert_eq!(render("<#list [1, 2, 3] as x>${x}<#sep>,</#sep></#list>"), "1,2,3");
    assert_eq!(render("<#list [] as x>${x}<#else>none</#list>"), "none");
}

#[test]
fn range_lengths() {
    assert_eq!(render("<#list 1..5 as i>${i}</#list>"), "12345");
    assert_eq!(render("<#list 5..1 as i>${i}</#list>"), "54321");
    assert_eq!(render("<#list 1..<4 as i>${i}</#list>"), "123");
    assert_eq!(render("<#list 1..<1 as i>${i}</#list>"), "");
    assert_eq!(render("<#list 3..*2 as i>${i}</#list>"), "34");
    assert_eq!(render("${(1..5)?size} ${(2..<2)?size}"), "5 0");
}

#[test]
fn loop_index_is_counter_minus_one() {
    assert_eq!(
        render(
            "<#list 10..14 as i><#if i?index != i?counter - 1>bad</#if>\
             <#if i?index != i - 10>bad</#if>${i?counter}</#list>"
        ),
        "12345"
    );
}

#[test]
fn logical_operators_short_circuit() {
    assert_eq!(render("<#if false && missing>y<#else>n</#if>"), "n");
    assert_eq!(render("<#if true || missing>y</#if>"), "y");
    assert!(matches!(render_err("<#if true && missing>y</#if>"), RenderError::Template(_)));
}

#[test]
fn existence_tests_never_fail() {
    assert_eq!(render("${(missing??)?c} ${((missing.deeper)??)?c}"), "false false");
    assert_eq!(render("${(missing.deeper.still)!\"d\"}"), "d");
}

#[test]
fn equality_is_strict_about_types() {
    assert_eq!(render("${(1 == 1.0)?c}"), "true");
    let RenderError::Template(error) = render_err("${(\"1\" == 1)?c}") else {
        panic!("comparing a string with a number is a template error");
    };
    assert!(matches!(error.kind, TemplateErrorKind::TypeMismatch { .. }));
}

#[test]
fn break_and_continue_affect_the_innermost_loop() {
    assert_eq!(
        render(
            "<#list 1..3 as i><#list 1..3 as j><#if j == 2><#break></#if>${i}${j} \
             </#list></#list>"
        ),
        "11 21 31 "
    );
    assert_eq!(
        render("<#list 1..4 as i><#if i % 2 == 0><#continue></#if>${i}</#list>"),
        "13"
    );
}

#[test]
fn attempt_recovers_from_template_errors_only() {
    assert_eq!(render("a<#attempt>b${\"x\" - 1}<#recover>R</#attempt>c"), "aRc");
    assert_eq!(
        render("<#attempt><#attempt>${missing}<#recover>in</#attempt><#recover>out</#attempt>"),
        "in"
    );
    assert!(matches!(
        render_err("<#attempt><#stop \"s\"><#recover>R</#attempt>"),
        RenderError::Stopped { .. }
    ));
}

#[test]
fn html_output_escapes_once() {
    let config = Configuration::builder()
        .output_format(OutputFormat::Html)
        .build();
    let template = config
        .parse(
            "page.ftlh",
            "${s} ${s?no_esc} <#assign m><b>${s}</b></#assign>${m}",
        )
        .unwrap();
    let model = json::data_model_from_str(r#"{"s": "<&\">"}"#).unwrap();
    assert_eq!(
        template.render_to_string(model).unwrap(),
        "&lt;&amp;&quot;&gt; <&\"> <b>&lt;&amp;&quot;&gt;</b>"
    );
}

#[test]
fn square_tags_are_detected() {
    assert_eq!(render("[#if true]y[/#if][#list 1..2 as i]${i}[/#list]"), "y12");
}

#[test]
fn bracket_interpolation() {
    let config = Configuration::builder()
        .interpolation_syntax(InterpolationSyntax::Bracket)
        .build();
    let template = config.parse("t.ftl", "[=1 + 1] ${1 + 1}").unwrap();
    assert_eq!(template.render_to_string(empty()).unwrap(), "2 ${1 + 1}");
}

#[test]
fn json_data_models() {
    let data = r#"{"user": {"name": "Ann", "nick": null}, "xs": [3, 1, 2]}"#;
    assert_eq!(render_json("${user.name}", data), "Ann");
    assert_eq!(render_json("${user.nick!\"none\"}", data), "none");
    assert_eq!(render_json("${(user.nick??)?c} ${(user.name??)?c}", data), "false true");
    assert_eq!(render_json("${xs?sort?join(\", \")}", data), "1, 2, 3");
    assert_eq!(render_json("<#list user?keys as k>${k};</#list>", data), "name;nick;");
}

#[test]
fn macros_and_functions() {
    assert_eq!(
        render(
            "<#macro greet name=\"you\">Hi ${name}<#nested/>!</#macro>\
             <@greet/> <@greet name=\"Ann\">.</@greet>"
        ),
        "Hi you! Hi Ann.!"
    );
    assert_eq!(
        render("<#function twice x><#return x * 2></#function>${twice(21)}"),
        "42"
    );
}

#[test]
fn settings_change_formatting() {
    let config = Configuration::builder()
        .setting("number_format", "0.00")
        .unwrap()
        .build();
    let template = config
        .parse("t.ftl", "${1.5} <#setting number_format=\"0\">${1.5}")
        .unwrap();
    assert_eq!(template.render_to_string(empty()).unwrap(), "1.50 2");
}

fn ident() -> impl Strategy<Value = String> {
    prop_oneof![Just("a"), Just("b"), Just("xs"), Just("nope")].prop_map(str::to_owned)
}

fn expr() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        ident(),
        (0i64..100).prop_map(|n| n.to_string()),
        "[a-z ]{0,4}".prop_map(|s| format!("\"{s}\"")),
    ];
    leaf.prop_recursive(3, 12, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{a} + {b}")),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{a} * {b}")),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{a} lt {b}")),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({a})!{b}")),
            inner.clone().prop_map(|a| format!("({a})")),
            inner.clone().prop_map(|a| format!("({a})??")),
            inner.prop_map(|a| format!("({a})?string")),
        ]
    })
}

fn template() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        "[a-z ]{1,6}",
        expr().prop_map(|e| format!("${{{e}}}")),
        (ident(), expr()).prop_map(|(v, e)| format!("<#assign {v} = {e}>")),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        let body = prop::collection::vec(inner, 0..4).prop_map(|parts| parts.concat());
        prop_oneof![
            (expr(), body.clone(), body.clone())
                .prop_map(|(c, b, e)| format!("<#if {c}>{b}<#else>{e}</#if>")),
            body.clone()
                .prop_map(|b| format!("<#list xs as x>{b}<#sep>,</#sep></#list>")),
            body.clone()
                .prop_map(|b| format!("<#attempt>{b}<#recover>r</#attempt>")),
            body.prop_map(|b| format!("<#compress>{b}</#compress>")),
        ]
    })
}

proptest! {
    #[test]
    fn canonical_form_renders_the_same(source in template()) {
        let model = || json::data_model_from_str(r#"{"a": 1, "b": "B", "xs": [1, 2]}"#).unwrap();
        let Ok(original) = Configuration::default().parse("t.ftl", &source) else {
            return Ok(());
        };
        let reparsed = Configuration::default()
            .parse("t.ftl", &original.canonical())
            .unwrap();
        match (original.render_to_string(model()), reparsed.render_to_string(model())) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(_), Err(_)) => {}
            (a, b) => prop_assert!(false, "{:?} vs {:?}", a.is_ok(), b.is_ok()),
        }
    }
}
