#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use chrono::TimeZone as _;
use ftl_ir::BuiltInTable;
use ftl_output::OutputFormatRegistry;
use ftl_parse::{parse, ParserSettings};

use crate::model::{ModelResult, SequenceModel, TemplateModel};
use crate::{DateKind, DateValue, TemplateErrorKind};

fn render_full(
    source: &str,
    model: SimpleHash,
    parser: &ParserSettings,
) -> (String, Result<(), RenderError>) {
    let template = parse(
        source,
        parser,
        &BuiltInTable::new(),
        &OutputFormatRegistry::standard(),
    )
    .unwrap();
    let mut out = Vec::new();
    let result = Environment::new(&template, source, Value::hash(model), &mut out).process();
    (String::from_utf8(out).unwrap(), result)
}

fn render_model(source: &str, model: SimpleHash) -> String {
    let (out, result) = render_full(source, model, &ParserSettings::default());
    if let Err(error) = result {
        panic!("rendering {source:?} failed: {error}");
    }
    out
}

fn render(source: &str) -> String {
    render_model(source, model())
}

fn error(source: &str) -> TemplateError {
    match render_full(source, model(), &ParserSettings::default()).1 {
        Err(RenderError::Template(error)) => error,
        other => panic!("expected a template error from {source:?}, got {other:?}"),
    }
}

fn model() -> SimpleHash {
    let mut user = SimpleHash::new();
    user.insert("name", Value::from("Ann"));
    user.insert("age", Value::int(31));
    let mut model = SimpleHash::new();
    model.insert("user", Value::hash(user));
    model.insert("xs", Value::from(vec![Value::int(1), Value::int(2), Value::int(3)]));
    model.insert("empty", Value::from(Vec::new()));
    model.insert("html", Value::from("<a href='x'>"));
    model
}

mod interpolation {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn data_model_and_literals() {
        assert_eq!(render("Hi ${user.name}!"), "Hi Ann!");
        assert_eq!(render("${\"Age: ${user.age}\"}"), "Age: 31");
        assert_eq!(render("${user[\"name\"]}"), "Ann");
    }

    #[test]
    fn missing_values_are_errors() {
        let e = error("a ${missing} b");
        assert!(matches!(
            e.kind,
            TemplateErrorKind::InvalidReference { fast: false }
        ));
        assert_eq!(e.blamed.as_deref(), Some("missing"));
        assert!(!e.stack.is_empty());
    }

    #[test]
    fn output_before_an_error_is_written() {
        let (out, result) = render_full("before ${missing}", model(), &ParserSettings::default());
        assert_eq!(out, "before ");
        assert!(result.is_err());
    }

    #[test]
    fn default_and_exists_operators() {
        assert_eq!(render("${missing!\"d\"}"), "d");
        assert_eq!(render("[${missing!}]"), "[]");
        assert_eq!(render("<#if missing??>y<#else>n</#if>"), "n");
        assert_eq!(render("<#if user.name??>y<#else>n</#if>"), "y");
        assert_eq!(render("${(nope.deeper.still)!\"-\"}"), "-");
        assert_eq!(render("${missing?default(\"x\")}"), "x");
        assert_eq!(render("${missing?has_content?c}"), "false");
    }

    #[test]
    fn unparenthesized_default_guards_only_the_last_step() {
        let e = error("${nope.name!\"-\"}");
        assert!(e.is_invalid_reference());
    }

    #[test]
    fn booleans_need_a_format() {
        let e = error("${true}");
        assert_eq!(e.kind, TemplateErrorKind::Unformattable);
        assert_eq!(render("${true?c}"), "true");
        assert_eq!(render("${false?string(\"y\", \"n\")}"), "n");
        assert_eq!(render("<#setting boolean_format=\"yes,no\">${false}"), "no");
    }

    #[test]
    fn data_model_must_be_a_hash() {
        let source = "x";
        let template = parse(
            source,
            &ParserSettings::default(),
            &BuiltInTable::new(),
            &OutputFormatRegistry::standard(),
        )
        .unwrap();
        let mut out = Vec::new();
        let result = Environment::new(&template, source, Value::int(1), &mut out).process();
        assert!(matches!(result, Err(RenderError::Template(_))));
        assert!(out.is_empty());
    }
}

mod numbers {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_number_format() {
        assert_eq!(render("${1234.5}"), "1,234.5");
        assert_eq!(render("${10 / 4}"), "2.5");
        assert_eq!(render("${7 % 3}"), "1");
        assert_eq!(render("${1234?c}"), "1234");
        assert_eq!(render("<#setting number_format=\"0.00\">${1.5}"), "1.50");
        assert_eq!(render("${3?string(\"000\")}"), "003");
    }

    #[test]
    fn division_by_zero_fails() {
        let e = error("${1 / 0}");
        assert!(matches!(e.kind, TemplateErrorKind::Arithmetic(_)));
    }

    #[test]
    fn rounding_builtins() {
        assert_eq!(render("${2.5?round} ${(-1.5)?round}"), "3 -1");
        assert_eq!(render("${2.7?floor} ${2.1?ceiling} ${(-2.7)?int}"), "2 3 -2");
        assert_eq!(render("${28?lower_abc} ${3?upper_abc}"), "ab C");
    }

    #[test]
    fn strings_parse_to_numbers() {
        assert_eq!(render("${\"1.5\"?number + 1}"), "2.5");
        assert!(error("${\"x\"?number}").message.contains("number"));
    }
}

mod strings {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn case_and_trimming() {
        assert_eq!(render("${\"abc\"?upper_case}"), "ABC");
        assert_eq!(render("${\"hello world\"?capitalize}"), "Hello World");
        assert_eq!(render("${\"  x \"?trim}|"), "x|");
        assert_eq!(render("${\"Abc\"?uncap_first}"), "abc");
    }

    #[test]
    fn searching_and_slicing() {
        assert_eq!(render("${\"Hello\"?index_of(\"l\")}"), "2");
        assert_eq!(render("${\"Hello\"?last_index_of(\"l\")}"), "3");
        assert_eq!(render("${\"abc\"?length}"), "3");
        assert_eq!(render("${\"abc\"[1]}"), "b");
        assert_eq!(render("${\"abcdef\"[1..3]}"), "bcd");
        assert_eq!(render("${\"abc\"[1..*10]}"), "bc");
        assert!(error("${\"abc\"[1..9]}").message.contains("out of bounds"));
        assert_eq!(render("${\"a.b.c\"?keep_after(\".\")}"), "b.c");
        assert_eq!(render("${\"a.b.c\"?keep_before_last(\".\")}"), "a.b");
    }

    #[test]
    fn replacing_and_splitting() {
        assert_eq!(render("${\"hello\"?replace(\"l\", \"L\")}"), "heLLo");
        assert_eq!(render("${\"a1b22\"?replace(\"[0-9]+\", \"#\", \"r\")}"), "a#b#");
        assert_eq!(render("${\"a,b,,c\"?split(\",\")?size}"), "4");
        assert_eq!(render("${\"abc\"?split(\"\")?join(\"-\")}"), "a-b-c");
        assert_eq!(render("${\"abc\"?left_pad(5, \"-\")}"), "--abc");
        assert_eq!(render("${\"abc\"?right_pad(4)}|"), "abc |");
    }

    #[test]
    fn matching_is_whole_string() {
        assert_eq!(render("${\"abc\"?matches(\"[a-c]+\")?c}"), "true");
        assert_eq!(render("${\"abcd\"?matches(\"[a-c]+\")?c}"), "false");
    }

    #[test]
    fn concatenation_formats_numbers() {
        assert_eq!(render("${\"a\" + 1}"), "a1");
        assert_eq!(render("${\"n=\" + 1234}"), "n=1,234");
    }

    #[test]
    fn c_quotes_strings() {
        assert_eq!(render("${\"a\\\"b\"?c}"), "\"a\\\"b\"");
    }
}

mod sequences {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sorting() {
        assert_eq!(render("${[3, 1, 2]?sort?join(\",\")}"), "1,2,3");
        assert_eq!(render("${[\"b\", \"a\", \"A\"]?sort?join(\",\")}"), "A,a,b");
        assert_eq!(
            render("${[{\"n\": 2}, {\"n\": 1}]?sort_by(\"n\")?map(h -> h.n)?join(\",\")}"),
            "1,2"
        );
        assert!(error("${[1, \"a\"]?sort?size}").message.contains("different types"));
    }

    #[test]
    fn lambdas() {
        assert_eq!(render("${xs?filter(x -> x % 2 == 1)?join(\",\")}"), "1,3");
        assert_eq!(render("${xs?map(x -> x * 10)?join(\",\")}"), "10,20,30");
        assert_eq!(render("${xs?take_while(x -> x < 3)?join(\",\")}"), "1,2");
        assert_eq!(render("${xs?drop_while(x -> x < 2)?join(\",\")}"), "2,3");
    }

    #[test]
    fn functions_as_callbacks() {
        let source = "<#function odd n><#return n % 2 == 1></#function>\
                      ${xs?filter(odd)?join(\",\")}";
        assert_eq!(render(source), "1,3");
    }

    #[test]
    fn access_and_shape() {
        assert_eq!(render("${xs?first} ${xs?last} ${xs?size}"), "1 3 3");
        assert_eq!(render("${empty?first!\"none\"}"), "none");
        assert_eq!(render("${xs?reverse?join(\"\")}"), "321");
        assert_eq!(render("${[1, 2, 3, 4, 5]?chunk(2)?size}"), "3");
        assert_eq!(render("${[1, 2, 3]?chunk(2, 0)?last?join(\",\")}"), "3,0");
        assert_eq!(render("${[4, 9, 2]?max} ${[4, 9, 2]?min}"), "9 2");
        assert_eq!(render("${xs?seq_contains(2)?c}"), "true");
        assert_eq!(render("${xs?seq_index_of(3)}"), "2");
        assert_eq!(render("${empty?join(\",\", \"-\")}"), "-");
        assert_eq!(render("${xs[1..]?join(\",\")}"), "2,3");
    }

    #[test]
    fn concatenation() {
        assert_eq!(render("${([1] + [2, 3])?size}"), "3");
        assert_eq!(render("${({\"a\": 1} + {\"b\": 2})?keys?join(\",\")}"), "a,b");
    }

    #[test]
    fn ranges() {
        assert_eq!(render("${(1..3)?join(\",\")}"), "1,2,3");
        assert_eq!(render("${(3..1)?join(\",\")}"), "3,2,1");
        assert_eq!(render("${(1..<3)?join(\",\")}"), "1,2");
        assert_eq!(render("${(5..*2)?join(\",\")}"), "5,6");
        assert!(error("${(1..)?size}").message.contains("unbounded"));
    }

    #[test]
    fn unbounded_ranges_cannot_be_collected() {
        let e = error("${(1..)?reverse?first}");
        assert_eq!(e.kind, TemplateErrorKind::Custom);
        assert!(e.message.contains("right-unbounded range (1..)"));
        assert!(!e.message.contains("data model"));
    }

    #[test]
    fn hash_keys_and_values() {
        assert_eq!(render("${user?keys?join(\",\")}"), "name,age");
        assert_eq!(render("${user?values?join(\",\")}"), "Ann,31");
    }
}

mod directives {
    use super::*;
    use crate::env::elements::compress;
    use pretty_assertions::assert_eq;

    #[test]
    fn list_with_sep_and_else() {
        assert_eq!(
            render("<#list xs as x>${x?index}:${x}<#sep>, </#list>"),
            "0:1, 1:2, 2:3"
        );
        assert_eq!(render("<#list empty as x>x<#else>none</#list>"), "none");
        assert_eq!(
            render("<#list user as k, v>${k}=${v};</#list>"),
            "name=Ann;age=31;"
        );
    }

    #[test]
    fn loop_variable_builtins() {
        assert_eq!(
            render("<#list xs as x>${x?counter}${x?item_parity}${x?has_next?c} </#list>"),
            "1oddtrue 2eventrue 3oddfalse "
        );
        assert_eq!(
            render("<#list xs as x>${x?item_cycle(\"a\", \"b\")}</#list>"),
            "aba"
        );
    }

    #[test]
    fn outer_loop_variables_keep_their_own_index() {
        assert_eq!(
            render("<#list 1..3 as x><#list 1..2 as y>${x?index}${y?index} </#list></#list>"),
            "00 01 10 11 20 21 "
        );
        assert_eq!(
            render("<#list xs as x><#list 1..2 as x>${x?counter}</#list>${x?counter};</#list>"),
            "121;122;123;"
        );
    }

    #[derive(Debug)]
    struct Holes;

    impl SequenceModel for Holes {
        fn get(&self, index: usize) -> ModelResult<Option<Value>> {
            Ok((index == 1).then(|| Value::from("b")))
        }

        fn size(&self) -> ModelResult<usize> {
            Ok(2)
        }
    }

    impl TemplateModel for Holes {
        fn as_sequence(&self) -> Option<&dyn SequenceModel> {
            Some(self)
        }
    }

    #[test]
    fn null_loop_variable_hides_outer_variable() {
        let mut data = model();
        data.insert("x", Value::from("outer"));
        data.insert("holes", Value::adapted(Holes));
        assert_eq!(
            render_model("<#list holes as x>${x!'NULL'} </#list>${x}", data.clone()),
            "NULL b outer"
        );
        assert_eq!(
            render_model("<#list holes as x>${(x??)?c} </#list>", data),
            "false true "
        );
    }

    #[test]
    fn items_and_break() {
        assert_eq!(
            render("<#list xs>[<#items as x>${x}</#items>]<#else>empty</#list>"),
            "[123]"
        );
        assert_eq!(
            render("<#list empty>[<#items as x>${x}</#items>]<#else>empty</#list>"),
            "empty"
        );
        assert_eq!(
            render("<#list 1..5 as i><#if i == 3><#break></#if>${i}</#list>"),
            "12"
        );
        assert_eq!(
            render("<#list 1..4 as i><#if i == 2><#continue></#if>${i}</#list>"),
            "134"
        );
    }

    #[test]
    fn switch_falls_through_cases() {
        let source = "<#switch n><#case 1>one<#case 2>two<#break><#default>many</#switch>";
        assert_eq!(render(&source.replace("n>", "1>")), "onetwo");
        assert_eq!(render(&source.replace("n>", "2>")), "two");
        assert_eq!(render(&source.replace("n>", "5>")), "many");
    }

    #[test]
    fn switch_on_runs_one_arm() {
        let source = "<#switch 1><#on 1>one<#on 2>two<#default>d</#switch>";
        assert_eq!(render(source), "one");
        assert_eq!(render("<#switch 3><#on 1, 2>low<#default>d</#switch>"), "d");
    }

    #[test]
    fn attempt_discards_partial_output() {
        assert_eq!(
            render("a<#attempt>b${missing}<#recover>r</#attempt>c"),
            "arc"
        );
        assert_eq!(
            render("<#attempt>${missing}<#recover><#if .error?has_content>E</#if></#attempt>"),
            "E"
        );
        assert_eq!(render("<#attempt>ok<#recover>r</#attempt>"), "ok");
    }

    #[test]
    fn assignments() {
        assert_eq!(render("<#assign n = 1><#assign n += 2 n++>${n}"), "4");
        assert_eq!(render("<#assign s>Hi ${user.name}</#assign>${s?length}"), "6");
        assert_eq!(
            render("<#assign x = 1><#macro m><#local x = 2>${x}</#macro><@m/>${x}"),
            "21"
        );
        assert_eq!(
            render("<#macro m><#global g = \"G\"></#macro><@m/>${g}"),
            "G"
        );
    }

    #[test]
    fn compress_collapses_whitespace() {
        assert_eq!(compress("  a   b \n\n c  "), "a b\nc");
        assert_eq!(compress("x"), "x");
        assert_eq!(compress(" \t\n "), "");
        assert_eq!(render("<#compress>  a   b  </#compress>"), "a b");
    }

    #[test]
    fn stop_ends_the_render() {
        let (out, result) = render_full("a<#stop \"done\">b", model(), &ParserSettings::default());
        assert_eq!(out, "a");
        assert!(matches!(
            result,
            Err(RenderError::Stopped { message: Some(m) }) if m == "done"
        ));
    }

    #[test]
    fn interrupt_flag_aborts() {
        let source = "<#list 1..3 as i>${i}</#list>";
        let template = parse(
            source,
            &ParserSettings::default(),
            &BuiltInTable::new(),
            &OutputFormatRegistry::standard(),
        )
        .unwrap();
        let mut out = Vec::new();
        let flag = Arc::new(AtomicBool::new(true));
        let result = Environment::new(&template, source, Value::hash(model()), &mut out)
            .with_interrupt(flag)
            .process();
        assert!(matches!(result, Err(RenderError::Interrupted)));
    }

    #[test]
    fn unknown_setting_fails() {
        assert!(error("<#setting time_zone=\"Mars/Base\">").message.contains("time_zone"));
    }
}

mod macros {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn named_and_positional_arguments() {
        let def = "<#macro greet name greeting=\"Hi\">${greeting} ${name}</#macro>";
        assert_eq!(render(&format!("{def}<@greet name=\"Ann\"/>")), "Hi Ann");
        assert_eq!(render(&format!("{def}<@greet \"Bo\" \"Yo\"/>")), "Yo Bo");
        assert!(error(&format!("{def}<@greet/>")).message.contains("name"));
        assert!(error(&format!("{def}<@greet name=1 colour=2/>"))
            .message
            .contains("colour"));
    }

    #[test]
    fn catch_all_parameter() {
        let source = "<#macro m a rest...>${a}:${rest?size}</#macro><@m 1 2 3/>";
        assert_eq!(render(source), "1:2");
        let source = "<#macro m a rest...>${rest?keys?join(\",\")}</#macro><@m a=1 b=2 c=3/>";
        assert_eq!(render(source), "b,c");
    }

    #[test]
    fn null_nested_parameter_hides_outer_variable() {
        let mut data = model();
        data.insert("x", Value::from("outer"));
        let source = "<#macro m><#nested nothing>,<#nested \"in\"></#macro>\
                      <@m ; x>${x!\"NULL\"}</@m>;${x}";
        assert_eq!(render_model(source, data), "NULL,in;outer");
    }

    #[test]
    fn nested_content_with_loop_variables() {
        let source = "<#macro twice><#nested 1>,<#nested 2></#macro><@twice ; n>[${n}]</@twice>";
        assert_eq!(render(source), "[1],[2]");
    }

    #[test]
    fn nested_content_sees_the_caller_scope() {
        let source = "<#macro m><#local v = \"inner\"><#nested></#macro>\
                      <#assign v = \"outer\"><@m>${v}</@m>";
        assert_eq!(render(source), "outer");
    }

    #[test]
    fn macros_defined_later_are_callable() {
        assert_eq!(render("<@late/><#macro late>L</#macro>"), "L");
    }

    #[test]
    fn return_leaves_the_macro() {
        assert_eq!(render("<#macro m>a<#return>b</#macro><@m/>c"), "ac");
    }

    #[test]
    fn functions() {
        let source = "<#function double x><#return x * 2></#function>${double(21)}";
        assert_eq!(render(source), "42");
        let source = "<#function f>ignored<#return \"r\"></#function>${f()}";
        assert_eq!(render(source), "r");
        assert!(error("<#function f></#function>${f()}")
            .message
            .contains("#return"));
    }

    #[test]
    fn deep_recursion_is_an_ordinary_render() {
        let source = "<#function sum n><#if n == 0><#return 0></#if>\
                      <#return n + sum(n - 1)></#function>${sum(500)}";
        assert_eq!(render(source), "125,250");
    }
}

mod escaping {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render_html(source: &str) -> String {
        let parser = ParserSettings {
            output_format: OutputFormat::Html,
            ..ParserSettings::default()
        };
        let (out, result) = render_full(source, model(), &parser);
        result.unwrap();
        out
    }

    #[test]
    fn auto_escaping_in_html() {
        assert_eq!(render_html("${html}"), "&lt;a href=&#39;x&#39;&gt;");
        assert_eq!(render_html("${html?no_esc}"), "<a href='x'>");
        assert_eq!(render_html("<#noautoesc>${html}</#noautoesc>"), "<a href='x'>");
    }

    #[test]
    fn markup_concatenation_escapes_the_plain_side() {
        assert_eq!(render_html("${\"<b>\"?no_esc + \"<\"}"), "<b>&lt;");
    }

    #[test]
    fn undefined_format_prints_as_is() {
        assert_eq!(render("${html}"), "<a href='x'>");
        assert_eq!(render("${\"<\"?html}"), "&lt;");
    }
}

mod dates {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dated() -> SimpleHash {
        let mut model = SimpleHash::new();
        let instant = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        model.insert("d", Value::Date(DateValue::new(instant, DateKind::DateTime)));
        model
    }

    #[test]
    fn formatting_by_kind() {
        assert_eq!(render_model("${d}", dated()), "2024-01-02 03:04:05");
        assert_eq!(render_model("${d?date}", dated()), "2024-01-02");
        assert_eq!(render_model("${d?time}", dated()), "03:04:05");
        assert_eq!(render_model("${d?string(\"yyyy/MM/dd\")}", dated()), "2024/01/02");
        assert_eq!(render_model("${d?iso_utc}", dated()), "2024-01-02T03:04:05Z");
    }

    #[test]
    fn parsing_strings() {
        assert_eq!(
            render("${\"2024-05-06\"?date?string(\"dd.MM.yyyy\")}"),
            "06.05.2024"
        );
        assert_eq!(
            render("${\"06/05/2024\"?date(\"dd/MM/yyyy\")?string(\"yyyy-MM-dd\")}"),
            "2024-05-06"
        );
    }

    #[test]
    fn time_zone_setting_shifts_output() {
        let source = "<#setting time_zone=\"+02:00\">${d}";
        assert_eq!(render_model(source, dated()), "2024-01-02 05:04:05");
    }
}

mod comparison {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numbers_compare_by_value() {
        assert_eq!(render("<#if 1 == 1.0>eq</#if>"), "eq");
        assert_eq!(render("<#if 2 gt 1 && 1 lt 2>ok</#if>"), "ok");
    }

    #[test]
    fn mismatched_types_fail() {
        assert!(render_full("<#if \"1\" == 1>x</#if>", model(), &ParserSettings::default())
            .1
            .is_err());
        assert!(render_full("<#if \"a\" lt \"b\">x</#if>", model(), &ParserSettings::default())
            .1
            .is_err());
    }

    #[test]
    fn then_and_switch_builtins() {
        assert_eq!(render("${(1 < 2)?then(\"y\", \"n\")}"), "y");
        assert_eq!(render("${2?switch(1, \"one\", 2, \"two\", \"other\")}"), "two");
        assert_eq!(render("${9?switch(1, \"one\", \"other\")}"), "other");
    }
}
