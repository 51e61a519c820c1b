#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use ftl_ir::{BuiltInTable, ElementKind, ExprKind};
use ftl_output::{OutputFormat, OutputFormatRegistry};

use crate::{parse, ParseErrorKind, ParsedTemplate, ParserSettings};

fn parse_template(source: &str) -> Result<ParsedTemplate, ParseErrorKind> {
    parse(
        source,
        &ParserSettings::default(),
        &BuiltInTable::new(),
        &OutputFormatRegistry::standard(),
    )
    .map_err(|e| e.kind)
}

fn canonical(source: &str) -> String {
    parse_template(source).unwrap().canonical()
}

fn error(source: &str) -> ParseErrorKind {
    parse_template(source).unwrap_err()
}

fn misplaced(directive: &'static str, requirement: &'static str) -> ParseErrorKind {
    ParseErrorKind::MisplacedDirective {
        directive,
        requirement,
    }
}

/// Format and auto-escaping recorded on every interpolation, in order.
fn interpolation_modes(t: &ParsedTemplate) -> Vec<(OutputFormat, bool)> {
    let mut modes = Vec::new();
    for index in 0..t.ast.element_count() {
        let id = ftl_ir::ElementId::new(u32::try_from(index).unwrap());
        if let ElementKind::Interpolation {
            format,
            auto_escape,
            ..
        } = t.ast.element(id).kind
        {
            modes.push((format, auto_escape));
        }
    }
    modes
}

mod list {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn list_with_else_and_sep() {
        let source = "<#list xs as x>${x}<#sep>, </#sep><#else>none</#list>";
        assert_eq!(canonical(source), source);
    }

    #[test]
    fn sep_end_tag_is_optional() {
        assert_eq!(
            canonical("<#list xs as x>${x}<#sep>, </#list>"),
            "<#list xs as x>${x}<#sep>, </#sep></#list>"
        );
    }

    #[test]
    fn hash_listing_binds_key_and_value() {
        let source = "<#list h as k, v>${k}=${v}</#list>";
        assert_eq!(canonical(source), source);
    }

    #[test]
    fn loop_variable_builtins_inside_loop() {
        let source = "<#list xs as x>${x?index}${x?item_cycle(\"a\", \"b\")}</#list>";
        assert_eq!(canonical(source), source);
    }

    #[test]
    fn loop_variables_do_not_leak() {
        assert_eq!(
            error("<#list xs as x></#list>${x?index}"),
            ParseErrorKind::NotALoopVariable {
                builtin: "index",
                name: "x".into(),
            }
        );
    }

    #[test]
    fn items_inside_list_without_as() {
        let source = "<#list xs><ul><#items as x><li>${x}</#items></ul><#else>empty</#list>";
        assert_eq!(canonical(source), source);
    }

    #[test]
    fn list_without_as_needs_items() {
        assert_eq!(error("<#list xs>x</#list>"), ParseErrorKind::MissingItems);
    }

    #[test]
    fn items_and_sep_placement() {
        assert_eq!(
            error("<#items as x></#items>"),
            misplaced("items", "must be inside a #list that has no `as`")
        );
        assert_eq!(
            error("<#sep>"),
            misplaced("sep", "must be inside #list ... as or #items")
        );
        assert_eq!(
            error("<#list xs><#sep></#sep><#items as x></#items></#list>"),
            misplaced("sep", "must be inside #list ... as or #items")
        );
    }

    #[test]
    fn break_and_continue_need_a_loop() {
        assert_eq!(
            canonical("<#list xs as x><#if x><#break></#if><#continue></#list>"),
            "<#list xs as x><#if x><#break></#if><#continue></#list>"
        );
        assert_eq!(
            error("<#break>"),
            misplaced("break", "must be inside #list or #switch")
        );
        assert_eq!(error("<#continue>"), misplaced("continue", "must be inside #list"));
    }

    #[test]
    fn loop_context_does_not_cross_macro_bodies() {
        assert_eq!(
            error("<#list xs as x><#macro m><#break></#macro></#list>"),
            misplaced("break", "must be inside #list or #switch")
        );
        assert_eq!(
            error("<#list xs as x><@m><#continue></@m></#list>"),
            misplaced("continue", "must be inside #list")
        );
    }
}

mod switch {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn case_with_default() {
        let source = "<#switch x><#case 1>one<#break><#case 2, 3>few<#default>many</#switch>";
        assert_eq!(canonical(source), source);
    }

    #[test]
    fn on_arms() {
        let source = "<#switch x><#on 1>one<#on 2>two</#switch>";
        assert_eq!(canonical(source), source);
    }

    #[test]
    fn whitespace_before_first_case_is_dropped() {
        assert_eq!(
            canonical("<#switch x>  <#case 1>a</#switch>"),
            "<#switch x><#case 1>a</#switch>"
        );
    }

    #[test]
    fn errors() {
        assert_eq!(
            error("<#switch x><#case 1>a<#on 2>b</#switch>"),
            ParseErrorKind::MixedCaseAndOn
        );
        assert_eq!(
            error("<#switch x><#default>a<#default>b</#switch>"),
            ParseErrorKind::DuplicateDefault
        );
        assert_eq!(
            error("<#switch x>oops<#case 1>a</#switch>"),
            ParseErrorKind::TextInSwitch
        );
        assert_eq!(
            error("<#switch x><#case 1>a"),
            ParseErrorKind::UnclosedDirective("switch")
        );
        assert_eq!(error("<#case 1>"), misplaced("case", "must be inside #switch"));
    }
}

mod attempt {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn attempt_recover() {
        let source = "<#attempt>${x}<#recover>failed</#attempt>";
        assert_eq!(canonical(source), source);
    }

    #[test]
    fn recover_is_required() {
        assert_eq!(
            error("<#attempt>x</#attempt>"),
            ParseErrorKind::MissingClause {
                directive: "attempt",
                clause: "recover",
            }
        );
    }
}

mod assignment {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn several_assignments_in_one_tag() {
        assert_eq!(
            canonical("<#assign a = 1, b += 2 c++>"),
            "<#assign a = 1 b += 2 c++>"
        );
    }

    #[test]
    fn single_equals_assigns_not_compares() {
        let t = parse_template("<#assign a = b = c>").unwrap_err();
        assert!(matches!(t, ParseErrorKind::UnexpectedToken { .. }));
        assert_eq!(canonical("<#assign a = (b = c)>"), "<#assign a = (b == c)>");
    }

    #[test]
    fn quoted_target() {
        assert_eq!(canonical("<#global \"x\" = 1>"), "<#global x = 1>");
    }

    #[test]
    fn capture_form() {
        let source = "<#assign x>Hi ${name}</#assign>";
        assert_eq!(canonical(source), source);
    }

    #[test]
    fn local_needs_a_macro() {
        assert_eq!(
            error("<#local x = 1>"),
            misplaced("local", "must be inside #macro or #function")
        );
        let source = "<#function f><#local x = 1><#return x></#function>";
        assert_eq!(canonical(source), source);
    }
}

mod macros {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn definition_with_defaults_and_catch_all() {
        let source =
            "<#macro greet name greeting=\"Hi\" rest...>${greeting} ${name}<#nested name></#macro>";
        let t = parse_template(source).unwrap();
        assert_eq!(t.canonical(), source);
        assert_eq!(t.macros.len(), 1);
    }

    #[test]
    fn parenthesized_parameters() {
        assert_eq!(
            canonical("<#function add(a, b)><#return a + b></#function>"),
            "<#function add a b><#return a + b></#function>"
        );
    }

    #[test]
    fn catch_all_must_be_last() {
        assert!(matches!(
            error("<#macro m rest... x></#macro>"),
            ParseErrorKind::UnexpectedToken { .. }
        ));
    }

    #[test]
    fn definitions_do_not_nest() {
        assert_eq!(
            error("<#macro a><#macro b></#macro></#macro>"),
            ParseErrorKind::NestedMacro
        );
    }

    #[test]
    fn nested_and_return_placement() {
        assert_eq!(error("<#nested>"), misplaced("nested", "must be inside #macro"));
        assert_eq!(
            error("<#return>"),
            misplaced("return", "must be inside #macro or #function")
        );
        assert_eq!(
            error("<#macro m><#return 1></#macro>"),
            misplaced("return", "with a value must be inside #function")
        );
        assert_eq!(
            error("<#function f><#nested></#function>"),
            misplaced("nested", "must be inside #macro")
        );
    }
}

mod user_calls {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn named_arguments_and_loop_variables() {
        assert_eq!(
            canonical("<@greet name=\"Ann\" n=1; x, y>body</@greet>"),
            "<@greet name=\"Ann\" n=1; x, y>body</@>"
        );
    }

    #[test]
    fn positional_arguments() {
        assert_eq!(canonical("<@greet \"Ann\", 2/>"), "<@greet \"Ann\", 2/>");
    }

    #[test]
    fn equality_inside_named_argument() {
        let t = parse_template("<@m a=b == c/>").unwrap();
        let ElementKind::UserCall { args, .. } = t.ast.element(t.ast.elements(t.root)[0]).kind
        else {
            panic!("expected a call");
        };
        let value = t.ast.args(args)[0].value;
        assert!(matches!(t.ast.expr(value).kind, ExprKind::Cmp { .. }));
    }

    #[test]
    fn dotted_callee_and_empty_end_tag() {
        assert_eq!(canonical("<@lib.box>x</@>"), "<@lib.box>x</@>");
        assert_eq!(canonical("<@lib.box>x</@lib.box>"), "<@lib.box>x</@>");
    }

    #[test]
    fn end_tag_must_match() {
        assert_eq!(
            error("<@a>x</@b>"),
            ParseErrorKind::UnexpectedEndTag {
                found: "</@b>".into(),
                expected: Some("</@a>".into()),
            }
        );
        assert_eq!(error("<@a>x"), ParseErrorKind::UnclosedCall("a".into()));
    }
}

mod output_formats {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn header_sets_format_and_auto_escaping() {
        let t = parse_template("<#ftl output_format=\"HTML\">${x}").unwrap();
        assert_eq!(t.output_format, OutputFormat::Html);
        assert!(t.auto_escape);
        assert_eq!(interpolation_modes(&t), [(OutputFormat::Html, true)]);
    }

    #[test]
    fn header_auto_esc_policy() {
        let t = parse_template("<#ftl outputFormat=\"XML\" auto_esc=false>${x}").unwrap();
        assert_eq!(interpolation_modes(&t), [(OutputFormat::Xml, false)]);
    }

    #[test]
    fn nested_format_blocks() {
        let t = parse_template(concat!(
            "${a}",
            "<#outputformat \"HTML\">${b}<#noautoesc>${c}<#autoesc>${d}</#autoesc>\
             </#noautoesc></#outputformat>",
            "${e}",
        ))
        .unwrap();
        assert_eq!(
            interpolation_modes(&t),
            [
                (OutputFormat::Undefined, false),
                (OutputFormat::Html, true),
                (OutputFormat::Html, false),
                (OutputFormat::Html, true),
                (OutputFormat::Undefined, false),
            ]
        );
    }

    #[test]
    fn format_errors() {
        assert_eq!(
            error("<#autoesc>x</#autoesc>"),
            ParseErrorKind::AutoEscNotMarkup("undefined")
        );
        assert_eq!(
            error("<#outputformat \"nope\">x</#outputformat>"),
            ParseErrorKind::UnknownOutputFormat("nope".into())
        );
        assert_eq!(
            error("<#outputformat x>y</#outputformat>"),
            ParseErrorKind::InvalidParamValue {
                param: "#outputformat parameter".into(),
                expected: "a string literal",
            }
        );
        assert_eq!(
            error("<#noautoesc x>y</#noautoesc>"),
            ParseErrorKind::UnexpectedParams("noautoesc")
        );
    }

    #[test]
    fn header_errors() {
        assert_eq!(error("a<#ftl>"), ParseErrorKind::HeaderNotFirst);
        assert_eq!(
            error("<#ftl foo=1>"),
            ParseErrorKind::UnknownHeaderParam("foo".into())
        );
        assert_eq!(
            error("<#ftl strip_text=\"yes\">"),
            ParseErrorKind::InvalidParamValue {
                param: "strip_text".into(),
                expected: "a boolean literal",
            }
        );
        assert!(parse_template("  \n<#ftl encoding=\"UTF-8\">x").is_ok());
    }
}

mod misc {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn settings_use_snake_case_names() {
        assert_eq!(
            canonical("<#setting numberFormat=\"0.00\">"),
            "<#setting number_format=\"0.00\">"
        );
        assert_eq!(
            error("<#setting colour=\"red\">"),
            ParseErrorKind::UnknownSetting("colour".into())
        );
    }

    #[test]
    fn stop_flush_compress() {
        let source = "<#compress>a<#flush><#stop \"done\"></#compress><#stop>";
        assert_eq!(canonical(source), source);
        assert_eq!(error("<#flush 1>"), ParseErrorKind::UnexpectedParams("flush"));
    }
}
