#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use ftl_ir::{BuiltInTable, ElementKind};
use ftl_output::OutputFormatRegistry;

use crate::{parse, ParseErrorKind, ParsedTemplate, ParserSettings};

fn parse_with(source: &str, settings: &ParserSettings) -> Result<ParsedTemplate, ParseErrorKind> {
    parse(
        source,
        settings,
        &BuiltInTable::new(),
        &OutputFormatRegistry::standard(),
    )
    .map_err(|e| e.kind)
}

fn parse_template(source: &str) -> Result<ParsedTemplate, ParseErrorKind> {
    parse_with(source, &ParserSettings::default())
}

fn canonical(source: &str) -> String {
    parse_template(source).unwrap().canonical()
}

fn error(source: &str) -> ParseErrorKind {
    parse_template(source).unwrap_err()
}

mod structure {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn text_and_interpolations() {
        let t = parse_template("Hello ${name}!").unwrap();
        let kinds: Vec<&str> = t
            .ast
            .elements(t.root)
            .iter()
            .map(|id| t.ast.element(*id).kind.describe())
            .collect();
        assert_eq!(kinds, ["text", "${...}", "text"]);
        assert_eq!(t.canonical(), "Hello ${name}!");
    }

    #[test]
    fn if_elseif_else() {
        let source = "<#if a>1<#elseif b>2<#else>3</#if>";
        assert_eq!(canonical(source), source);
        let t = parse_template(source).unwrap();
        let ElementKind::If(arms) = t.ast.element(t.ast.elements(t.root)[0]).kind else {
            panic!("expected #if");
        };
        let arms = t.ast.if_arms(arms);
        assert_eq!(arms.len(), 3);
        assert!(!arms[2].cond.is_valid());
    }

    #[test]
    fn nested_blocks() {
        let source = "<#list xs as x><#if x>${x}</#if></#list>";
        assert_eq!(canonical(source), source);
    }

    #[test]
    fn comments_and_noparse() {
        assert_eq!(canonical("a<#-- note -->b"), "a<#-- note -->b");
        assert_eq!(
            canonical("<#noparse>${x}<#if></#noparse>"),
            "<#noparse>${x}<#if></#noparse>"
        );
    }

    #[test]
    fn square_bracket_syntax() {
        let t = parse_template("[#if x]${x}[/#if]").unwrap();
        assert_eq!(t.syntax, ftl_ir::TagSyntax::Square);
        assert_eq!(t.canonical(), "[#if x]${x}[/#if]");
    }

    #[test]
    fn whitespace_only_tag_lines_are_stripped() {
        assert_eq!(canonical("<#if x>\n  a\n</#if>\n"), "<#if x>  a\n</#if>");
        let keep = ParserSettings {
            strip_whitespace: false,
            ..ParserSettings::default()
        };
        let t = parse_with("<#if x>\n  a\n</#if>\n", &keep).unwrap();
        assert_eq!(t.canonical(), "<#if x>\n  a\n</#if>\n");
    }
}

mod end_tags {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unclosed_block() {
        assert_eq!(error("<#if x>a"), ParseErrorKind::UnclosedDirective("if"));
    }

    #[test]
    fn stray_end_tag() {
        assert_eq!(
            error("a</#if>"),
            ParseErrorKind::UnexpectedEndTag {
                found: "</#if>".into(),
                expected: None,
            }
        );
    }

    #[test]
    fn mismatched_end_tag() {
        assert_eq!(
            error("<#if x><#list xs as y></#if></#list>"),
            ParseErrorKind::UnexpectedEndTag {
                found: "</#if>".into(),
                expected: Some("</#list>".into()),
            }
        );
    }

    #[test]
    fn clause_outside_its_block() {
        assert_eq!(
            error("a<#else>b"),
            ParseErrorKind::MisplacedDirective {
                directive: "else",
                requirement: "must be inside #if or #list",
            }
        );
        assert_eq!(
            error("<#recover>"),
            ParseErrorKind::MisplacedDirective {
                directive: "recover",
                requirement: "must be inside #attempt",
            }
        );
    }

    #[test]
    fn else_after_else() {
        assert!(matches!(
            error("<#if a>1<#else>2<#else>3</#if>"),
            ParseErrorKind::MisplacedDirective {
                directive: "else",
                ..
            }
        ));
    }
}

mod strip_text {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn root_text_is_dropped() {
        let t = parse_template("<#ftl strip_text=true>\nJunk <#if x>kept</#if> more").unwrap();
        assert_eq!(t.canonical(), "<#ftl strip_text=true><#if x>kept</#if>");
    }
}
