#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use pretty_assertions::assert_eq;

fn pieces(src: &str) -> Vec<Piece> {
    scan(src, TagSyntax::AutoDetect, InterpolationSyntax::Dollar)
        .unwrap()
        .pieces
}

fn text<'a>(src: &'a str, span: Span) -> &'a str {
    &src[span.to_range()]
}

#[test]
fn plain_text_is_one_piece() {
    let src = "Hello <b>world</b> $5 [x]";
    assert_eq!(pieces(src), vec![Piece::Text(Span::new(0, 25))]);
}

#[test]
fn interpolation_splits_text() {
    let src = "Hi ${user.name}!";
    let got = pieces(src);
    assert_eq!(got.len(), 3);
    let Piece::Interpolation { span, expr } = got[1] else {
        panic!("expected interpolation, got {:?}", got[1]);
    };
    assert_eq!(text(src, span), "${user.name}");
    assert_eq!(text(src, expr), "user.name");
    assert_eq!(got[2], Piece::Text(Span::new(15, 16)));
}

#[test]
fn braces_inside_interpolation_nest() {
    let src = "${{'a': 1}['a']}x";
    let got = pieces(src);
    let Piece::Interpolation { expr, .. } = got[0] else {
        panic!("expected interpolation");
    };
    assert_eq!(text(src, expr), "{'a': 1}['a']");
    assert_eq!(got[1], Piece::Text(Span::new(16, 17)));
}

#[test]
fn gt_inside_parens_or_strings_does_not_end_tag() {
    let src = r#"<#if (a > b) && c == ">">yes</#if>"#;
    let got = pieces(src);
    let Piece::Tag {
        directive,
        params,
        closing,
        ..
    } = got[0]
    else {
        panic!("expected tag");
    };
    assert_eq!(directive, Directive::If);
    assert!(!closing);
    assert_eq!(text(src, params), r#" (a > b) && c == ">""#);
    assert_eq!(text(src, got[1].span()), "yes");
    assert!(matches!(
        got[2],
        Piece::Tag {
            directive: Directive::If,
            closing: true,
            ..
        }
    ));
}

#[test]
fn gte_ends_angle_tag_at_gt() {
    let src = "<#if x>=y";
    let got = pieces(src);
    let Piece::Tag { span, params, .. } = got[0] else {
        panic!("expected tag");
    };
    assert_eq!(text(src, span), "<#if x>");
    assert_eq!(text(src, params), " x");
    assert_eq!(text(src, got[1].span()), "=y");
}

#[test]
fn self_closing_tags() {
    let src = "<#assign x = 1/><@box title='t'/>";
    let got = pieces(src);
    assert!(matches!(
        got[0],
        Piece::Tag {
            directive: Directive::Assign,
            self_closing: true,
            ..
        }
    ));
    let Piece::UserCall {
        params,
        self_closing,
        ..
    } = got[1]
    else {
        panic!("expected user call");
    };
    assert!(self_closing);
    assert_eq!(text(src, params), "box title='t'");
}

#[test]
fn user_call_end_names() {
    let src = "<@m>x</@m ></@>";
    let got = pieces(src);
    let Piece::UserCallEnd { name, .. } = got[2] else {
        panic!("expected end tag");
    };
    assert_eq!(text(src, name), "m");
    let Piece::UserCallEnd { name, .. } = got[3] else {
        panic!("expected end tag");
    };
    assert!(name.is_empty());
}

#[test]
fn comments_and_noparse() {
    let src = "a<#-- <#if> ${x} -->b<#noparse><#if>${y}</#noparse>c";
    let got = pieces(src);
    let Piece::Comment { content, .. } = got[1] else {
        panic!("expected comment");
    };
    assert_eq!(text(src, content), " <#if> ${x} ");
    let Piece::NoParse { content, .. } = got[3] else {
        panic!("expected noparse");
    };
    assert_eq!(text(src, content), "<#if>${y}");
    assert_eq!(text(src, got[4].span()), "c");
}

#[test]
fn camel_case_directive_names() {
    let src = "<#outputFormat 'HTML'></#outputformat><#noAutoEsc></#noautoesc>";
    let got = pieces(src);
    let directives: Vec<_> = got
        .iter()
        .map(|p| match p {
            Piece::Tag { directive, .. } => *directive,
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(
        directives,
        vec![
            Directive::OutputFormat,
            Directive::OutputFormat,
            Directive::NoAutoEsc,
            Directive::NoAutoEsc
        ]
    );
}

#[test]
fn square_syntax_is_detected() {
    let src = "<p>[#if x]${x}[/#if]</p>";
    let scanned = scan(src, TagSyntax::AutoDetect, InterpolationSyntax::Dollar).unwrap();
    assert_eq!(scanned.syntax, TagSyntax::Square);
    assert_eq!(scanned.pieces.len(), 5);
    assert_eq!(text(src, scanned.pieces[0].span()), "<p>");
}

#[test]
fn angle_tags_are_text_in_square_mode() {
    let src = "<#if x>[#if y][/#if]";
    let scanned = scan(src, TagSyntax::Square, InterpolationSyntax::Dollar).unwrap();
    assert_eq!(text(src, scanned.pieces[0].span()), "<#if x>");
    assert_eq!(scanned.pieces.len(), 3);
}

#[test]
fn detection_defaults_to_angle() {
    assert_eq!(detect_syntax("no tags [x] <y>"), TagSyntax::Angle);
    assert_eq!(detect_syntax("[@m/] <#if>"), TagSyntax::Square);
    assert_eq!(detect_syntax("[#-- c --]"), TagSyntax::Square);
}

#[test]
fn bracket_interpolation() {
    let src = "a[=x[0]]b${y}";
    let scanned = scan(src, TagSyntax::Angle, InterpolationSyntax::Bracket).unwrap();
    let Piece::Interpolation { expr, .. } = scanned.pieces[1] else {
        panic!("expected interpolation");
    };
    assert_eq!(text(src, expr), "x[0]");
    assert_eq!(text(src, scanned.pieces[2].span()), "b${y}");
}

mod errors {
    use super::*;
    use pretty_assertions::assert_eq;

    fn error(src: &str) -> LexErrorKind {
        scan(src, TagSyntax::Angle, InterpolationSyntax::Dollar)
            .unwrap_err()
            .kind
    }

    #[test]
    fn unclosed_constructs() {
        assert_eq!(error("${x"), LexErrorKind::UnclosedInterpolation { expected: '}' });
        assert_eq!(error("<#if x"), LexErrorKind::UnclosedTag { expected: '>' });
        assert_eq!(error("<#-- x"), LexErrorKind::UnclosedComment);
        assert_eq!(error("<#noparse>x"), LexErrorKind::UnclosedNoParse);
        assert_eq!(error("</#if"), LexErrorKind::UnclosedTag { expected: '>' });
    }

    #[test]
    fn unknown_and_unsupported_directives() {
        assert_eq!(
            error("<#frobnicate>"),
            LexErrorKind::UnknownDirective("frobnicate".into())
        );
        assert_eq!(
            error("<#include 'x.ftl'>"),
            LexErrorKind::UnsupportedDirective("include".into())
        );
    }

    #[test]
    fn unterminated_string_in_tag() {
        assert_eq!(
            error("<#if x == \"abc>"),
            LexErrorKind::UnterminatedString { quote: '"' }
        );
    }

    #[test]
    fn error_span_points_at_directive_name() {
        let err = scan("ab<#nope>", TagSyntax::Angle, InterpolationSyntax::Dollar).unwrap_err();
        assert_eq!(err.span, Span::new(4, 8));
    }
}
