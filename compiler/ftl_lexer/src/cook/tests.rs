#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use pretty_assertions::assert_eq;

fn whole(src: &str) -> Span {
    Span::new(0, u32::try_from(src.len()).unwrap())
}

#[test]
fn plain_text_is_borrowed() {
    let src = "hello";
    assert!(matches!(unescape(src, whole(src)).unwrap(), Cow::Borrowed("hello")));
}

#[test]
fn standard_escapes() {
    let src = r#"a\"b\'c\\d\ne\tf"#;
    assert_eq!(unescape(src, whole(src)).unwrap(), "a\"b'c\\d\ne\tf");
}

#[test]
fn markup_escapes() {
    let src = r"\l\g\a\{\=";
    assert_eq!(unescape(src, whole(src)).unwrap(), "<>&{=");
}

#[test]
fn hex_escapes_take_up_to_four_digits() {
    let src = r"\x41\x00e9\x263Az";
    assert_eq!(unescape(src, whole(src)).unwrap(), "A\u{e9}\u{263a}z");
}

#[test]
fn invalid_escapes() {
    let src = r"ab\q";
    let err = unescape(src, whole(src)).unwrap_err();
    assert_eq!(err.kind, LexErrorKind::InvalidEscape(r"\q".into()));
    assert_eq!(err.span, Span::new(2, 4));

    let src = r"\xg";
    assert!(unescape(src, whole(src)).is_err());
}

#[test]
fn literal_content_strips_quotes() {
    assert_eq!(literal_content(Span::new(3, 8), false), Span::new(4, 7));
    assert_eq!(literal_content(Span::new(3, 9), true), Span::new(5, 8));
}

mod interpolation {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn no_interpolation() {
        let src = r"x\ny";
        assert_eq!(
            split_interpolations(src, whole(src)).unwrap(),
            vec![Segment::Text("x\ny".into())]
        );
    }

    #[test]
    fn mixed_segments() {
        let src = "Hi ${user}! ${a + b}";
        let segments = split_interpolations(src, whole(src)).unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::Text("Hi ".into()),
                Segment::Interp(Span::new(5, 9)),
                Segment::Text("! ".into()),
                Segment::Interp(Span::new(14, 19)),
            ]
        );
    }

    #[test]
    fn escaped_dollar_brace_is_text() {
        let src = r"cost: $\{x}";
        assert_eq!(
            split_interpolations(src, whole(src)).unwrap(),
            vec![Segment::Text("cost: ${x}".into())]
        );
    }

    #[test]
    fn nested_braces() {
        let src = "${{'k': 1}.k}";
        assert_eq!(
            split_interpolations(src, whole(src)).unwrap(),
            vec![Segment::Interp(Span::new(2, 12))]
        );
    }

    #[test]
    fn unclosed() {
        let src = "${x";
        assert!(split_interpolations(src, whole(src)).is_err());
    }
}
