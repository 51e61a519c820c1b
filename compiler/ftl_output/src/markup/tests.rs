#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use pretty_assertions::assert_eq;
use rayon::prelude::*;

#[test]
fn markup_is_lazy() {
    let value = OutputFormat::Html.escape_plain_text("a < b").unwrap();
    assert!(!value.is_markup_computed());
    assert_eq!(value.markup(), "a &lt; b");
    assert!(value.is_markup_computed());
    assert_eq!(value.source_plain_text(), Some("a < b"));
}

#[test]
fn concurrent_first_use_agrees() {
    let value = OutputFormat::Xml.escape_plain_text("<x a='1'/>").unwrap();
    let results: Vec<String> = (0..64)
        .into_par_iter()
        .map(|_| value.markup().to_owned())
        .collect();
    assert!(results.iter().all(|m| m == "&lt;x a=&apos;1&apos;/&gt;"));
}

#[test]
fn non_markup_format_cannot_escape() {
    let err = OutputFormat::PlainText.escape_plain_text("x").unwrap_err();
    assert!(err.to_string().contains("plainText"));
    assert!(err.to_string().contains("?esc"));
}

mod concat {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn same_format_keeps_plain_text() {
        let l = OutputFormat::Html.escape_plain_text("<a>").unwrap();
        let r = OutputFormat::Html.escape_plain_text("&").unwrap();
        let joined = super::super::concat(&l, &r).unwrap();
        assert_eq!(joined.source_plain_text(), Some("<a>&"));
        assert_eq!(joined.markup(), "&lt;a&gt;&amp;");
    }

    #[test]
    fn same_format_markup_only() {
        let l = OutputFormat::Html.from_markup("<p>").unwrap();
        let r = OutputFormat::Html.escape_plain_text("<").unwrap();
        let joined = super::super::concat(&l, &r).unwrap();
        assert_eq!(joined.source_plain_text(), None);
        assert_eq!(joined.markup(), "<p>&lt;");
    }

    #[test]
    fn different_formats_convert_through_plain_text() {
        let l = OutputFormat::Html.from_markup("<p>").unwrap();
        let r = OutputFormat::Rtf.escape_plain_text("a & b").unwrap();
        let joined = super::super::concat(&l, &r).unwrap();
        assert_eq!(joined.format(), OutputFormat::Html);
        assert_eq!(joined.markup(), "<p>a &amp; b");
    }

    #[test]
    fn different_formats_without_plain_text_fail() {
        let l = OutputFormat::Html.from_markup("<p>").unwrap();
        let r = OutputFormat::Rtf.from_markup("\\par").unwrap();
        assert!(matches!(
            super::super::concat(&l, &r),
            Err(OutputError::IncompatibleMarkup { .. })
        ));
    }
}

mod output {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn same_format_is_not_escaped_again() {
        let value = OutputFormat::Html.from_markup("<b>x</b>").unwrap();
        let mut out = String::new();
        OutputFormat::Html.output_markup(&value, &mut out).unwrap();
        assert_eq!(out, "<b>x</b>");
    }

    #[test]
    fn raw_prints_any_markup() {
        let value = OutputFormat::Rtf.from_markup("\\par c").unwrap();
        let mut out = String::new();
        OutputFormat::Raw.output_markup(&value, &mut out).unwrap();
        assert_eq!(out, "\\par c");
    }

    #[test]
    fn plain_text_target_prints_source() {
        let value = OutputFormat::Html.escape_plain_text("a < {h}").unwrap();
        let mut out = String::new();
        OutputFormat::PlainText.output_markup(&value, &mut out).unwrap();
        assert_eq!(out, "a < {h}");
    }

    #[test]
    fn other_markup_format_is_reescaped() {
        let value = OutputFormat::Rtf.escape_plain_text("\\par a & b").unwrap();
        let mut out = String::new();
        OutputFormat::Html.output_markup(&value, &mut out).unwrap();
        assert_eq!(out, "\\par a &amp; b");
    }

    #[test]
    fn markup_only_into_other_format_fails() {
        let value = OutputFormat::Html.from_markup("<p>c").unwrap();
        let mut out = String::new();
        let err = OutputFormat::PlainText.output_markup(&value, &mut out).unwrap_err();
        assert!(err.to_string().contains("conversion"));
    }
}

#[test]
fn legacy_builtin_bypass() {
    assert!(OutputFormat::Html.is_legacy_builtin_bypassed("html"));
    assert!(OutputFormat::Html.is_legacy_builtin_bypassed("xml"));
    assert!(OutputFormat::Xml.is_legacy_builtin_bypassed("xml"));
    assert!(!OutputFormat::Xml.is_legacy_builtin_bypassed("html"));
    assert!(OutputFormat::Rtf.is_legacy_builtin_bypassed("rtf"));
    assert!(!OutputFormat::PlainText.is_legacy_builtin_bypassed("html"));
}
