use super::*;
use pretty_assertions::assert_eq;

#[test]
fn html_escapes_five_characters() {
    assert_eq!(html("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
}

#[test]
fn clean_text_is_borrowed() {
    assert!(matches!(html("plain text"), Cow::Borrowed(_)));
    assert!(matches!(rtf("plain text"), Cow::Borrowed(_)));
}

#[test]
fn xml_uses_apos() {
    assert_eq!(xml("it's"), "it&apos;s");
    assert_eq!(xhtml("it's"), "it&#39;s");
}

#[test]
fn rtf_escapes_braces_and_backslash() {
    assert_eq!(rtf("\\par {x}"), "\\\\par \\{x\\}");
}

#[test]
fn js_and_json_strings() {
    assert_eq!(js_string("a\"b'\n</script>"), "a\\\"b\\'\\n\\x3C/script\\x3E");
    assert_eq!(json_string("a\"b\u{1}"), "a\\\"b\\u0001");
}

#[test]
fn url_percent_encodes() {
    assert_eq!(url("a b&c=d/é"), "a%20b%26c%3Dd%2F%C3%A9");
}
