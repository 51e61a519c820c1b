//! Escaping functions for the markup formats.
//!
//! Each function returns the input borrowed when nothing needs escaping, so
//! the common case of clean text allocates nothing.

use std::borrow::Cow;

/// HTML: `< > & " '` become `&lt; &gt; &amp; &quot; &#39;`.
pub fn html(text: &str) -> Cow<'_, str> {
    replace_each(text, |c| match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    })
}

/// XHTML: as HTML, with the apostrophe as a numeric reference.
pub fn xhtml(text: &str) -> Cow<'_, str> {
    html(text)
}

/// XML: as HTML, but the apostrophe becomes `&apos;`.
pub fn xml(text: &str) -> Cow<'_, str> {
    replace_each(text, |c| match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&apos;"),
        _ => None,
    })
}

/// RTF: `\ { }` get a backslash prefix.
pub fn rtf(text: &str) -> Cow<'_, str> {
    if memchr::memchr3(b'\\', b'{', b'}', text.as_bytes()).is_none() {
        return Cow::Borrowed(text);
    }
    replace_each(text, |c| match c {
        '\\' => Some("\\\\"),
        '{' => Some("\\{"),
        '}' => Some("\\}"),
        _ => None,
    })
}

/// JavaScript string literal body (for `?js_string`).
pub fn js_string(text: &str) -> Cow<'_, str> {
    replace_each(text, |c| match c {
        '"' => Some("\\\""),
        '\'' => Some("\\'"),
        '\\' => Some("\\\\"),
        '\n' => Some("\\n"),
        '\r' => Some("\\r"),
        '\t' => Some("\\t"),
        '<' => Some("\\x3C"),
        '>' => Some("\\x3E"),
        _ => None,
    })
}

/// JSON string literal body (for `?json_string`).
pub fn json_string(text: &str) -> Cow<'_, str> {
    let needs = text
        .chars()
        .any(|c| matches!(c, '"' | '\\' | '<' | '>') || c.is_control());
    if !needs {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '<' => out.push_str("\\u003C"),
            '>' => out.push_str("\\u003E"),
            c if c.is_control() => {
                out.push_str(&format!("\\u{:04X}", u32::from(c)));
            }
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Percent-encode everything outside the URL-safe set (for `?url`).
pub fn url(text: &str) -> Cow<'_, str> {
    let safe = |b: u8| {
        b.is_ascii_alphanumeric()
            || matches!(b, b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')')
    };
    if text.bytes().all(safe) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() * 3);
    for b in text.bytes() {
        if safe(b) {
            out.push(char::from(b));
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    Cow::Owned(out)
}

fn replace_each(text: &str, map: impl Fn(char) -> Option<&'static str>) -> Cow<'_, str> {
    let Some(first) = text.char_indices().find(|&(_, c)| map(c).is_some()) else {
        return Cow::Borrowed(text);
    };
    let mut out = String::with_capacity(text.len() + 16);
    out.push_str(&text[..first.0]);
    for c in text[first.0..].chars() {
        match map(c) {
            Some(rep) => out.push_str(rep),
            None => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests;
