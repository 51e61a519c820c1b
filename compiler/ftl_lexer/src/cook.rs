//! String literal cooking.
//!
//! Quoted literals keep their escapes in the token stream; the parser calls
//! into this module to resolve them and to split `${...}` interpolations out
//! of the literal text.

use std::borrow::Cow;

use ftl_ir::Span;

use crate::scanner::{find_expression_end, Terminator};
use crate::{LexError, LexErrorKind};

/// A piece of a quoted string literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    /// Text with escapes resolved.
    Text(String),
    /// Expression text of an embedded `${...}`.
    Interp(Span),
}

/// Content span of a string token: quotes (and the `r` prefix) removed.
pub fn literal_content(token_span: Span, raw: bool) -> Span {
    let prefix = if raw { 2 } else { 1 };
    Span::new(token_span.start + prefix, token_span.end - 1)
}

/// Resolve escapes in `source[content]`.
pub fn unescape(source: &str, content: Span) -> Result<Cow<'_, str>, LexError> {
    let text = &source[content.to_range()];
    if !text.contains('\\') {
        return Ok(Cow::Borrowed(text));
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escape_start = content.start as usize + i;
        let invalid = |len: usize| {
            let end = (escape_start + len).min(content.end as usize);
            LexError::new(
                LexErrorKind::InvalidEscape(source[escape_start..end].to_owned()),
                Span::from_range(escape_start..end),
            )
        };
        let Some((_, next)) = chars.next() else {
            return Err(invalid(1));
        };
        let resolved = match next {
            '"' => '"',
            '\'' => '\'',
            '\\' => '\\',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'l' => '<',
            'g' => '>',
            'a' => '&',
            '{' => '{',
            '=' => '=',
            'x' => {
                let mut code = 0u32;
                let mut digits = 0;
                while digits < 4 {
                    match chars.peek().and_then(|(_, d)| d.to_digit(16)) {
                        Some(d) => {
                            code = code * 16 + d;
                            digits += 1;
                            chars.next();
                        }
                        None => break,
                    }
                }
                if digits == 0 {
                    return Err(invalid(2));
                }
                char::from_u32(code).ok_or_else(|| invalid(2 + digits))?
            }
            _ => return Err(invalid(1 + next.len_utf8())),
        };
        out.push(resolved);
    }
    Ok(Cow::Owned(out))
}

/// Split a quoted literal into text and `${...}` segments.
///
/// Returns a single [`Segment::Text`] when there is nothing to interpolate.
pub fn split_interpolations(source: &str, content: Span) -> Result<Vec<Segment>, LexError> {
    let text = &source[content.to_range()];
    let base = content.start as usize;
    if !text.contains("${") {
        return Ok(vec![Segment::Text(unescape(source, content)?.into_owned())]);
    }
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'$' if bytes.get(i + 1) == Some(&b'{') => {
                if i > text_start {
                    let span = Span::from_range(base + text_start..base + i);
                    segments.push(Segment::Text(unescape(source, span)?.into_owned()));
                }
                let expr_start = base + i + 2;
                let end = find_expression_end(source, expr_start, Terminator::Brace)?;
                if end.close_end > content.end as usize {
                    return Err(LexError::new(
                        LexErrorKind::UnclosedInterpolation { expected: '}' },
                        Span::from_range(base + i..content.end as usize),
                    ));
                }
                segments.push(Segment::Interp(Span::from_range(expr_start..end.end)));
                i = end.close_end - base;
                text_start = i;
            }
            _ => i += 1,
        }
    }
    if text_start < bytes.len() {
        let span = Span::from_range(base + text_start..content.end as usize);
        segments.push(Segment::Text(unescape(source, span)?.into_owned()));
    }
    Ok(segments)
}

#[cfg(test)]
mod tests;
