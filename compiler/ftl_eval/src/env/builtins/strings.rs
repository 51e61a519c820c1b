//! String built-ins.
//!
//! Positions (`?index_of`, `?length`, padding widths) count characters, not
//! bytes. The search built-ins take an optional flags string:
//! `r` (regular expression), `i` (case-insensitive), `f` (first match only,
//! for `?replace`), and the regex options `m`, `s`, `c`.

use ftl_ir::{BuiltIn, ExprId};
use ftl_output::escape;
use regex::{Regex, RegexBuilder};

use super::Args;
use crate::env::Environment;
use crate::{TemplateError, Value};

#[derive(Copy, Clone, Debug, Default)]
struct Flags {
    regex: bool,
    case_insensitive: bool,
    first_only: bool,
    multi_line: bool,
    dot_all: bool,
    comments: bool,
}

impl Flags {
    fn parse(text: &str) -> Result<Flags, String> {
        let mut flags = Flags::default();
        for c in text.chars() {
            match c {
                'r' => flags.regex = true,
                'i' => flags.case_insensitive = true,
                'f' => flags.first_only = true,
                'm' => flags.multi_line = true,
                's' => flags.dot_all = true,
                'c' => flags.comments = true,
                other => return Err(format!("Unsupported regular expression flag: {other:?}")),
            }
        }
        Ok(flags)
    }

    /// Plain substring matching is enough.
    fn is_literal(self) -> bool {
        !self.regex && !self.case_insensitive
    }
}

/// A substring or regex matcher over one haystack.
enum Matcher {
    Literal(String),
    Regex(Regex),
}

impl Matcher {
    fn first(&self, text: &str) -> Option<(usize, usize)> {
        match self {
            Matcher::Literal(needle) => text.find(needle.as_str()).map(|i| (i, i + needle.len())),
            Matcher::Regex(re) => re.find(text).map(|m| (m.start(), m.end())),
        }
    }

    fn last(&self, text: &str) -> Option<(usize, usize)> {
        match self {
            Matcher::Literal(needle) => {
                text.rfind(needle.as_str()).map(|i| (i, i + needle.len()))
            }
            Matcher::Regex(re) => re.find_iter(text).last().map(|m| (m.start(), m.end())),
        }
    }
}

impl Environment<'_> {
    pub(super) fn string_builtin(
        &mut self,
        builtin: BuiltIn,
        text: &str,
        target: ExprId,
        args: &Args<'_>,
    ) -> Result<Value, TemplateError> {
        Ok(match builtin {
            BuiltIn::UpperCase => Value::from(text.to_uppercase()),
            BuiltIn::LowerCase => Value::from(text.to_lowercase()),
            BuiltIn::CapFirst => Value::from(change_first(text, true)),
            BuiltIn::UncapFirst => Value::from(change_first(text, false)),
            BuiltIn::Capitalize => Value::from(capitalize(text)),
            BuiltIn::Trim => Value::from(text.trim()),
            BuiltIn::Length => super::count(text.chars().count()),
            BuiltIn::Contains => Value::Boolean(text.contains(self.arg_string(args, 0)?.as_str())),
            BuiltIn::StartsWith => {
                Value::Boolean(text.starts_with(self.arg_string(args, 0)?.as_str()))
            }
            BuiltIn::EndsWith => Value::Boolean(text.ends_with(self.arg_string(args, 0)?.as_str())),
            BuiltIn::IndexOf | BuiltIn::LastIndexOf => {
                let needle = self.arg_string(args, 0)?;
                let start = match args.get(1) {
                    Some((value, id)) => Some(self.require_int(value, id)?),
                    None => None,
                };
                let found = if builtin == BuiltIn::IndexOf {
                    index_of(text, &needle, start)
                } else {
                    last_index_of(text, &needle, start)
                };
                Value::int(found)
            }
            BuiltIn::Replace => {
                let from = self.arg_string(args, 0)?;
                let to = self.arg_string(args, 1)?;
                let flags = self.flags(args, 2)?;
                Value::from(self.replace(text, &from, &to, flags, args)?)
            }
            BuiltIn::Split => {
                let separator = self.arg_string(args, 0)?;
                let flags = self.flags(args, 1)?;
                let parts: Vec<Value> = if flags.is_literal() {
                    if separator.is_empty() {
                        text.chars().map(|c| Value::from(c.to_string())).collect()
                    } else {
                        text.split(separator.as_str()).map(Value::from).collect()
                    }
                } else {
                    let re = self.regex(&separator, flags, args, 0)?;
                    re.split(text).map(Value::from).collect()
                };
                Value::sequence(parts)
            }
            BuiltIn::LeftPad | BuiltIn::RightPad => {
                let width = self.arg_int(args, 0)?;
                let filler = match self.opt_arg_string(args, 1)? {
                    Some(filler) => filler,
                    None => " ".to_owned(),
                };
                if filler.is_empty() {
                    let id = args.get(1).map_or(target, |(_, id)| id);
                    return Err(self.blame(
                        TemplateError::custom(format!(
                            "The padding string of ?{} can't be empty",
                            builtin.name()
                        )),
                        id,
                    ));
                }
                Value::from(pad(text, width, &filler, builtin == BuiltIn::LeftPad))
            }
            BuiltIn::KeepBefore
            | BuiltIn::KeepAfter
            | BuiltIn::KeepBeforeLast
            | BuiltIn::KeepAfterLast => {
                let needle = self.arg_string(args, 0)?;
                let flags = self.flags(args, 1)?;
                let matcher = self.matcher(&needle, flags, args)?;
                let kept = match builtin {
                    BuiltIn::KeepBefore => matcher.first(text).map_or(text, |(s, _)| &text[..s]),
                    BuiltIn::KeepAfter => matcher.first(text).map_or("", |(_, e)| &text[e..]),
                    BuiltIn::KeepBeforeLast => {
                        matcher.last(text).map_or(text, |(s, _)| &text[..s])
                    }
                    _ => matcher.last(text).map_or("", |(_, e)| &text[e..]),
                };
                Value::from(kept)
            }
            BuiltIn::RemoveBeginning => {
                let prefix = self.arg_string(args, 0)?;
                Value::from(text.strip_prefix(prefix.as_str()).unwrap_or(text))
            }
            BuiltIn::RemoveEnding => {
                let suffix = self.arg_string(args, 0)?;
                Value::from(text.strip_suffix(suffix.as_str()).unwrap_or(text))
            }
            BuiltIn::EnsureStartsWith => {
                let prefix = self.arg_string(args, 0)?;
                if text.starts_with(prefix.as_str()) {
                    Value::from(text)
                } else {
                    Value::from(format!("{prefix}{text}"))
                }
            }
            BuiltIn::EnsureEndsWith => {
                let suffix = self.arg_string(args, 0)?;
                if text.ends_with(suffix.as_str()) {
                    Value::from(text)
                } else {
                    Value::from(format!("{text}{suffix}"))
                }
            }
            BuiltIn::ChopLinebreak => Value::from(
                text.strip_suffix("\r\n")
                    .or_else(|| text.strip_suffix('\n'))
                    .or_else(|| text.strip_suffix('\r'))
                    .unwrap_or(text),
            ),
            BuiltIn::WordList => {
                Value::sequence(text.split_whitespace().map(Value::from).collect())
            }
            BuiltIn::Matches => {
                let pattern = self.arg_string(args, 0)?;
                let mut flags = self.flags(args, 1)?;
                flags.regex = true;
                let re = self.regex(&format!(r"\A(?:{pattern})\z"), flags, args, 0)?;
                Value::Boolean(re.is_match(text))
            }
            BuiltIn::JsString => Value::from(escape::js_string(text).into_owned()),
            BuiltIn::JsonString => Value::from(escape::json_string(text).into_owned()),
            BuiltIn::Url => {
                if let Some(charset) = self.opt_arg_string(args, 0)? {
                    let normalized = charset.to_ascii_lowercase().replace(['-', '_'], "");
                    if normalized != "utf8" {
                        let id = args.get(0).map_or(target, |(_, id)| id);
                        return Err(self.blame(
                            TemplateError::custom(format!(
                                "?url only supports the UTF-8 charset, not {charset:?}"
                            )),
                            id,
                        ));
                    }
                }
                Value::from(escape::url(text).into_owned())
            }
            other => {
                return Err(TemplateError::bug(format!(
                    "?{} isn't a string built-in",
                    other.name()
                )))
            }
        })
    }

    fn flags(&self, args: &Args<'_>, index: usize) -> Result<Flags, TemplateError> {
        let Some((value, id)) = args.get(index) else {
            return Ok(Flags::default());
        };
        let text = self.require_string(value, id)?;
        Flags::parse(&text).map_err(|message| self.blame(TemplateError::custom(message), id))
    }

    /// Compile `pattern`; errors blame argument `index`.
    fn regex(
        &self,
        pattern: &str,
        flags: Flags,
        args: &Args<'_>,
        index: usize,
    ) -> Result<Regex, TemplateError> {
        let source = if flags.regex {
            pattern.to_owned()
        } else {
            regex::escape(pattern)
        };
        RegexBuilder::new(&source)
            .case_insensitive(flags.case_insensitive)
            .multi_line(flags.multi_line)
            .dot_matches_new_line(flags.dot_all)
            .ignore_whitespace(flags.comments)
            .build()
            .map_err(|e| {
                let error = TemplateError::custom(format!("Malformed regular expression: {e}"));
                match args.get(index) {
                    Some((_, id)) if id.is_valid() => self.blame(error, id),
                    _ => error,
                }
            })
    }

    fn matcher(
        &self,
        needle: &str,
        flags: Flags,
        args: &Args<'_>,
    ) -> Result<Matcher, TemplateError> {
        if flags.is_literal() {
            Ok(Matcher::Literal(needle.to_owned()))
        } else {
            self.regex(needle, flags, args, 0).map(Matcher::Regex)
        }
    }

    fn replace(
        &self,
        text: &str,
        from: &str,
        to: &str,
        flags: Flags,
        args: &Args<'_>,
    ) -> Result<String, TemplateError> {
        if flags.is_literal() {
            return Ok(if flags.first_only {
                text.replacen(from, to, 1)
            } else {
                text.replace(from, to)
            });
        }
        let re = self.regex(from, flags, args, 0)?;
        // Group references like `$1` only mean something in regex mode.
        let replacement = if flags.regex {
            to.to_owned()
        } else {
            to.replace('$', "$$")
        };
        Ok(if flags.first_only {
            re.replacen(text, 1, replacement.as_str()).into_owned()
        } else {
            re.replace_all(text, replacement.as_str()).into_owned()
        })
    }
}

/// Upper- or lower-case the first letter of the first word.
fn change_first(text: &str, upper: bool) -> String {
    let Some((at, first)) = text.char_indices().find(|(_, c)| !c.is_whitespace()) else {
        return text.to_owned();
    };
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..at]);
    if upper {
        out.extend(first.to_uppercase());
    } else {
        out.extend(first.to_lowercase());
    }
    out.push_str(&text[at + first.len_utf8()..]);
    out
}

fn capitalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word_start = true;
    for c in text.chars() {
        if c.is_whitespace() {
            word_start = true;
            out.push(c);
        } else if word_start {
            word_start = false;
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// Byte offset of character `index`, clamped to the end.
fn byte_offset(text: &str, index: usize) -> usize {
    text.char_indices().nth(index).map_or(text.len(), |(i, _)| i)
}

fn char_index(text: &str, byte: usize) -> i64 {
    i64::try_from(text[..byte].chars().count()).unwrap_or(i64::MAX)
}

fn index_of(text: &str, needle: &str, start: Option<i64>) -> i64 {
    let start = usize::try_from(start.unwrap_or(0).max(0)).unwrap_or(usize::MAX);
    let from = byte_offset(text, start);
    text[from..]
        .find(needle)
        .map_or(-1, |found| char_index(text, from + found))
}

fn last_index_of(text: &str, needle: &str, start: Option<i64>) -> i64 {
    let end = match start {
        None => text.len(),
        Some(start) if start < 0 => return -1,
        Some(start) => {
            let start = usize::try_from(start).unwrap_or(usize::MAX);
            let mut end = byte_offset(text, start).saturating_add(needle.len()).min(text.len());
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            end
        }
    };
    text[..end]
        .rfind(needle)
        .map_or(-1, |found| char_index(text, found))
}

/// Pad to `width` characters. The filler repeats by absolute position, so
/// `"a"?right_pad(5, "xyz")` is `"ayzxy"`.
fn pad(text: &str, width: i64, filler: &str, left: bool) -> String {
    let len = text.chars().count();
    let width = usize::try_from(width).unwrap_or(0);
    if width <= len {
        return text.to_owned();
    }
    let filler: Vec<char> = filler.chars().collect();
    let fill = |position: usize| filler[position % filler.len()];
    let mut out = String::with_capacity(width);
    if left {
        out.extend((0..width - len).map(fill));
        out.push_str(text);
    } else {
        out.push_str(text);
        out.extend((len..width).map(fill));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn padding_cycles_by_position() {
        assert_eq!(pad("a", 5, "xyz", false), "ayzxy");
        assert_eq!(pad("a", 5, "xyz", true), "xyzxa");
        assert_eq!(pad("abc", 2, " ", true), "abc");
        assert_eq!(pad("ab", 4, " ", true), "  ab");
    }

    #[test]
    fn index_of_counts_characters() {
        assert_eq!(index_of("ábcabc", "c", None), 2);
        assert_eq!(index_of("abcabc", "c", Some(3)), 5);
        assert_eq!(index_of("abc", "x", None), -1);
        assert_eq!(last_index_of("abcabc", "c", None), 5);
        assert_eq!(last_index_of("abcabc", "c", Some(4)), 2);
        assert_eq!(last_index_of("abc", "a", Some(-1)), -1);
    }

    #[test]
    fn first_letter_and_words() {
        assert_eq!(change_first("  green mouse", true), "  Green mouse");
        assert_eq!(change_first("Green", false), "green");
        assert_eq!(capitalize("  GreEN mouse"), "  Green Mouse");
    }

    #[test]
    fn flags_parse() {
        let flags = Flags::parse("ri").unwrap_or_default();
        assert!(flags.regex && flags.case_insensitive && !flags.first_only);
        assert!(Flags::parse("x").is_err());
        assert!(Flags::default().is_literal());
    }
}
