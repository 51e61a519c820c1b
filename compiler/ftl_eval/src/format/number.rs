//! Decimal-pattern and computer number formats.

use super::{FormatError, TemplateNumberFormat};
use crate::Number;

/// The `c`/`computer` format: what `?c` prints.
#[derive(Copy, Clone, Debug)]
pub struct ComputerNumberFormat;

impl TemplateNumberFormat for ComputerNumberFormat {
    fn format(&self, number: Number) -> Result<String, FormatError> {
        Ok(number.to_string())
    }

    fn parse(&self, text: &str) -> Result<Number, FormatError> {
        parse_computer(text).ok_or_else(|| FormatError::unparsable(text, "c"))
    }

    fn is_locale_bound(&self) -> bool {
        false
    }

    fn description(&self) -> &str {
        "c"
    }
}

/// Parse a number written the way [`ComputerNumberFormat`] prints it.
///
/// Integers that fit `i64` stay integers.
pub(crate) fn parse_computer(text: &str) -> Option<Number> {
    let text = text.trim();
    match text {
        "INF" | "Infinity" | "+INF" => return Some(Number::Float(f64::INFINITY)),
        "-INF" | "-Infinity" => return Some(Number::Float(f64::NEG_INFINITY)),
        "NaN" => return Some(Number::Float(f64::NAN)),
        _ => {}
    }
    if let Ok(int) = text.parse::<i64>() {
        return Some(Number::Int(int));
    }
    let plausible = text.bytes().any(|b| b.is_ascii_digit())
        && text
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'));
    if plausible {
        text.parse::<f64>().ok().map(Number::Float)
    } else {
        None
    }
}

/// A decimal pattern such as `#,##0.00` or `0.#%`.
///
/// Rounds half-even. Only the positive sub-pattern is used; negative
/// numbers get a leading `-`.
#[derive(Clone, Debug)]
pub struct DecimalNumberFormat {
    name: String,
    prefix: String,
    suffix: String,
    min_int: usize,
    min_frac: usize,
    max_frac: usize,
    grouping: Option<usize>,
    multiplier: i64,
}

const DIGIT_CHARS: &[char] = &['#', '0', ',', '.'];

impl DecimalNumberFormat {
    pub fn new(pattern: &str) -> Result<Self, FormatError> {
        Self::with_name(pattern, pattern)
    }

    pub(super) fn with_name(name: &str, pattern: &str) -> Result<Self, FormatError> {
        let positive = pattern.split(';').next().unwrap_or(pattern);
        let (prefix, body, suffix) = split_affixes(positive)
            .ok_or_else(|| FormatError::malformed(name, "misplaced quote or digit"))?;
        if body.is_empty() {
            return Err(FormatError::malformed(name, "no digit placeholders"));
        }
        let (int_part, frac_part) = body.split_once('.').unwrap_or((body.as_str(), ""));
        if frac_part.contains(['.', ',']) {
            return Err(FormatError::malformed(name, "misplaced separator"));
        }
        let grouping = match int_part.rfind(',') {
            Some(at) if at + 1 == int_part.len() => {
                return Err(FormatError::malformed(name, "grouping size is zero"));
            }
            Some(at) => Some(int_part.len() - at - 1),
            None => None,
        };
        let min_frac = frac_part.chars().take_while(|c| *c == '0').count();
        if frac_part[min_frac..].contains('0') {
            return Err(FormatError::malformed(name, "'0' after '#' in the fraction"));
        }
        let multiplier = if prefix.contains('%') || suffix.contains('%') {
            100
        } else if prefix.contains('\u{2030}') || suffix.contains('\u{2030}') {
            1000
        } else {
            1
        };
        Ok(DecimalNumberFormat {
            name: name.to_owned(),
            prefix,
            suffix,
            min_int: int_part.chars().filter(|c| *c == '0').count(),
            min_frac,
            max_frac: frac_part.len(),
            grouping,
            multiplier,
        })
    }

    fn group(&self, digits: &str) -> String {
        let Some(size) = self.grouping else {
            return digits.to_owned();
        };
        let mut out = String::with_capacity(digits.len() + digits.len() / size);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % size == 0 {
                out.push(',');
            }
            out.push(c);
        }
        out
    }
}

/// Split a pattern into prefix, digit body and suffix; quoted text is
/// literal. `None` for an unterminated quote or digits inside the suffix.
fn split_affixes(pattern: &str) -> Option<(String, String, String)> {
    #[derive(Copy, Clone, PartialEq, Eq)]
    enum Part {
        Prefix,
        Body,
        Suffix,
    }

    let (mut prefix, mut body, mut suffix) = (String::new(), String::new(), String::new());
    let mut part = Part::Prefix;
    let mut in_quote = false;
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\'' {
            if chars.peek() == Some(&'\'') {
                chars.next();
            } else {
                in_quote = !in_quote;
                if part == Part::Body {
                    part = Part::Suffix;
                }
                continue;
            }
        }
        if !in_quote && c != '\'' && DIGIT_CHARS.contains(&c) {
            if part == Part::Suffix {
                return None;
            }
            part = Part::Body;
            body.push(c);
            continue;
        }
        if part == Part::Body {
            part = Part::Suffix;
        }
        if part == Part::Prefix {
            prefix.push(c);
        } else {
            suffix.push(c);
        }
    }
    if in_quote {
        return None;
    }
    Some((prefix, body, suffix))
}

impl TemplateNumberFormat for DecimalNumberFormat {
    fn format(&self, number: Number) -> Result<String, FormatError> {
        let scaled = number.mul(Number::Int(self.multiplier));
        let (negative, int_digits, mut frac) = match scaled {
            Number::Int(i) => (i < 0, i.unsigned_abs().to_string(), String::new()),
            Number::Float(x) if x.is_nan() => {
                return Ok(format!("{}NaN{}", self.prefix, self.suffix));
            }
            Number::Float(x) if x.is_infinite() => {
                let sign = if x < 0.0 { "-" } else { "" };
                return Ok(format!("{sign}{}\u{221e}{}", self.prefix, self.suffix));
            }
            Number::Float(x) => {
                let fixed = format!("{:.*}", self.max_frac, x.abs());
                let (int, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
                (x < 0.0, int.to_owned(), frac.to_owned())
            }
        };
        while frac.len() > self.min_frac && frac.ends_with('0') {
            frac.pop();
        }
        while frac.len() < self.min_frac {
            frac.push('0');
        }
        let mut int = if int_digits == "0" && self.min_int == 0 && !frac.is_empty() {
            String::new()
        } else {
            int_digits
        };
        if int.len() < self.min_int {
            int.insert_str(0, &"0".repeat(self.min_int - int.len()));
        }
        let is_zero = int.chars().chain(frac.chars()).all(|c| c == '0');
        let mut out = String::new();
        if negative && !is_zero {
            out.push('-');
        }
        out.push_str(&self.prefix);
        out.push_str(&self.group(&int));
        if !frac.is_empty() {
            out.push('.');
            out.push_str(&frac);
        }
        out.push_str(&self.suffix);
        Ok(out)
    }

    fn parse(&self, text: &str) -> Result<Number, FormatError> {
        let unparsable = || FormatError::unparsable(text, &self.name);
        let trimmed = text.trim();
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let rest = rest.strip_prefix(self.prefix.as_str()).ok_or_else(unparsable)?;
        let rest = rest.strip_suffix(self.suffix.as_str()).ok_or_else(unparsable)?;
        let digits: String = rest.chars().filter(|c| *c != ',').collect();
        if digits.starts_with(['-', '+']) {
            return Err(unparsable());
        }
        let number = parse_computer(&digits).ok_or_else(unparsable)?;
        let number = if negative { number.neg() } else { number };
        if self.multiplier == 1 {
            Ok(number)
        } else {
            number
                .div(Number::Int(self.multiplier))
                .map_err(|_| unparsable())
        }
    }

    fn is_locale_bound(&self) -> bool {
        true
    }

    fn description(&self) -> &str {
        &self.name
    }
}
