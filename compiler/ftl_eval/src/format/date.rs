//! ISO 8601 and letter-pattern date formats.

use std::fmt::Write as _;

use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone as _,
    Timelike, Utc,
};

use super::{FormatError, TemplateDateFormat};
use crate::{DateKind, DateValue, TimeZone};

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// The pattern behind a `short`/`medium`/`long`/`full` preset, or
/// `short_medium`-style pairs for date-times.
pub(super) fn preset(name: &str, kind: DateKind) -> Option<String> {
    fn date_part(style: &str) -> Option<&'static str> {
        match style {
            "short" => Some("M/d/yy"),
            "medium" => Some("MMM d, yyyy"),
            "long" => Some("MMMM d, yyyy"),
            "full" => Some("EEEE, MMMM d, yyyy"),
            _ => None,
        }
    }
    fn time_part(style: &str) -> Option<&'static str> {
        match style {
            "short" => Some("h:mm a"),
            "medium" => Some("h:mm:ss a"),
            "long" | "full" => Some("h:mm:ss a z"),
            _ => None,
        }
    }

    let (date_style, time_style) = name.split_once('_').unwrap_or((name, name));
    match kind {
        DateKind::Date if date_style == time_style => date_part(name).map(str::to_owned),
        DateKind::Time if date_style == time_style => time_part(name).map(str::to_owned),
        DateKind::DateTime | DateKind::Unknown => Some(format!(
            "{} {}",
            date_part(date_style)?,
            time_part(time_style)?
        )),
        DateKind::Date | DateKind::Time => None,
    }
}

/// `iso` (ISO 8601) and `xs` (XML Schema) formats.
///
/// Both print `2024-03-01`, `13:05:09Z` and `2024-03-01T13:05:09Z`, with
/// milliseconds when non-zero; `xs` also puts the zone on dates.
#[derive(Clone, Debug)]
pub struct IsoDateFormat {
    xs: bool,
}

impl IsoDateFormat {
    pub fn iso() -> Self {
        IsoDateFormat { xs: false }
    }

    pub fn xs() -> Self {
        IsoDateFormat { xs: true }
    }

    fn name(&self) -> &'static str {
        if self.xs {
            "xs"
        } else {
            "iso"
        }
    }
}

fn iso_zone(zone: &TimeZone) -> String {
    if zone.is_utc() {
        "Z".to_owned()
    } else {
        zone.offset().to_string()
    }
}

impl TemplateDateFormat for IsoDateFormat {
    fn format(&self, date: &DateValue, zone: &TimeZone) -> Result<String, FormatError> {
        let local = date.in_zone(zone);
        let day = local.format("%Y-%m-%d").to_string();
        let millis = local.nanosecond() / 1_000_000 % 1000;
        let time = if millis == 0 {
            local.format("%H:%M:%S").to_string()
        } else {
            format!("{}.{millis:03}", local.format("%H:%M:%S"))
        };
        let zone = iso_zone(zone);
        match date.kind {
            DateKind::Date if self.xs => Ok(format!("{day}{zone}")),
            DateKind::Date => Ok(day),
            DateKind::Time => Ok(format!("{time}{zone}")),
            DateKind::DateTime => Ok(format!("{day}T{time}{zone}")),
            DateKind::Unknown => Err(FormatError::Unformattable {
                what: "a date of unknown type (date, time or date-time)".to_owned(),
                format: self.name().to_owned(),
            }),
        }
    }

    fn parse(&self, text: &str, kind: DateKind, zone: &TimeZone) -> Result<DateValue, FormatError> {
        let text = text.trim();
        let unparsable = || FormatError::unparsable(text, self.name());
        let instant = match kind {
            DateKind::Date => {
                let day = text.get(..10).unwrap_or(text);
                let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| unparsable())?;
                local_to_utc(date.and_time(NaiveTime::MIN), zone).ok_or_else(unparsable)?
            }
            DateKind::Time => {
                let time = NaiveTime::parse_from_str(text.trim_end_matches('Z'), "%H:%M:%S%.f")
                    .or_else(|_| NaiveTime::parse_from_str(text.trim_end_matches('Z'), "%H:%M"))
                    .map_err(|_| unparsable())?;
                let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).ok_or_else(unparsable)?;
                local_to_utc(epoch.and_time(time), zone).ok_or_else(unparsable)?
            }
            DateKind::DateTime | DateKind::Unknown => match DateTime::parse_from_rfc3339(text) {
                Ok(parsed) => parsed.with_timezone(&Utc),
                Err(_) => {
                    let naive = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                        .map_err(|_| unparsable())?;
                    local_to_utc(naive, zone).ok_or_else(unparsable)?
                }
            },
        };
        Ok(DateValue::new(instant, kind))
    }

    fn is_locale_bound(&self) -> bool {
        false
    }

    fn is_time_zone_bound(&self) -> bool {
        true
    }

    fn description(&self) -> &str {
        self.name()
    }
}

fn local_to_utc(naive: NaiveDateTime, zone: &TimeZone) -> Option<DateTime<Utc>> {
    zone.offset()
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Literal(String),
    /// Pattern letter and repeat count.
    Field(char, usize),
}

const PATTERN_LETTERS: &str = "yMdHhmsSaEzZX";

/// A letter pattern such as `yyyy-MM-dd HH:mm:ss` or `EEE, d MMM yyyy`.
///
/// Supported letters: `y M d H h m s S a E z Z X`; text in single quotes is
/// literal and `''` is a quote.
#[derive(Clone, Debug)]
pub struct PatternDateFormat {
    name: String,
    tokens: Vec<Token>,
}

impl PatternDateFormat {
    pub fn new(pattern: &str) -> Result<Self, FormatError> {
        Self::with_name(pattern, pattern)
    }

    pub(super) fn with_name(name: &str, pattern: &str) -> Result<Self, FormatError> {
        Ok(PatternDateFormat {
            name: name.to_owned(),
            tokens: tokenize(name, pattern)?,
        })
    }

    fn has_field(&self, letters: &str) -> bool {
        self.tokens
            .iter()
            .any(|t| matches!(t, Token::Field(c, _) if letters.contains(*c)))
    }

    /// The pattern as a chrono `strftime` string, for parsing.
    fn strftime(&self) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                Token::Literal(text) => out.push_str(&text.replace('%', "%%")),
                Token::Field(letter, count) => out.push_str(match (letter, count) {
                    ('y', 2) => "%y",
                    ('y', _) => "%Y",
                    ('M', 1 | 2) => "%m",
                    ('M', 3) => "%b",
                    ('M', _) => "%B",
                    ('d', _) => "%d",
                    ('H', _) => "%H",
                    ('h', _) => "%I",
                    ('m', _) => "%M",
                    ('s', _) => "%S",
                    ('S', _) => "%3f",
                    ('a', _) => "%p",
                    ('E', 1..=3) => "%a",
                    ('E', _) => "%A",
                    _ => "%z",
                }),
            }
        }
        out
    }
}

fn tokenize(name: &str, pattern: &str) -> Result<Vec<Token>, FormatError> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\'' {
            if chars.peek() == Some(&'\'') {
                chars.next();
                literal.push('\'');
                continue;
            }
            let mut closed = false;
            while let Some(q) = chars.next() {
                if q == '\'' {
                    if chars.peek() == Some(&'\'') {
                        chars.next();
                        literal.push('\'');
                    } else {
                        closed = true;
                        break;
                    }
                } else {
                    literal.push(q);
                }
            }
            if !closed {
                return Err(FormatError::malformed(name, "unterminated quote"));
            }
        } else if c.is_ascii_alphabetic() {
            if !PATTERN_LETTERS.contains(c) {
                return Err(FormatError::malformed(
                    name,
                    format!("unsupported pattern letter {c:?}"),
                ));
            }
            let mut count = 1;
            while chars.peek() == Some(&c) {
                chars.next();
                count += 1;
            }
            if !literal.is_empty() {
                tokens.push(Token::Literal(std::mem::take(&mut literal)));
            }
            tokens.push(Token::Field(c, count));
        } else {
            literal.push(c);
        }
    }
    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    Ok(tokens)
}

fn pad(out: &mut String, value: u32, width: usize) {
    let _ = write!(out, "{value:0width$}");
}

fn offset_text(offset: FixedOffset, colon: bool, minutes: bool) -> String {
    let seconds = offset.local_minus_utc();
    let sign = if seconds < 0 { '-' } else { '+' };
    let total = seconds.unsigned_abs() / 60;
    match (minutes, colon) {
        (false, _) => format!("{sign}{:02}", total / 60),
        (true, false) => format!("{sign}{:02}{:02}", total / 60, total % 60),
        (true, true) => format!("{sign}{:02}:{:02}", total / 60, total % 60),
    }
}

impl TemplateDateFormat for PatternDateFormat {
    fn format(&self, date: &DateValue, zone: &TimeZone) -> Result<String, FormatError> {
        let local = date.in_zone(zone);
        let mut out = String::new();
        for token in &self.tokens {
            let (letter, count) = match token {
                Token::Literal(text) => {
                    out.push_str(text);
                    continue;
                }
                Token::Field(letter, count) => (*letter, *count),
            };
            match letter {
                'y' if count == 2 => pad(&mut out, local.year().rem_euclid(100).unsigned_abs(), 2),
                'y' => {
                    let _ = write!(out, "{:0count$}", local.year());
                }
                'M' => match count {
                    1 | 2 => pad(&mut out, local.month(), count),
                    3 => out.push_str(&MONTHS[local.month0() as usize][..3]),
                    _ => out.push_str(MONTHS[local.month0() as usize]),
                },
                'd' => pad(&mut out, local.day(), count),
                'H' => pad(&mut out, local.hour(), count),
                'h' => pad(&mut out, local.hour12().1, count),
                'm' => pad(&mut out, local.minute(), count),
                's' => pad(&mut out, local.second(), count),
                'S' => pad(&mut out, local.nanosecond() / 1_000_000 % 1000, count),
                'a' => out.push_str(if local.hour12().0 { "PM" } else { "AM" }),
                'E' => {
                    let day = WEEKDAYS[local.weekday().num_days_from_monday() as usize];
                    out.push_str(if count < 4 { &day[..3] } else { day });
                }
                'z' if zone.is_utc() => out.push_str("UTC"),
                'z' => out.push_str(zone.name()),
                'Z' => out.push_str(&offset_text(zone.offset(), false, true)),
                _ if zone.is_utc() => out.push('Z'),
                _ => out.push_str(&offset_text(zone.offset(), count >= 3, count >= 2)),
            }
        }
        Ok(out)
    }

    fn parse(&self, text: &str, kind: DateKind, zone: &TimeZone) -> Result<DateValue, FormatError> {
        let unparsable = || FormatError::unparsable(text, &self.name);
        let format = self.strftime();
        let text = text.trim();
        let instant = if self.has_field("zZX") {
            DateTime::parse_from_str(text, &format)
                .map_err(|_| unparsable())?
                .with_timezone(&Utc)
        } else {
            let naive = match kind {
                DateKind::Date => NaiveDate::parse_from_str(text, &format)
                    .map(|d| d.and_time(NaiveTime::MIN))
                    .map_err(|_| unparsable())?,
                DateKind::Time => {
                    let time = NaiveTime::parse_from_str(text, &format).map_err(|_| unparsable())?;
                    NaiveDate::from_ymd_opt(1970, 1, 1)
                        .ok_or_else(unparsable)?
                        .and_time(time)
                }
                DateKind::DateTime | DateKind::Unknown => {
                    NaiveDateTime::parse_from_str(text, &format).map_err(|_| unparsable())?
                }
            };
            local_to_utc(naive, zone).ok_or_else(unparsable)?
        };
        Ok(DateValue::new(instant, kind))
    }

    fn is_locale_bound(&self) -> bool {
        self.has_field("MEa")
    }

    fn is_time_zone_bound(&self) -> bool {
        true
    }

    fn description(&self) -> &str {
        &self.name
    }
}
