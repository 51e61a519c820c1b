//! Date, time and date-time values.

use std::fmt;

use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Which parts of a [`DateValue`] are meaningful.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DateKind {
    Date,
    Time,
    DateTime,
    /// Host values that don't say; formatting them is an error.
    Unknown,
}

impl DateKind {
    pub const fn name(self) -> &'static str {
        match self {
            DateKind::Date => "date",
            DateKind::Time => "time",
            DateKind::DateTime => "date-time",
            DateKind::Unknown => "unknown date type",
        }
    }
}

/// An instant plus the kind of value it represents.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DateValue {
    pub instant: DateTime<Utc>,
    pub kind: DateKind,
}

impl DateValue {
    pub fn new(instant: DateTime<Utc>, kind: DateKind) -> Self {
        DateValue { instant, kind }
    }

    pub fn now() -> Self {
        DateValue::new(Utc::now(), DateKind::DateTime)
    }

    #[must_use]
    pub fn with_kind(self, kind: DateKind) -> Self {
        DateValue { kind, ..self }
    }

    pub fn in_zone(&self, zone: &TimeZone) -> DateTime<FixedOffset> {
        self.instant.with_timezone(&zone.offset)
    }
}

/// A named fixed-offset time zone.
///
/// Accepts `UTC`, `GMT`, `Z` and offsets such as `+02:00`, `-0530` or
/// `GMT+2`. Region names need the time-zone database and are rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeZone {
    name: String,
    offset: FixedOffset,
}

impl TimeZone {
    pub fn utc() -> Self {
        TimeZone {
            name: "UTC".to_owned(),
            offset: Utc.fix(),
        }
    }

    pub fn parse(text: &str) -> Option<TimeZone> {
        let trimmed = text.trim();
        let upper = trimmed.to_ascii_uppercase();
        if matches!(upper.as_str(), "UTC" | "GMT" | "Z" | "ETC/UTC" | "ETC/GMT") {
            return Some(TimeZone::utc());
        }
        let offset_text = upper
            .strip_prefix("UTC")
            .or_else(|| upper.strip_prefix("GMT"))
            .unwrap_or(&upper);
        let seconds = parse_offset(offset_text)?;
        let offset = FixedOffset::east_opt(seconds)?;
        Some(TimeZone {
            name: trimmed.to_owned(),
            offset,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn is_utc(&self) -> bool {
        self.offset.local_minus_utc() == 0
    }
}

impl Default for TimeZone {
    fn default() -> Self {
        TimeZone::utc()
    }
}

impl fmt::Display for TimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// `+HH`, `+H`, `+HHMM` or `+HH:MM`, in seconds east of UTC.
fn parse_offset(text: &str) -> Option<i32> {
    let (sign, rest) = match text.as_bytes().first()? {
        b'+' => (1, &text[1..]),
        b'-' => (-1, &text[1..]),
        _ => return None,
    };
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, "0"),
    };
    if hours.is_empty() || hours.len() > 2 || minutes.len() > 2 {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 18 || minutes > 59 {
        return None;
    }
    Some(sign * (hours * 3600 + minutes * 60))
}
