//! Number and date formatters.
//!
//! Formatters are created from the format strings of the settings
//! (`number_format`, `date_format`, ...) or of `?string(pattern)` and cached
//! per render by [`FormatCache`]. Changing the locale or the time zone drops
//! the cached formatters bound to it.
//!
//! # Built-in formats
//!
//! - numbers: `number` (`#,##0.###`), `computer`/`c`, `percent`, and decimal
//!   patterns such as `0.00`, `#,##0.#` or `000`
//! - dates: `iso`, `xs`, the `short`/`medium`/`long`/`full` presets (and
//!   `short_medium`-style pairs for date-times), letter patterns such
//!   as `yyyy-MM-dd HH:mm:ss`
//!
//! Locale data tables are out of scope: names and separators are English.

mod date;
mod number;

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::{DateKind, DateValue, Number, TimeZone};

pub use date::{IsoDateFormat, PatternDateFormat};
pub use number::{ComputerNumberFormat, DecimalNumberFormat};
pub(crate) use number::parse_computer;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("malformed format string {pattern:?}: {reason}")]
    MalformedPattern { pattern: String, reason: String },

    #[error("can't parse {text:?} with format {format:?}")]
    Unparsable { text: String, format: String },

    #[error("can't format {what} with format {format:?}")]
    Unformattable { what: String, format: String },
}

impl FormatError {
    fn malformed(pattern: &str, reason: impl Into<String>) -> Self {
        FormatError::MalformedPattern {
            pattern: pattern.to_owned(),
            reason: reason.into(),
        }
    }

    fn unparsable(text: &str, format: &str) -> Self {
        FormatError::Unparsable {
            text: text.to_owned(),
            format: format.to_owned(),
        }
    }
}

pub trait TemplateNumberFormat: Send + Sync + fmt::Debug {
    fn format(&self, number: Number) -> Result<String, FormatError>;
    fn parse(&self, text: &str) -> Result<Number, FormatError>;
    /// Whether the output depends on the locale setting.
    fn is_locale_bound(&self) -> bool;
    /// The format string this formatter was created from.
    fn description(&self) -> &str;
}

pub trait TemplateDateFormat: Send + Sync + fmt::Debug {
    fn format(&self, date: &DateValue, zone: &TimeZone) -> Result<String, FormatError>;
    fn parse(&self, text: &str, kind: DateKind, zone: &TimeZone) -> Result<DateValue, FormatError>;
    fn is_locale_bound(&self) -> bool;
    fn is_time_zone_bound(&self) -> bool;
    fn description(&self) -> &str;
}

/// Create the number formatter for a format string.
pub fn number_format(format: &str) -> Result<Arc<dyn TemplateNumberFormat>, FormatError> {
    match format {
        "computer" | "c" => Ok(Arc::new(ComputerNumberFormat)),
        "number" | "" => Ok(Arc::new(DecimalNumberFormat::with_name(format, "#,##0.###")?)),
        "percent" => Ok(Arc::new(DecimalNumberFormat::with_name(format, "#,##0%")?)),
        "currency" => Err(FormatError::malformed(
            format,
            "currency formats need locale data, which isn't available",
        )),
        pattern => Ok(Arc::new(DecimalNumberFormat::new(pattern)?)),
    }
}

/// Create the date formatter for a format string and date kind.
pub fn date_format(
    format: &str,
    kind: DateKind,
) -> Result<Arc<dyn TemplateDateFormat>, FormatError> {
    match format {
        "iso" => Ok(Arc::new(IsoDateFormat::iso())),
        "xs" => Ok(Arc::new(IsoDateFormat::xs())),
        _ => match date::preset(format, kind) {
            Some(pattern) => Ok(Arc::new(PatternDateFormat::with_name(format, &pattern)?)),
            None => Ok(Arc::new(PatternDateFormat::new(format)?)),
        },
    }
}

/// Per-render formatter cache keyed by format string.
#[derive(Default)]
pub struct FormatCache {
    numbers: FxHashMap<String, Arc<dyn TemplateNumberFormat>>,
    dates: FxHashMap<(String, DateKind), Arc<dyn TemplateDateFormat>>,
}

impl FormatCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn number(&mut self, format: &str) -> Result<Arc<dyn TemplateNumberFormat>, FormatError> {
        if let Some(cached) = self.numbers.get(format) {
            return Ok(Arc::clone(cached));
        }
        let created = number_format(format)?;
        self.numbers.insert(format.to_owned(), Arc::clone(&created));
        Ok(created)
    }

    pub fn date(
        &mut self,
        format: &str,
        kind: DateKind,
    ) -> Result<Arc<dyn TemplateDateFormat>, FormatError> {
        let key = (format.to_owned(), kind);
        if let Some(cached) = self.dates.get(&key) {
            return Ok(Arc::clone(cached));
        }
        let created = date_format(format, kind)?;
        self.dates.insert(key, Arc::clone(&created));
        Ok(created)
    }

    /// Drop formatters whose output depends on the locale.
    pub fn invalidate_locale_bound(&mut self) {
        let before = self.len();
        self.numbers.retain(|_, f| !f.is_locale_bound());
        self.dates.retain(|_, f| !f.is_locale_bound());
        tracing::debug!(dropped = before - self.len(), "locale changed, formatters invalidated");
    }

    /// Drop formatters whose output depends on the time zone.
    pub fn invalidate_time_zone_bound(&mut self) {
        let before = self.len();
        self.dates.retain(|_, f| !f.is_time_zone_bound());
        tracing::debug!(dropped = before - self.len(), "time zone changed, formatters invalidated");
    }

    pub fn len(&self) -> usize {
        self.numbers.len() + self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests;
