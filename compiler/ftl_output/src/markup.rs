//! Markup values.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::format::OutputFormat;
use crate::OutputError;

/// Text tagged with the output format it is markup of.
///
/// A value built from plain text keeps that text and computes its markup on
/// first use. The markup cell may be filled by two threads at once; both
/// compute the same string and whichever store lands first is kept, so the
/// cell needs no lock.
#[derive(Clone)]
pub struct MarkupValue(Arc<MarkupInner>);

struct MarkupInner {
    format: OutputFormat,
    plain: Option<String>,
    markup: OnceLock<String>,
}

impl MarkupValue {
    pub(crate) fn from_plain_text(format: OutputFormat, plain: String) -> Self {
        MarkupValue(Arc::new(MarkupInner {
            format,
            plain: Some(plain),
            markup: OnceLock::new(),
        }))
    }

    pub(crate) fn from_markup(format: OutputFormat, markup: String) -> Self {
        MarkupValue(Arc::new(MarkupInner {
            format,
            plain: None,
            markup: OnceLock::from(markup),
        }))
    }

    pub fn format(&self) -> OutputFormat {
        self.0.format
    }

    /// The plain text this markup was escaped from, if it was.
    pub fn source_plain_text(&self) -> Option<&str> {
        self.0.plain.as_deref()
    }

    /// The markup text, escaping the plain source on first call.
    pub fn markup(&self) -> &str {
        if let Some(markup) = self.0.markup.get() {
            return markup;
        }
        let computed = self
            .0
            .format
            .escape_to_string(self.0.plain.as_deref().unwrap_or_default());
        // A concurrent caller may have stored an identical string first.
        let _ = self.0.markup.set(computed);
        self.0.markup.get().map_or("", String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        match &self.0.plain {
            Some(plain) => plain.is_empty(),
            None => self.markup().is_empty(),
        }
    }

    /// Whether the markup text has already been computed.
    pub fn is_markup_computed(&self) -> bool {
        self.0.markup.get().is_some()
    }

    /// Re-express this value in `target`, going through plain text.
    pub fn convert_to(&self, target: OutputFormat) -> Result<MarkupValue, OutputError> {
        if self.format() == target {
            return Ok(self.clone());
        }
        match self.source_plain_text() {
            Some(plain) => target.escape_plain_text(plain),
            None => Err(OutputError::IncompatibleMarkup {
                from: self.format(),
                to: target,
            }),
        }
    }
}

impl fmt::Debug for MarkupValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Markup({}: {:?})", self.format(), self.markup())
    }
}

impl PartialEq for MarkupValue {
    fn eq(&self, other: &Self) -> bool {
        self.format() == other.format() && self.markup() == other.markup()
    }
}

/// Concatenate two markup values.
///
/// Values of the same format join directly. Otherwise one side is converted
/// into the other's format through its plain-text source; if neither side
/// has one the formats are incompatible.
pub fn concat(left: &MarkupValue, right: &MarkupValue) -> Result<MarkupValue, OutputError> {
    let (left, right) = if left.format() == right.format() {
        (left.clone(), right.clone())
    } else if right.source_plain_text().is_some() {
        (left.clone(), right.convert_to(left.format())?)
    } else if left.source_plain_text().is_some() {
        (left.convert_to(right.format())?, right.clone())
    } else {
        return Err(OutputError::IncompatibleMarkup {
            from: right.format(),
            to: left.format(),
        });
    };
    let format = left.format();
    match (left.source_plain_text(), right.source_plain_text()) {
        (Some(l), Some(r)) => Ok(MarkupValue::from_plain_text(format, format!("{l}{r}"))),
        _ => Ok(MarkupValue::from_markup(
            format,
            format!("{}{}", left.markup(), right.markup()),
        )),
    }
}

#[cfg(test)]
mod tests;
