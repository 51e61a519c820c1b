//! The closed set of output formats.

use std::fmt;

use crate::escape;
use crate::markup::MarkupValue;
use crate::OutputError;

/// An output format descriptor.
///
/// Formats are plain `Copy` values; every piece of policy hangs off a
/// `match`, so the set is fixed and shared by all templates and renders.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Html,
    Xhtml,
    Xml,
    Rtf,
    PlainText,
    Json,
    JavaScript,
    Css,
    /// Output is written as is, markup of any format is printed verbatim.
    Raw,
    /// No format was chosen; behaves like [`OutputFormat::Raw`].
    Undefined,
}

impl OutputFormat {
    /// Every standard format, in registry order.
    pub const ALL: [OutputFormat; 10] = [
        OutputFormat::Html,
        OutputFormat::Xhtml,
        OutputFormat::Xml,
        OutputFormat::Rtf,
        OutputFormat::PlainText,
        OutputFormat::Json,
        OutputFormat::JavaScript,
        OutputFormat::Css,
        OutputFormat::Raw,
        OutputFormat::Undefined,
    ];

    /// The name templates use to refer to this format.
    pub const fn name(self) -> &'static str {
        match self {
            OutputFormat::Html => "HTML",
            OutputFormat::Xhtml => "XHTML",
            OutputFormat::Xml => "XML",
            OutputFormat::Rtf => "RTF",
            OutputFormat::PlainText => "plainText",
            OutputFormat::Json => "JSON",
            OutputFormat::JavaScript => "JavaScript",
            OutputFormat::Css => "CSS",
            OutputFormat::Raw => "raw",
            OutputFormat::Undefined => "undefined",
        }
    }

    pub const fn mime_type(self) -> Option<&'static str> {
        match self {
            OutputFormat::Html => Some("text/html"),
            OutputFormat::Xhtml => Some("application/xhtml+xml"),
            OutputFormat::Xml => Some("application/xml"),
            OutputFormat::Rtf => Some("application/rtf"),
            OutputFormat::PlainText => Some("text/plain"),
            OutputFormat::Json => Some("application/json"),
            OutputFormat::JavaScript => Some("application/javascript"),
            OutputFormat::Css => Some("text/css"),
            OutputFormat::Raw | OutputFormat::Undefined => None,
        }
    }

    /// Whether this format escapes plain text into markup.
    pub const fn is_markup(self) -> bool {
        matches!(
            self,
            OutputFormat::Html | OutputFormat::Xhtml | OutputFormat::Xml | OutputFormat::Rtf
        )
    }

    /// Whether markup of a different format may be printed here verbatim.
    pub const fn is_output_format_mixing_allowed(self) -> bool {
        matches!(self, OutputFormat::Raw | OutputFormat::Undefined)
    }

    /// Whether a legacy escaping built-in (`?html`, `?xml`, ...) returns
    /// markup of this format unchanged instead of escaping it again.
    pub fn is_legacy_builtin_bypassed(self, builtin: &str) -> bool {
        match self {
            OutputFormat::Html | OutputFormat::Xhtml => {
                matches!(builtin, "html" | "xml" | "xhtml")
            }
            OutputFormat::Xml => builtin == "xml",
            OutputFormat::Rtf => builtin == "rtf",
            _ => false,
        }
    }

    /// Escape `text` to a markup string without wrapping it.
    ///
    /// Non-markup formats return the text unchanged.
    pub fn escape_to_string(self, text: &str) -> String {
        match self {
            OutputFormat::Html => escape::html(text).into_owned(),
            OutputFormat::Xhtml => escape::xhtml(text).into_owned(),
            OutputFormat::Xml => escape::xml(text).into_owned(),
            OutputFormat::Rtf => escape::rtf(text).into_owned(),
            _ => text.to_owned(),
        }
    }

    /// Wrap plain text as a markup value of this format.
    ///
    /// The markup itself is computed the first time it is needed.
    pub fn escape_plain_text(self, text: impl Into<String>) -> Result<MarkupValue, OutputError> {
        if self.is_markup() {
            Ok(MarkupValue::from_plain_text(self, text.into()))
        } else {
            Err(OutputError::NotMarkupFormat {
                format: self,
                builtin: "esc",
            })
        }
    }

    /// Wrap text that already is markup of this format.
    pub fn from_markup(self, markup: impl Into<String>) -> Result<MarkupValue, OutputError> {
        if self.is_markup() {
            Ok(MarkupValue::from_markup(self, markup.into()))
        } else {
            Err(OutputError::NotMarkupFormat {
                format: self,
                builtin: "no_esc",
            })
        }
    }

    /// Append plain text to `out`, escaping it when `escape` is set and this
    /// is a markup format.
    pub fn output_text(self, text: &str, escape: bool, out: &mut String) {
        if escape && self.is_markup() {
            match self {
                OutputFormat::Html => out.push_str(&escape::html(text)),
                OutputFormat::Xhtml => out.push_str(&escape::xhtml(text)),
                OutputFormat::Xml => out.push_str(&escape::xml(text)),
                _ => out.push_str(&escape::rtf(text)),
            }
        } else {
            out.push_str(text);
        }
    }

    /// Append a markup value to `out`, converting it when its format differs.
    pub fn output_markup(self, value: &MarkupValue, out: &mut String) -> Result<(), OutputError> {
        if value.format() == self || self.is_output_format_mixing_allowed() {
            out.push_str(value.markup());
            return Ok(());
        }
        match value.source_plain_text() {
            Some(plain) => {
                self.output_text(plain, true, out);
                Ok(())
            }
            None => Err(OutputError::IncompatibleMarkup {
                from: value.format(),
                to: self,
            }),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
