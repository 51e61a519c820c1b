//! Output formats and escaping for FTL templates.
//!
//! Every text-producing node of a template is destined for one
//! [`OutputFormat`]. Escaping formats (HTML, XHTML, XML, RTF) know how to turn
//! plain text into markup; the others (plain text, JSON, JavaScript, CSS, raw,
//! undefined) pass text through untouched.
//!
//! A [`MarkupValue`] is text tagged with the format it is markup of. It is
//! never escaped again when printed into the same format, and it is
//! converted through its plain-text source (when it has one) when printed
//! into a different format.
//!
//! # Architecture
//!
//! - [`OutputFormat`]: closed set of immutable format descriptors
//! - [`OutputFormatRegistry`]: name and file-extension lookup, built once per
//!   configuration and shared read-only
//! - [`escape`]: the per-format escaping functions
//! - [`MarkupValue`]: plain text and lazily computed markup, cheap to clone

pub mod escape;
mod format;
mod markup;
mod registry;

pub use format::OutputFormat;
pub use markup::{concat, MarkupValue};
pub use registry::OutputFormatRegistry;

/// Errors raised when markup and formats don't fit together.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OutputError {
    /// Escaping was requested from a format that has no escaping rules.
    #[error(
        "the current output format is {format}, which is not a markup format, \
         so escaping with ?{builtin} is not supported"
    )]
    NotMarkupFormat {
        format: OutputFormat,
        builtin: &'static str,
    },

    /// Markup of one format can't be inserted into another.
    #[error(
        "the value to print is markup of the {from} output format, and the current output \
         format is {to}; conversion is not possible because the value has no plain text source"
    )]
    IncompatibleMarkup { from: OutputFormat, to: OutputFormat },
}
