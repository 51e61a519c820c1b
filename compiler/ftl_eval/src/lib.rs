//! FTL Eval - the interpreter that renders parsed FTL templates.
//!
//! A render pairs an immutable [`ParsedTemplate`](ftl_parse::ParsedTemplate)
//! with a data model and a writer. The [`Environment`] owns everything that
//! changes during that render: variables, macro frames, settings, cached
//! formatters and the output buffer.
//!
//! # Architecture
//!
//! - [`Value`]: runtime values, with [`model`] capability traits for host
//!   objects plugged into the data model
//! - [`Number`], [`DateValue`]: template numbers and dates
//! - [`format`]: number and date formatters, cached per render
//! - [`RenderSettings`]: formatting settings, changed by `#setting`
//! - [`Environment`]: directive and expression evaluation, built-ins
//! - [`TemplateError`], [`RenderError`]: errors with blame and FTL stack

mod date;
mod env;
mod errors;
pub mod format;
pub mod model;
mod number;
mod settings;
mod value;

pub use date::{DateKind, DateValue, TimeZone};
pub use env::{Environment, Flow};
pub use errors::{RenderError, StackEntry, TemplateError, TemplateErrorKind};
pub use number::{ArithmeticError, Number};
pub use settings::{RenderSettings, SettingChange, SettingError};
pub use value::{ItemIter, Lookup, MacroRef, RangeValue, SimpleHash, Value};
