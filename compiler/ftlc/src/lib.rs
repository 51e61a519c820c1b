//! FTL - a template engine for text output.
//!
//! This crate is the public face of the workspace: configure once, parse
//! templates, render them against data models.
//!
//! ```no_run
//! use ftlc::{json, Configuration};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Configuration::builder().output_format_name("HTML")?.build();
//! let template = config.parse("greeting.ftlh", "<p>Hello ${user.name}!</p>")?;
//! let model = json::data_model_from_str(r#"{"user": {"name": "<Ann>"}}"#)?;
//! assert_eq!(template.render_to_string(model)?, "<p>Hello &lt;Ann&gt;!</p>");
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`Configuration`]: parser settings, default render settings, shared
//!   variables; immutable once built
//! - [`Template`]: a parsed template, rendered any number of times, from any
//!   number of threads
//! - [`json`]: JSON documents as data models
//! - [`diagnostics`]: source-annotated reports for parse and render errors
//! - [`Settings`]: the `--settings` file of the `ftl` command

mod config;
pub mod diagnostics;
pub mod json;
mod settings;
mod template;

pub use config::{ConfigError, Configuration, ConfigurationBuilder};
pub use settings::{InterpolationSetting, Settings, TagSyntaxSetting};
pub use template::{RenderHandle, Template};

pub use ftl_eval::{
    model, DateKind, DateValue, Number, RenderError, RenderSettings, SimpleHash, TemplateError,
    TemplateErrorKind, TimeZone, Value,
};
pub use ftl_ir::{InterpolationSyntax, TagSyntax};
pub use ftl_output::OutputFormat;
pub use ftl_parse::{ParseError, ParseErrorKind};
