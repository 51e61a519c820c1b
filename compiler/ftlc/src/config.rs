//! Engine configuration.
//!
//! A [`Configuration`] is built once and then only read: it holds the parser
//! settings, the default render settings, the built-in and output-format
//! tables and the shared variables. Templates parsed with it keep what they
//! need, so a configuration can be dropped while its templates render on.

use std::sync::Arc;

use ftl_eval::{RenderSettings, SettingError, SimpleHash, Value};
use ftl_ir::{BuiltInTable, InterpolationSyntax, TagSyntax};
use ftl_output::{OutputFormat, OutputFormatRegistry};
use ftl_parse::{ParseError, ParserSettings};

use crate::Template;

/// A configuration value that was rejected.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown output format {0:?}")]
    UnknownOutputFormat(String),

    #[error(transparent)]
    Setting(#[from] SettingError),

    #[error("invalid settings file: {0}")]
    SettingsFile(#[from] serde_json::Error),
}

/// Immutable engine configuration, shareable across threads.
#[derive(Clone, Debug)]
pub struct Configuration {
    parser: ParserSettings,
    render: RenderSettings,
    builtins: Arc<BuiltInTable>,
    formats: Arc<OutputFormatRegistry>,
    shared: Arc<SimpleHash>,
}

impl Default for Configuration {
    fn default() -> Self {
        ConfigurationBuilder::new().build()
    }
}

impl Configuration {
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new()
    }

    pub fn parser_settings(&self) -> &ParserSettings {
        &self.parser
    }

    /// Settings every render starts with; `#setting` changes a copy.
    pub fn render_settings(&self) -> &RenderSettings {
        &self.render
    }

    pub fn builtins(&self) -> &BuiltInTable {
        &self.builtins
    }

    pub fn output_formats(&self) -> &OutputFormatRegistry {
        &self.formats
    }

    pub fn shared_variables(&self) -> &Arc<SimpleHash> {
        &self.shared
    }

    /// Shorthand for [`Template::parse`].
    pub fn parse(&self, name: &str, source: &str) -> Result<Template, ParseError> {
        Template::parse(name, source, self)
    }
}

/// Builder for [`Configuration`].
#[derive(Clone, Debug)]
pub struct ConfigurationBuilder {
    parser: ParserSettings,
    render: RenderSettings,
    formats: OutputFormatRegistry,
    shared: SimpleHash,
}

impl Default for ConfigurationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigurationBuilder {
    pub fn new() -> Self {
        ConfigurationBuilder {
            parser: ParserSettings::default(),
            render: RenderSettings::default(),
            formats: OutputFormatRegistry::standard(),
            shared: SimpleHash::new(),
        }
    }

    #[must_use]
    pub fn tag_syntax(mut self, syntax: TagSyntax) -> Self {
        self.parser.tag_syntax = syntax;
        self
    }

    #[must_use]
    pub fn interpolation_syntax(mut self, syntax: InterpolationSyntax) -> Self {
        self.parser.interpolation_syntax = syntax;
        self
    }

    /// Output format of templates that don't choose one in `#ftl`.
    #[must_use]
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.parser.output_format = format;
        self
    }

    /// Output format by registered name (`"HTML"`, `"plainText"`, ...).
    pub fn output_format_name(self, name: &str) -> Result<Self, ConfigError> {
        match self.formats.by_name(name) {
            Some(format) => Ok(self.output_format(format)),
            None => Err(ConfigError::UnknownOutputFormat(name.to_owned())),
        }
    }

    #[must_use]
    pub fn auto_escape(mut self, enabled: bool) -> Self {
        self.parser.auto_escape = enabled;
        self
    }

    /// Drop lines holding only directives and white space.
    #[must_use]
    pub fn strip_whitespace(mut self, enabled: bool) -> Self {
        self.parser.strip_whitespace = enabled;
        self
    }

    #[must_use]
    pub fn render_settings(mut self, settings: RenderSettings) -> Self {
        self.render = settings;
        self
    }

    /// A render setting by name, with the same names and values `#setting`
    /// accepts.
    pub fn setting(mut self, name: &str, value: &str) -> Result<Self, ConfigError> {
        self.render.set(name, value)?;
        Ok(self)
    }

    /// A variable visible to every template, behind the data model.
    #[must_use]
    pub fn shared_variable(mut self, name: &str, value: Value) -> Self {
        self.shared.insert(name, value);
        self
    }

    pub fn build(self) -> Configuration {
        tracing::debug!(
            output_format = %self.parser.output_format,
            shared = self.shared.len(),
            "configuration built"
        );
        Configuration {
            parser: self.parser,
            render: self.render,
            builtins: Arc::new(BuiltInTable::new()),
            formats: Arc::new(self.formats),
            shared: Arc::new(self.shared),
        }
    }
}
