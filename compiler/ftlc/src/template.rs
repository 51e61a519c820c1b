//! Parsed templates and rendering.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ftl_eval::{Environment, RenderError, RenderSettings, SimpleHash, Value};
use ftl_output::OutputFormat;
use ftl_parse::{ParseError, ParsedTemplate};

use crate::Configuration;

/// A parsed template, immutable and shareable across threads.
///
/// Rendering never changes the template: every render gets its own
/// [`Environment`] with a copy of the configuration's render settings.
#[derive(Clone, Debug)]
pub struct Template {
    name: String,
    source: String,
    parsed: ParsedTemplate,
    settings: RenderSettings,
    shared: Arc<SimpleHash>,
}

impl Template {
    #[tracing::instrument(level = "debug", skip(source, config))]
    pub fn parse(name: &str, source: &str, config: &Configuration) -> Result<Template, ParseError> {
        let parsed = ftl_parse::parse(
            source,
            config.parser_settings(),
            config.builtins(),
            config.output_formats(),
        )?;
        Ok(Template {
            name: name.to_owned(),
            source: source.to_owned(),
            parsed,
            settings: config.render_settings().clone(),
            shared: Arc::clone(config.shared_variables()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn output_format(&self) -> OutputFormat {
        self.parsed.output_format
    }

    /// The template printed back from its syntax tree.
    pub fn canonical(&self) -> String {
        self.parsed.canonical()
    }

    /// Render against `data_model`, which must be a hash.
    pub fn render(&self, data_model: Value, out: &mut dyn io::Write) -> Result<(), RenderError> {
        self.render_with(data_model, out, &RenderHandle::new())
    }

    /// Render, aborting when `handle` is interrupted from another thread.
    pub fn render_with(
        &self,
        data_model: Value,
        out: &mut dyn io::Write,
        handle: &RenderHandle,
    ) -> Result<(), RenderError> {
        Environment::new(&self.parsed, &self.source, data_model, out)
            .with_name(&self.name)
            .with_settings(self.settings.clone())
            .with_shared(&self.shared)
            .with_interrupt(Arc::clone(&handle.flag))
            .process()
    }

    pub fn render_to_string(&self, data_model: Value) -> Result<String, RenderError> {
        let mut out = Vec::new();
        self.render(data_model, &mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

/// Cancels a running render.
#[derive(Clone, Debug, Default)]
pub struct RenderHandle {
    flag: Arc<AtomicBool>,
}

impl RenderHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// The render stops with [`RenderError::Interrupted`] before its next
    /// element.
    pub fn interrupt(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_interrupted(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
