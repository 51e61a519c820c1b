//! The per-render interpreter.
//!
//! An [`Environment`] walks a [`ParsedTemplate`] against a data model and
//! writes the output. It is created for one render and consumed by
//! [`Environment::process`]; templates themselves are immutable and shared.
//!
//! # Architecture
//!
//! - `elements` visits directives and returns a [`Flow`] for control transfer
//! - `expr` evaluates expressions, `operators` the binary operators
//! - `builtins` applies `?name` built-ins, grouped by target type
//! - `text` converts values to text through the cached formatters
//! - `calls` binds macro, function and host-directive calls
//! - `scope` holds macro frames and the local-context stack
//! - `output` buffers output and the capture stack
//!
//! # Variable resolution
//!
//! A name resolves, in order, against the local contexts pushed by the
//! current frame (loop variables, nested-content and lambda parameters), the
//! current macro frame, the main namespace (`#assign`), the globals
//! (`#global`), the data model and finally the shared variables of the
//! configuration. Local contexts and macro frames can bind a name to null;
//! such a binding hides outer variables of the same name.

mod builtins;
mod calls;
mod elements;
mod expr;
mod operators;
mod output;
mod scope;
mod text;

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ftl_ir::{Capabilities, Canonical, ElementId, ElementKind, ExprId, LineIndex, Name};
use ftl_output::OutputFormat;
use ftl_parse::ParsedTemplate;

use crate::errors::StackEntry;
use crate::format::FormatCache;
use crate::model::ModelError;
use crate::{Lookup, MacroRef, RenderError, RenderSettings, SimpleHash, TemplateError, Value};

use output::Output;
use scope::{LocalContext, MacroFrame};

/// How a visited element hands control back to its parent.
#[derive(Clone, Debug, PartialEq)]
pub enum Flow {
    Normal,
    Break,
    Continue,
    /// `#return`, with the value when leaving a function.
    Return(Option<Value>),
    /// `#stop`, with its message.
    Stop(Option<String>),
}

/// Per-render interpreter state.
pub struct Environment<'a> {
    template: &'a ParsedTemplate,
    source: &'a str,
    name: &'a str,
    lines: LineIndex,
    settings: RenderSettings,
    formats: FormatCache,
    data_model: Value,
    shared: Option<&'a SimpleHash>,
    globals: SimpleHash,
    main: SimpleHash,
    frames: Vec<MacroFrame>,
    current_frame: usize,
    locals: Vec<LocalContext>,
    out: Output<'a>,
    /// `(format, auto_escape)` of the enclosing format blocks.
    format_stack: Vec<(OutputFormat, bool)>,
    /// Elements being visited, outermost first.
    instructions: Vec<ElementId>,
    /// Errors caught by the enclosing `#attempt`s, for `.error`.
    recovered: Vec<TemplateError>,
    interrupt: Option<Arc<AtomicBool>>,
    /// Depth of parenthesised `??`/`!` operands being evaluated.
    tolerance: u32,
}

/// What an error is blamed on: an expression, or an assignment target.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Operand {
    Expr(ExprId),
    Var(Name),
}

impl From<ExprId> for Operand {
    fn from(expr: ExprId) -> Self {
        Operand::Expr(expr)
    }
}

/// Stack lengths restored when `#attempt` recovers.
struct Snapshot {
    frames: usize,
    current_frame: usize,
    locals: usize,
    formats: usize,
    captures: usize,
    tolerance: u32,
}

impl<'a> Environment<'a> {
    /// Create an environment rendering `template` (parsed from `source`)
    /// against `data_model` into `out`.
    pub fn new(
        template: &'a ParsedTemplate,
        source: &'a str,
        data_model: Value,
        out: &'a mut dyn io::Write,
    ) -> Self {
        Environment {
            template,
            source,
            name: "",
            lines: LineIndex::new(source),
            settings: RenderSettings::default(),
            formats: FormatCache::new(),
            data_model,
            shared: None,
            globals: SimpleHash::new(),
            main: SimpleHash::new(),
            frames: vec![MacroFrame::default()],
            current_frame: 0,
            locals: Vec::new(),
            out: Output::new(out),
            format_stack: vec![(template.output_format, template.auto_escape)],
            instructions: Vec::new(),
            recovered: Vec::new(),
            interrupt: None,
            tolerance: 0,
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: RenderSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Name reported by `.template_name`.
    #[must_use]
    pub fn with_name(mut self, name: &'a str) -> Self {
        self.name = name;
        self
    }

    /// Variables visible to every render of a configuration, consulted after
    /// the data model.
    #[must_use]
    pub fn with_shared(mut self, shared: &'a SimpleHash) -> Self {
        self.shared = Some(shared);
        self
    }

    /// A flag that aborts the render when set.
    #[must_use]
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Render the template.
    ///
    /// Output produced before a failure has already been written when this
    /// returns an error.
    #[tracing::instrument(level = "debug", skip_all, fields(template = self.name))]
    pub fn process(mut self) -> Result<(), RenderError> {
        if !self.data_model.is_hash() {
            return Err(TemplateError::custom(format!(
                "The data model must be a hash, but it is {}",
                self.data_model.type_description()
            ))
            .into());
        }
        self.define_macros();
        let result = self.visit(self.template.root);
        let finished = self.out.finish();
        match result {
            Ok(Flow::Stop(message)) => {
                finished?;
                tracing::debug!(?message, "stopped");
                Err(RenderError::Stopped { message })
            }
            Ok(_) => Ok(finished?),
            Err(error) => {
                tracing::debug!(kind = %error.kind, "render failed");
                Err(error.into())
            }
        }
    }

    /// Bind every macro and function in the main namespace.
    fn define_macros(&mut self) {
        let template = self.template;
        for &element in &template.macros {
            if let ElementKind::MacroDef {
                name, is_function, ..
            } = template.ast.element(element).kind
            {
                let value = Value::Macro(MacroRef {
                    element,
                    is_function,
                });
                self.main.insert(template.name(name), value);
            }
        }
    }

    fn check_interrupted(&self) -> Result<(), TemplateError> {
        match &self.interrupt {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(TemplateError::interrupted()),
            _ => Ok(()),
        }
    }

    /// Resolve a variable name through the scope chain.
    fn lookup(&self, name: Name) -> Result<Option<Value>, TemplateError> {
        match self.lookup_local(name) {
            Lookup::Absent => {}
            found => return Ok(found.into_option()),
        }
        let key = self.template.name(name);
        if let Some(value) = self.main.get(key).or_else(|| self.globals.get(key)) {
            return Ok(Some(value.clone()));
        }
        let from_model = self.data_model.hash_get(key).map_err(|e| {
            TemplateError::custom(format!(
                "The data model failed to look up {key:?}: {e}"
            ))
        })?;
        if from_model.is_some() {
            return Ok(from_model);
        }
        Ok(self.shared.and_then(|shared| shared.get(key)).cloned())
    }

    /// Local contexts of the current frame, innermost first, then the frame.
    fn lookup_local(&self, name: Name) -> Lookup {
        let visible = self
            .locals
            .iter()
            .rev()
            .filter(|ctx| ctx.frame == self.current_frame);
        for ctx in visible {
            let found = ctx.kind.lookup(name);
            if !found.is_absent() {
                return found;
            }
        }
        if self.current_frame > 0 {
            if let Some(value) = self.frames[self.current_frame].locals.get(&name) {
                return Lookup::from_option(value.clone());
            }
        }
        Lookup::Absent
    }

    fn push_local(&mut self, kind: scope::ContextKind) {
        self.locals.push(LocalContext {
            frame: self.current_frame,
            kind,
        });
    }

    fn current_format(&self) -> (OutputFormat, bool) {
        self.format_stack
            .last()
            .copied()
            .unwrap_or((self.template.output_format, self.template.auto_escape))
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            frames: self.frames.len(),
            current_frame: self.current_frame,
            locals: self.locals.len(),
            formats: self.format_stack.len(),
            captures: self.out.depth(),
            tolerance: self.tolerance,
        }
    }

    fn restore(&mut self, snapshot: &Snapshot) {
        self.frames.truncate(snapshot.frames);
        self.current_frame = snapshot.current_frame;
        self.locals.truncate(snapshot.locals);
        self.format_stack.truncate(snapshot.formats);
        self.out.truncate(snapshot.captures);
        self.tolerance = snapshot.tolerance;
    }

    fn write(&mut self, text: &str) -> Result<(), TemplateError> {
        self.out.push_str(text).map_err(|e| TemplateError::io(&e))
    }

    fn canonical(&self, expr: ExprId) -> String {
        Canonical::new(&self.template.ast, &self.template.interner).expr(expr)
    }

    /// Attach the blamed expression and its span, keeping any already set.
    fn blame(&self, mut error: TemplateError, expr: ExprId) -> TemplateError {
        if error.blamed.is_none() {
            error.blamed = Some(self.canonical(expr));
        }
        if error.span.is_none() {
            error.span = Some(self.template.ast.expr(expr).span);
        }
        error
    }

    fn blame_at(&self, mut error: TemplateError, at: Operand) -> TemplateError {
        match at {
            Operand::Expr(expr) => self.blame(error, expr),
            Operand::Var(name) => {
                if error.blamed.is_none() {
                    error.blamed = Some(self.template.name(name).to_owned());
                }
                error
            }
        }
    }

    fn operand_text(&self, at: Operand) -> String {
        match at {
            Operand::Expr(expr) => self.canonical(expr),
            Operand::Var(name) => self.template.name(name).to_owned(),
        }
    }

    fn type_mismatch(
        &self,
        at: impl Into<Operand>,
        expected: Capabilities,
        value: &Value,
    ) -> TemplateError {
        let at = at.into();
        let error =
            TemplateError::type_mismatch(expected, value.type_description(), self.operand_text(at));
        self.blame_at(error, at)
    }

    fn model_error(&self, error: &ModelError, expr: ExprId) -> TemplateError {
        self.blame(
            TemplateError::custom(format!(
                "A data model object failed while evaluating {}: {error}",
                self.canonical(expr)
            )),
            expr,
        )
    }

    /// Fill in the position and instruction stack of an error leaving `at`.
    fn locate(&self, mut error: TemplateError, at: ElementId) -> TemplateError {
        if matches!(
            error.kind,
            crate::TemplateErrorKind::InvalidReference { fast: true }
        ) {
            return error;
        }
        if error.pos.is_none() {
            let offset = error
                .span
                .map_or(self.template.ast.element(at).span.start, |span| span.start);
            error.pos = Some(self.lines.position(self.source, offset));
        }
        if error.stack.is_empty() {
            error.stack = self
                .instructions
                .iter()
                .rev()
                .map(|&id| StackEntry {
                    description: self.describe(id),
                    pos: self
                        .lines
                        .position(self.source, self.template.ast.element(id).span.start),
                })
                .collect();
        }
        error
    }

    /// Element description for stack traces: `${user.name}`, `#list items`.
    fn describe(&self, id: ElementId) -> String {
        let template = self.template;
        let kind = template.ast.element(id).kind;
        match kind {
            ElementKind::Interpolation { expr, .. } => format!("${{{}}}", self.canonical(expr)),
            ElementKind::List { source, .. } => format!("#list {}", self.canonical(source)),
            ElementKind::If(arms) => match template.ast.if_arms(arms).first() {
                Some(arm) if arm.cond.is_valid() => format!("#if {}", self.canonical(arm.cond)),
                _ => "#if".to_owned(),
            },
            ElementKind::Switch { value, .. } => format!("#switch {}", self.canonical(value)),
            ElementKind::UserCall { callee, .. } => format!("@{}", self.canonical(callee)),
            ElementKind::MacroDef { name, .. } => {
                format!("{} {}", kind.describe(), template.name(name))
            }
            other => other.describe().to_owned(),
        }
    }
}

#[cfg(test)]
mod tests;
