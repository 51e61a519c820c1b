//! Macro, function and host-directive calls.
//!
//! A call pushes a [`MacroFrame`] and makes it current; the frame is popped
//! on every exit path, errors included, so a failed call inside `??` or
//! `#attempt` leaves no trace. `#nested` switches back to the caller's frame
//! for the duration of the call-site body.

use std::sync::Arc;

use ftl_ir::{
    ArgRange, Capabilities, ElementKind, ElementRange, ExprId, ExprRange, Name, NameRange,
    ParamRange,
};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use super::scope::{Caller, ContextKind, MacroFrame};
use super::{Environment, Flow};
use crate::model::TemplateModel;
use crate::{MacroRef, SimpleHash, TemplateError, Value};

/// Arguments of one call, null arguments kept as `None`.
struct CallArgs {
    named: Vec<(Name, Option<Value>)>,
    positional: Vec<Option<Value>>,
}

/// The parts of a `#macro`/`#function` element.
#[derive(Copy, Clone)]
struct MacroDef {
    name: Name,
    params: ParamRange,
    catch_all: Name,
    body: ElementRange,
}

impl Environment<'_> {
    /// `<@callee args; loop_vars>body</@callee>`.
    pub(crate) fn visit_user_call(
        &mut self,
        callee: ExprId,
        args: ArgRange,
        loop_vars: NameRange,
        body: ElementRange,
        has_body: bool,
    ) -> Result<Flow, TemplateError> {
        let target = self.eval(callee)?;
        match &target {
            Value::Macro(m) if !m.is_function => {
                let caller = Caller {
                    frame: self.current_frame,
                    body,
                    loop_vars,
                };
                self.call_macro(*m, args, caller)
            }
            Value::Adapted(model) if model.as_directive().is_some() => {
                let model = Arc::clone(model);
                self.call_directive(&*model, callee, args, body, has_body)
            }
            Value::Macro(_) => Err(self
                .type_mismatch(callee, Capabilities::DIRECTIVE, &target)
                .with_tip("Functions are called from expressions, like ${f(x)}.")),
            _ => Err(self.type_mismatch(callee, Capabilities::DIRECTIVE, &target)),
        }
    }

    fn macro_def(&self, m: MacroRef) -> Result<MacroDef, TemplateError> {
        match self.template.ast.element(m.element).kind {
            ElementKind::MacroDef {
                name,
                params,
                catch_all,
                body,
                ..
            } => Ok(MacroDef {
                name,
                params,
                catch_all,
                body,
            }),
            _ => Err(TemplateError::bug("macro value doesn't point to a #macro element")),
        }
    }

    fn call_macro(
        &mut self,
        m: MacroRef,
        args: ArgRange,
        caller: Caller,
    ) -> Result<Flow, TemplateError> {
        let def = self.macro_def(m)?;
        let template = self.template;
        let mut call_args = CallArgs {
            named: Vec::new(),
            positional: Vec::new(),
        };
        for arg in template.ast.args(args) {
            let value = self.eval_nullable(arg.value)?;
            if arg.name.is_empty() {
                call_args.positional.push(value);
            } else {
                call_args.named.push((arg.name, value));
            }
        }
        tracing::trace!(name = template.name(def.name), "calling macro");

        let snapshot = self.snapshot();
        self.frames.push(MacroFrame {
            caller: Some(caller),
            ..MacroFrame::default()
        });
        self.current_frame = self.frames.len() - 1;
        let result = self
            .bind_params(def, call_args)
            .and_then(|()| self.visit(def.body));
        self.restore(&snapshot);
        match result? {
            Flow::Stop(message) => Ok(Flow::Stop(message)),
            _ => Ok(Flow::Normal),
        }
    }

    /// Bind call arguments in the current (new) frame; defaults see the
    /// parameters bound before them.
    fn bind_params(&mut self, def: MacroDef, args: CallArgs) -> Result<(), TemplateError> {
        let template = self.template;
        let params = template.ast.params(def.params);
        let macro_name = template.name(def.name);
        if !args.named.is_empty() && !args.positional.is_empty() {
            return Err(TemplateError::custom(format!(
                "Call to {macro_name} mixes named and positional arguments"
            )));
        }
        let catch_all = (!def.catch_all.is_empty()).then_some(def.catch_all);
        let mut bound = FxHashSet::default();
        let frame = self.current_frame;

        if args.positional.len() > params.len() && catch_all.is_none() {
            return Err(TemplateError::custom(format!(
                "Macro {macro_name} only accepts {} positional parameters, but got {}",
                params.len(),
                args.positional.len()
            )));
        }
        let mut extra = Vec::new();
        for (i, value) in args.positional.into_iter().enumerate() {
            match params.get(i) {
                Some(param) => {
                    if let Some(value) = value {
                        self.frames[frame].locals.insert(param.name, Some(value));
                        bound.insert(param.name);
                    }
                }
                None => extra.extend(value),
            }
        }

        let mut extra_named = SimpleHash::new();
        for (name, value) in args.named {
            if params.iter().any(|param| param.name == name) {
                if let Some(value) = value {
                    self.frames[frame].locals.insert(name, Some(value));
                    bound.insert(name);
                }
            } else if catch_all.is_some() {
                if let Some(value) = value {
                    extra_named.insert(template.name(name), value);
                }
            } else {
                return Err(TemplateError::custom(format!(
                    "Macro {macro_name} has no parameter with name {}",
                    template.name(name)
                )));
            }
        }
        if let Some(catch_all) = catch_all {
            let rest = if extra_named.is_empty() {
                Value::sequence(extra)
            } else {
                Value::hash(extra_named)
            };
            self.frames[frame].locals.insert(catch_all, Some(rest));
        }

        for param in params {
            if bound.contains(&param.name) {
                continue;
            }
            if !param.default.is_valid() {
                return Err(TemplateError::custom(format!(
                    "When calling macro {macro_name}, required parameter {} was not specified, \
                     or had null value",
                    template.name(param.name)
                )));
            }
            let value = self.eval(param.default)?;
            self.frames[frame].locals.insert(param.name, Some(value));
        }
        Ok(())
    }

    /// `<#nested args>`: the call-site body, in the caller's frame, with the
    /// call's loop variables bound to `args`.
    pub(crate) fn visit_nested(&mut self, args: ExprRange) -> Result<Flow, TemplateError> {
        let Some(caller) = self.frames.get(self.current_frame).and_then(|f| f.caller) else {
            return Err(TemplateError::custom(
                "#nested can only be used inside a macro called with <@...>",
            ));
        };
        let template = self.template;
        let values = template.ast.exprs(args);
        let mut params: SmallVec<[(Name, Option<Value>); 4]> = SmallVec::new();
        for (i, &name) in template.ast.names(caller.loop_vars).iter().enumerate() {
            let value = match values.get(i) {
                Some(&expr) => self.eval_nullable(expr)?,
                None => None,
            };
            params.push((name, value));
        }

        let snapshot = self.snapshot();
        self.current_frame = caller.frame;
        if !params.is_empty() {
            self.push_local(ContextKind::NestedParams(params));
        }
        let result = self.visit(caller.body);
        self.restore(&snapshot);
        match result? {
            Flow::Stop(message) => Ok(Flow::Stop(message)),
            _ => Ok(Flow::Normal),
        }
    }

    /// `callee(args)` in an expression.
    pub(crate) fn eval_call(
        &mut self,
        callee: ExprId,
        args: ExprRange,
    ) -> Result<Option<Value>, TemplateError> {
        let target = self.eval(callee)?;
        let template = self.template;
        let ids = template.ast.exprs(args);
        let mut values = Vec::with_capacity(ids.len());
        for &arg in ids {
            values.push(self.eval_nullable(arg)?);
        }
        match &target {
            Value::Macro(m) if m.is_function => self.call_function(*m, values).map(Some),
            Value::Adapted(model) if model.as_method().is_some() => {
                let mut plain = Vec::with_capacity(values.len());
                for (value, &id) in values.into_iter().zip(ids) {
                    match value {
                        Some(value) => plain.push(value),
                        None => return Err(self.missing(id)),
                    }
                }
                match model.as_method() {
                    Some(method) => self.facet(method.call(&plain), callee),
                    None => Err(self.type_mismatch(callee, Capabilities::METHOD, &target)),
                }
            }
            Value::Macro(_) => Err(self
                .type_mismatch(callee, Capabilities::METHOD, &target)
                .with_tip("Macros are called with <@name ...>, not from expressions.")),
            _ => Err(self.type_mismatch(callee, Capabilities::METHOD, &target)),
        }
    }

    /// Call a `#function`; its output is discarded and it must `#return` a
    /// value.
    pub(crate) fn call_function(
        &mut self,
        m: MacroRef,
        args: Vec<Option<Value>>,
    ) -> Result<Value, TemplateError> {
        let def = self.macro_def(m)?;
        let snapshot = self.snapshot();
        self.frames.push(MacroFrame::default());
        self.current_frame = self.frames.len() - 1;
        self.out.begin_capture();
        let call_args = CallArgs {
            named: Vec::new(),
            positional: args,
        };
        let result = self
            .bind_params(def, call_args)
            .and_then(|()| self.visit(def.body));
        self.restore(&snapshot);
        match result? {
            Flow::Return(Some(value)) => Ok(value),
            Flow::Stop(message) => Err(TemplateError::stopped(message)),
            _ => Err(TemplateError::custom(format!(
                "Function {} has ended without #return",
                self.template.name(def.name)
            ))),
        }
    }

    /// A directive implemented by the data model. The body is rendered first
    /// and handed over as text.
    fn call_directive(
        &mut self,
        model: &dyn TemplateModel,
        callee: ExprId,
        args: ArgRange,
        body: ElementRange,
        has_body: bool,
    ) -> Result<Flow, TemplateError> {
        let template = self.template;
        let mut params = Vec::new();
        for arg in template.ast.args(args) {
            if arg.name.is_empty() {
                return Err(self.blame(
                    TemplateError::custom(
                        "Directives of the data model only accept named parameters",
                    ),
                    arg.value,
                ));
            }
            let value = self.eval(arg.value)?;
            params.push((template.name(arg.name).to_owned(), value));
        }
        let content = if has_body {
            self.out.begin_capture();
            let result = self.visit(body);
            let text = self.out.end_capture();
            match result? {
                Flow::Normal => Some(text),
                flow => return Ok(flow),
            }
        } else {
            None
        };
        let Some(directive) = model.as_directive() else {
            return Err(TemplateError::bug("directive facet disappeared"));
        };
        let output = self.facet(directive.execute(&params, content.as_deref()), callee)?;
        self.write(&output)?;
        Ok(Flow::Normal)
    }
}
