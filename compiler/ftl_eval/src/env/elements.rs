//! Directive execution.
//!
//! Every element returns a [`Flow`]; loops consume `Break`/`Continue`,
//! macro calls consume `Return`, and `Stop` travels to the top.

use ftl_ir::{
    AssignOp, AssignScope, CaseKind, CaseRange, ElementId, ElementKind, ElementRange, ExprId,
    ExprRange, LoopBinding, LoopVarBuiltIn, Name,
};
use ftl_stack::ensure_sufficient_stack;

use super::operators::arith_numbers;
use super::scope::{ContextKind, EntryIter, Iteration};
use super::{Environment, Flow, Operand};
use crate::model::ModelResult;
use crate::{Number, SettingChange, TemplateError, Value};

use ftl_ir::{ArithOp, Capabilities};

impl Environment<'_> {
    /// Visit elements in document order until one transfers control.
    pub(crate) fn visit(&mut self, range: ElementRange) -> Result<Flow, TemplateError> {
        let template = self.template;
        for &id in template.ast.elements(range) {
            match self.visit_element(id)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn visit_element(&mut self, id: ElementId) -> Result<Flow, TemplateError> {
        self.check_interrupted()?;
        self.instructions.push(id);
        let result = ensure_sufficient_stack(|| self.execute(id));
        let result = result.map_err(|error| self.locate(error, id));
        self.instructions.pop();
        result
    }

    fn execute(&mut self, id: ElementId) -> Result<Flow, TemplateError> {
        let template = self.template;
        match template.ast.element(id).kind {
            ElementKind::Text(text) | ElementKind::NoParse(text) => {
                self.write(template.name(text))?;
            }
            ElementKind::Interpolation {
                expr,
                format,
                auto_escape,
            } => {
                let value = self.eval(expr)?;
                let mut text = String::new();
                if let Value::Markup(markup) = &value {
                    format
                        .output_markup(markup, &mut text)
                        .map_err(|e| self.blame(TemplateError::markup(&e), expr))?;
                } else {
                    let plain = self.to_text(&value, expr)?;
                    format.output_text(&plain, auto_escape, &mut text);
                }
                self.write(&text)?;
            }
            ElementKind::If(arms) => {
                for arm in template.ast.if_arms(arms) {
                    if !arm.cond.is_valid() || self.eval_bool(arm.cond)? {
                        return self.visit(arm.body);
                    }
                }
            }
            ElementKind::List {
                source,
                binding,
                body,
                else_body,
            } => return self.visit_list(source, binding, body, else_body),
            ElementKind::Items { binding, body } => return self.visit_items(binding, body),
            ElementKind::Sep(body) => {
                if self.nearest_iteration(None).is_some_and(|(_, has_next)| has_next) {
                    return self.visit(body);
                }
            }
            ElementKind::Switch { value, cases } => return self.visit_switch(value, cases),
            ElementKind::Attempt { body, recover } => return self.visit_attempt(body, recover),
            ElementKind::AutoEsc(body) => {
                let (format, _) = self.current_format();
                return self.visit_with_format(format, true, body);
            }
            ElementKind::NoAutoEsc(body) => {
                let (format, _) = self.current_format();
                return self.visit_with_format(format, false, body);
            }
            ElementKind::OutputFormatBlock { format, body } => {
                let auto_escape = template.auto_escape_policy && format.is_markup();
                return self.visit_with_format(format, auto_escape, body);
            }
            ElementKind::Assign { scope, assignments } => {
                for assignment in template.ast.assignments(assignments) {
                    let value = self.assigned_value(
                        scope,
                        assignment.target,
                        assignment.op,
                        assignment.value,
                    )?;
                    self.set_variable(scope, assignment.target, value)?;
                }
            }
            ElementKind::AssignCapture {
                scope,
                target,
                body,
                format,
                auto_escape,
            } => {
                self.out.begin_capture();
                let result = self.visit(body);
                let text = self.out.end_capture();
                let flow = result?;
                let value = if auto_escape && format.is_markup() {
                    Value::Markup(format.from_markup(text).map_err(|e| TemplateError::markup(&e))?)
                } else {
                    Value::from(text)
                };
                self.set_variable(scope, target, value)?;
                return Ok(flow);
            }
            ElementKind::MacroDef { .. } | ElementKind::Comment(_) | ElementKind::FtlHeader(_) => {}
            ElementKind::UserCall {
                callee,
                args,
                loop_vars,
                body,
                has_body,
            } => return self.visit_user_call(callee, args, loop_vars, body, has_body),
            ElementKind::Nested(args) => return self.visit_nested(args),
            ElementKind::Return(expr) => {
                let value = if expr.is_valid() {
                    Some(self.eval(expr)?)
                } else {
                    None
                };
                return Ok(Flow::Return(value));
            }
            ElementKind::Break => return Ok(Flow::Break),
            ElementKind::Continue => return Ok(Flow::Continue),
            ElementKind::Stop(expr) => {
                let message = if expr.is_valid() {
                    Some(self.eval_text(expr)?)
                } else {
                    None
                };
                return Ok(Flow::Stop(message));
            }
            ElementKind::Setting { name, value } => self.apply_setting(name, value)?,
            ElementKind::Flush => self.out.flush().map_err(|e| TemplateError::io(&e))?,
            ElementKind::Compress(body) => {
                self.out.begin_capture();
                let result = self.visit(body);
                let text = self.out.end_capture();
                let flow = result?;
                self.write(&compress(&text))?;
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    }

    fn visit_list(
        &mut self,
        source: ExprId,
        binding: LoopBinding,
        body: ElementRange,
        else_body: ElementRange,
    ) -> Result<Flow, TemplateError> {
        let value = self.eval(source)?;
        let pairs = if binding.is_bound() {
            Some(binding.is_hash_listing())
        } else {
            None
        };
        let (mut entries, pairs) = self.list_entries(&value, source, pairs)?;
        if entries.peek().is_none() {
            return self.visit(else_body);
        }
        if binding.is_bound() {
            return self.iterate(binding, entries, body, source);
        }
        let mark = self.locals.len();
        self.push_local(ContextKind::PendingItems(Some((entries, pairs))));
        let result = self.visit(body);
        self.locals.truncate(mark);
        match result? {
            Flow::Break | Flow::Continue => Ok(Flow::Normal),
            flow => Ok(flow),
        }
    }

    fn visit_items(
        &mut self,
        binding: LoopBinding,
        body: ElementRange,
    ) -> Result<Flow, TemplateError> {
        let frame = self.current_frame;
        let pending = self
            .locals
            .iter_mut()
            .rev()
            .filter(|ctx| ctx.frame == frame)
            .find_map(|ctx| match &mut ctx.kind {
                ContextKind::PendingItems(pending) => Some(pending.take()),
                _ => None,
            });
        let Some(Some((entries, pairs))) = pending else {
            return Err(TemplateError::custom(
                "#items must be inside a #list without \"as\", and can be used only once there",
            ));
        };
        if pairs != binding.is_hash_listing() {
            let message = if pairs {
                "The listed value is a hash, so #items needs two loop variables: \
                 <#items as k, v>"
            } else {
                "The listed value isn't a hash, so #items needs exactly one loop variable"
            };
            return Err(TemplateError::custom(message));
        }
        self.iterate(binding, entries, body, ExprId::INVALID)
    }

    /// What `#list` iterates: items of a sequence, or key-value pairs of a
    /// hash. `pairs` is what the loop binding asks for, when it has one.
    fn list_entries(
        &self,
        value: &Value,
        source: ExprId,
        pairs: Option<bool>,
    ) -> Result<(EntryIter, bool), TemplateError> {
        let listable_seq = value.has(Capabilities::SEQUENCE | Capabilities::COLLECTION);
        let want_pairs = pairs.unwrap_or(!listable_seq && value.has(Capabilities::HASH_EX));
        if want_pairs {
            let Some(entries) = self.facet(value.hash_entries(), source)? else {
                return Err(self.type_mismatch(source, Capabilities::HASH_EX, value));
            };
            let iter: Box<dyn Iterator<Item = ModelResult<_>>> = Box::new(
                entries
                    .into_iter()
                    .map(|(key, value)| Ok((Some(Value::from(key)), value))),
            );
            return Ok((iter.peekable(), true));
        }
        match self.facet(value.iter_items(), source)? {
            Some(items) => {
                let iter: Box<dyn Iterator<Item = ModelResult<_>>> =
                    Box::new(items.map(|item| item.map(|item| (item, None))));
                Ok((iter.peekable(), false))
            }
            None if value.has(Capabilities::HASH_EX) => Err(self
                .type_mismatch(source, Capabilities::SEQUENCE | Capabilities::COLLECTION, value)
                .with_tip("Use <#list hash as key, value> to list a hash.")),
            None => Err(self.type_mismatch(source, Capabilities::LISTABLE, value)),
        }
    }

    fn iterate(
        &mut self,
        binding: LoopBinding,
        entries: EntryIter,
        body: ElementRange,
        source: ExprId,
    ) -> Result<Flow, TemplateError> {
        let mark = self.locals.len();
        self.push_local(ContextKind::Iteration(Iteration::new(binding)));
        let result = self.run_iterations(mark, entries, body, source);
        self.locals.truncate(mark);
        result
    }

    fn run_iterations(
        &mut self,
        mark: usize,
        mut entries: EntryIter,
        body: ElementRange,
        source: ExprId,
    ) -> Result<Flow, TemplateError> {
        let mut index = 0;
        while let Some(entry) = entries.next() {
            let (key, value) = match entry {
                Ok(entry) => entry,
                Err(e) if source.is_valid() => return Err(self.model_error(&e, source)),
                Err(e) => return Err(TemplateError::custom(e.to_string())),
            };
            let has_next = entries.peek().is_some();
            if let Some(ContextKind::Iteration(iteration)) =
                self.locals.get_mut(mark).map(|ctx| &mut ctx.kind)
            {
                iteration.index = index;
                iteration.has_next = has_next;
                iteration.key = key;
                iteration.value = value;
            }
            match self.visit(body)? {
                Flow::Normal | Flow::Continue => {}
                Flow::Break => break,
                flow => return Ok(flow),
            }
            index += 1;
        }
        Ok(Flow::Normal)
    }

    /// `(index, has_next)` of the innermost iteration of the current frame,
    /// or of the one declaring `var`.
    fn nearest_iteration(&self, var: Option<Name>) -> Option<(usize, bool)> {
        self.locals
            .iter()
            .rev()
            .filter(|ctx| ctx.frame == self.current_frame)
            .find_map(|ctx| match &ctx.kind {
                ContextKind::Iteration(it) if var.is_none_or(|v| it.binding.declares(v)) => {
                    Some((it.index, it.has_next))
                }
                _ => None,
            })
    }

    /// `x?index`, `x?has_next`, ... on the loop variable `var`.
    pub(crate) fn eval_loop_var(
        &mut self,
        at: ExprId,
        var: Name,
        builtin: LoopVarBuiltIn,
        args: ExprRange,
    ) -> Result<Value, TemplateError> {
        let Some((index, has_next)) = self.nearest_iteration(Some(var)) else {
            return Err(self.blame(
                TemplateError::custom(format!(
                    "?{} can only be applied to a loop variable of an enclosing #list or #items, \
                     but {} isn't one here",
                    builtin.name(),
                    self.template.name(var)
                )),
                at,
            ));
        };
        let position = i64::try_from(index).unwrap_or(i64::MAX);
        let odd = index % 2 == 0;
        Ok(match builtin {
            LoopVarBuiltIn::Index => Value::int(position),
            LoopVarBuiltIn::Counter => Value::int(position.saturating_add(1)),
            LoopVarBuiltIn::HasNext => Value::Boolean(has_next),
            LoopVarBuiltIn::IsFirst => Value::Boolean(index == 0),
            LoopVarBuiltIn::IsLast => Value::Boolean(!has_next),
            LoopVarBuiltIn::ItemParity => Value::from(if odd { "odd" } else { "even" }),
            LoopVarBuiltIn::ItemParityCap => Value::from(if odd { "Odd" } else { "Even" }),
            LoopVarBuiltIn::IsOddItem => Value::Boolean(odd),
            LoopVarBuiltIn::IsEvenItem => Value::Boolean(!odd),
            LoopVarBuiltIn::ItemCycle => {
                let template = self.template;
                let choices = template.ast.exprs(args);
                match choices.get(index % choices.len().max(1)) {
                    Some(&choice) => self.eval(choice)?,
                    None => return Err(TemplateError::bug("?item_cycle without arguments")),
                }
            }
        })
    }

    fn visit_switch(&mut self, value: ExprId, cases: CaseRange) -> Result<Flow, TemplateError> {
        let template = self.template;
        let subject = self.eval(value)?;
        let cases = template.ast.cases(cases);
        let mut start = None;
        'search: for (i, case) in cases.iter().enumerate() {
            for &candidate in template.ast.exprs(case.values) {
                let found = self.eval(candidate)?;
                let matched = self.compare_values(
                    ftl_ir::CmpOp::Eq,
                    &subject,
                    &found,
                    value.into(),
                    candidate.into(),
                )?;
                if matched {
                    start = Some(i);
                    break 'search;
                }
            }
        }
        let start = start.or_else(|| cases.iter().position(|case| case.kind == CaseKind::Default));
        let Some(start) = start else {
            return Ok(Flow::Normal);
        };
        let on_mode = cases.iter().any(|case| case.kind == CaseKind::On);
        for case in &cases[start..] {
            let flow = self.visit(case.body)?;
            match flow {
                Flow::Break => return Ok(Flow::Normal),
                Flow::Normal if !on_mode => {}
                Flow::Normal => return Ok(Flow::Normal),
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn visit_attempt(
        &mut self,
        body: ElementRange,
        recover: ElementRange,
    ) -> Result<Flow, TemplateError> {
        let snapshot = self.snapshot();
        self.out.begin_capture();
        match self.visit(body) {
            Ok(flow) => {
                let text = self.out.end_capture();
                self.write(&text)?;
                Ok(flow)
            }
            Err(error) if error.is_recoverable() => {
                self.restore(&snapshot);
                tracing::debug!(kind = %error.kind, "attempt failed, recovering");
                self.recovered.push(error);
                let result = self.visit(recover);
                self.recovered.pop();
                result
            }
            Err(error) => {
                self.restore(&snapshot);
                Err(error)
            }
        }
    }

    fn visit_with_format(
        &mut self,
        format: ftl_output::OutputFormat,
        auto_escape: bool,
        body: ElementRange,
    ) -> Result<Flow, TemplateError> {
        let depth = self.format_stack.len();
        self.format_stack.push((format, auto_escape));
        let result = self.visit(body);
        self.format_stack.truncate(depth);
        result
    }

    /// The new value of an assignment target; compound operators read the
    /// current value from the target scope, then from the whole scope chain.
    fn assigned_value(
        &mut self,
        scope: AssignScope,
        target: Name,
        op: AssignOp,
        value: ExprId,
    ) -> Result<Value, TemplateError> {
        let arith = match op {
            AssignOp::Set => return self.eval(value),
            AssignOp::Add => None,
            AssignOp::Sub | AssignOp::Dec => Some(ArithOp::Sub),
            AssignOp::Mul => Some(ArithOp::Mul),
            AssignOp::Div => Some(ArithOp::Div),
            AssignOp::Rem => Some(ArithOp::Rem),
            AssignOp::Inc => Some(ArithOp::Add),
        };
        let key = self.template.name(target);
        let current = match scope {
            AssignScope::Namespace => self.main.get(key).cloned(),
            AssignScope::Global => self.globals.get(key).cloned(),
            AssignScope::Local => self
                .frames
                .get(self.current_frame)
                .and_then(|frame| frame.locals.get(&target).cloned().flatten()),
        };
        let current = match current {
            Some(current) => current,
            None => self.lookup(target)?.ok_or_else(|| {
                TemplateError::invalid_reference(key).with_blamed(key)
            })?,
        };
        let at = Operand::Var(target);
        let Some(op) = arith else {
            let rhs = self.eval(value)?;
            return self.add_values(&current, &rhs, at, value.into());
        };
        let left = self.require_number(&current, at)?;
        let right = if matches!(op, ArithOp::Add | ArithOp::Sub) && !value.is_valid() {
            Number::Int(1)
        } else {
            self.eval_number(value)?
        };
        arith_numbers(op, left, right)
            .map(Value::Number)
            .map_err(|e| self.blame_at(e, at))
    }

    pub(crate) fn set_variable(
        &mut self,
        scope: AssignScope,
        name: Name,
        value: Value,
    ) -> Result<(), TemplateError> {
        let key = self.template.name(name);
        match scope {
            AssignScope::Namespace => self.main.insert(key, value),
            AssignScope::Global => self.globals.insert(key, value),
            AssignScope::Local => {
                if self.current_frame == 0 {
                    return Err(TemplateError::custom(format!(
                        "Can't set local variable {key}: #local can only be used inside a \
                         macro or function"
                    )));
                }
                self.frames[self.current_frame]
                    .locals
                    .insert(name, Some(value));
            }
        }
        Ok(())
    }

    fn apply_setting(&mut self, name: Name, value: ExprId) -> Result<(), TemplateError> {
        let evaluated = self.eval(value)?;
        let text = match &evaluated {
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => self.format_number(*n, Some("c"))?,
            other => self.require_string(other, value)?,
        };
        let key = self.template.name(name);
        let change = self
            .settings
            .set(key, &text)
            .map_err(|e| self.blame(TemplateError::custom(e.to_string()), value))?;
        tracing::debug!(setting = key, value = %text, "setting changed");
        match change {
            SettingChange::Locale => self.formats.invalidate_locale_bound(),
            SettingChange::TimeZone => self.formats.invalidate_time_zone_bound(),
            SettingChange::None => {}
        }
        Ok(())
    }
}

/// Collapse white-space runs: a run containing a line break becomes one
/// line break, any other run one space. Leading and trailing runs go.
pub(crate) fn compress(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending: Option<bool> = None;
    for c in text.chars() {
        if c.is_whitespace() {
            let line_break = c == '\n' || c == '\r';
            pending = Some(pending.unwrap_or(false) || line_break);
            continue;
        }
        if let Some(line_break) = pending.take() {
            if !out.is_empty() {
                out.push(if line_break { '\n' } else { ' ' });
            }
        }
        out.push(c);
    }
    out
}
