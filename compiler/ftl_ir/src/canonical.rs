//! Canonical source forms.
//!
//! Every node prints back to template source that parses to an equivalent
//! tree: parentheses are kept as nodes, relational operators use their word
//! aliases, string literals are re-escaped, and elements are written in the
//! tag syntax the template was parsed with.

use std::fmt::Write;

use crate::element::{CaseKind, ElementKind, LoopBinding};
use crate::expr::{ExprKind, RangeKind, StrPart};
use crate::syntax::{InterpolationSyntax, TagSyntax};
use crate::{Ast, ElementId, ElementRange, ExprId, ExprRange, Name, StringInterner};

/// Prints canonical forms of one template's nodes.
pub struct Canonical<'a> {
    ast: &'a Ast,
    interner: &'a StringInterner,
    open: char,
    close: char,
    interpolation: InterpolationSyntax,
}

impl<'a> Canonical<'a> {
    pub fn new(ast: &'a Ast, interner: &'a StringInterner) -> Self {
        Self::with_syntax(ast, interner, TagSyntax::Angle, InterpolationSyntax::Dollar)
    }

    pub fn with_syntax(
        ast: &'a Ast,
        interner: &'a StringInterner,
        tags: TagSyntax,
        interpolation: InterpolationSyntax,
    ) -> Self {
        Canonical {
            ast,
            interner,
            open: tags.open(),
            close: tags.close(),
            interpolation,
        }
    }

    /// Canonical form of an expression.
    pub fn expr(&self, id: ExprId) -> String {
        let mut out = String::new();
        self.write_expr(id, &mut out);
        out
    }

    /// Canonical form of a run of elements.
    pub fn elements(&self, range: ElementRange) -> String {
        let mut out = String::new();
        self.write_elements(range, &mut out);
        out
    }

    /// Canonical form of a single element, including its children.
    pub fn element(&self, id: ElementId) -> String {
        let mut out = String::new();
        self.write_element(id, &mut out);
        out
    }

    fn name(&self, name: Name) -> &'a str {
        self.interner.lookup(name)
    }

    fn write_expr(&self, id: ExprId, out: &mut String) {
        match self.ast.expr(id).kind {
            ExprKind::Bool(b) => out.push_str(if b { "true" } else { "false" }),
            ExprKind::Int(i) => {
                let _ = write!(out, "{i}");
            }
            ExprKind::Float(bits) => {
                let _ = write!(out, "{}", f64::from_bits(bits));
            }
            ExprKind::Str(name) => {
                out.push('"');
                escape_string_literal(self.name(name), out);
                out.push('"');
            }
            ExprKind::Interpolated(parts) => {
                out.push('"');
                for part in self.ast.str_parts(parts) {
                    match *part {
                        StrPart::Text(text) => escape_string_literal(self.name(text), out),
                        StrPart::Interp(expr) => {
                            out.push_str("${");
                            self.write_expr(expr, out);
                            out.push('}');
                        }
                    }
                }
                out.push('"');
            }
            ExprKind::Sequence(items) => {
                out.push('[');
                self.write_list(items, out);
                out.push(']');
            }
            ExprKind::Hash(entries) => {
                out.push('{');
                for (i, entry) in self.ast.hash_entries(entries).iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.write_expr(entry.key, out);
                    out.push_str(": ");
                    self.write_expr(entry.value, out);
                }
                out.push('}');
            }
            ExprKind::Ident(name) => out.push_str(self.name(name)),
            ExprKind::Special(var) => {
                out.push('.');
                out.push_str(var.name());
            }
            ExprKind::Dot { receiver, name } => {
                self.write_expr(receiver, out);
                out.push('.');
                out.push_str(self.name(name));
            }
            ExprKind::Index { receiver, index } => {
                self.write_expr(receiver, out);
                out.push('[');
                self.write_expr(index, out);
                out.push(']');
            }
            ExprKind::Arith { op, left, right } => {
                self.write_binary(left, op.as_symbol(), right, out);
            }
            ExprKind::Cmp { op, left, right } => {
                self.write_binary(left, op.as_symbol(), right, out);
            }
            ExprKind::And { left, right } => self.write_binary(left, "&&", right, out),
            ExprKind::Or { left, right } => self.write_binary(left, "||", right, out),
            ExprKind::Not(operand) => {
                out.push('!');
                self.write_expr(operand, out);
            }
            ExprKind::Neg(operand) => {
                out.push('-');
                self.write_expr(operand, out);
            }
            ExprKind::Pos(operand) => {
                out.push('+');
                self.write_expr(operand, out);
            }
            ExprKind::Exists(operand) => {
                self.write_expr(operand, out);
                out.push_str("??");
            }
            ExprKind::Default { expr, fallback } => {
                self.write_expr(expr, out);
                out.push('!');
                if let Some(fallback) = fallback.valid() {
                    self.write_expr(fallback, out);
                }
            }
            ExprKind::Paren(inner) => {
                out.push('(');
                self.write_expr(inner, out);
                out.push(')');
            }
            ExprKind::Range { start, end, kind } => {
                self.write_expr(start, out);
                out.push_str(kind.as_symbol());
                if kind != RangeKind::Unbounded {
                    self.write_expr(end, out);
                }
            }
            ExprKind::BuiltIn {
                target,
                builtin,
                args,
            } => {
                self.write_expr(target, out);
                out.push('?');
                out.push_str(builtin.name());
                self.write_args(args, builtin.arity().0 > 0, out);
            }
            ExprKind::LoopVar { var, builtin, args } => {
                out.push_str(self.name(var));
                out.push('?');
                out.push_str(builtin.name());
                self.write_args(args, builtin.arity().0 > 0, out);
            }
            ExprKind::Call { callee, args } => {
                self.write_expr(callee, out);
                self.write_args(args, true, out);
            }
            ExprKind::Lambda { param, body } => {
                out.push_str(self.name(param));
                out.push_str(" -> ");
                self.write_expr(body, out);
            }
        }
    }

    fn write_binary(&self, left: ExprId, op: &str, right: ExprId, out: &mut String) {
        self.write_expr(left, out);
        out.push(' ');
        out.push_str(op);
        out.push(' ');
        self.write_expr(right, out);
    }

    fn write_list(&self, items: ExprRange, out: &mut String) {
        for (i, item) in self.ast.exprs(items).iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_expr(*item, out);
        }
    }

    fn write_args(&self, args: ExprRange, always_parens: bool, out: &mut String) {
        if args.is_empty() && !always_parens {
            return;
        }
        out.push('(');
        self.write_list(args, out);
        out.push(')');
    }

    fn write_elements(&self, range: ElementRange, out: &mut String) {
        for id in self.ast.elements(range) {
            self.write_element(*id, out);
        }
    }

    fn tag(&self, out: &mut String, body: &str) {
        out.push(self.open);
        out.push_str(body);
        out.push(self.close);
    }

    fn end_tag(&self, out: &mut String, directive: &str) {
        out.push(self.open);
        out.push_str("/#");
        out.push_str(directive);
        out.push(self.close);
    }

    fn block(&self, out: &mut String, start: &str, directive: &str, body: ElementRange) {
        self.tag(out, start);
        self.write_elements(body, out);
        self.end_tag(out, directive);
    }

    fn binding(&self, binding: LoopBinding) -> String {
        if !binding.is_bound() {
            return String::new();
        }
        let mut s = format!(" as {}", self.name(binding.key));
        if binding.is_hash_listing() {
            s.push_str(", ");
            s.push_str(self.name(binding.value));
        }
        s
    }

    fn write_element(&self, id: ElementId, out: &mut String) {
        match self.ast.element(id).kind {
            ElementKind::Text(text) => out.push_str(self.name(text)),
            ElementKind::NoParse(text) => {
                self.tag(out, "#noparse");
                out.push_str(self.name(text));
                self.end_tag(out, "noparse");
            }
            ElementKind::Interpolation { expr, .. } => {
                out.push_str(self.interpolation.open());
                self.write_expr(expr, out);
                out.push(self.interpolation.close());
            }
            ElementKind::If(arms) => {
                for (i, arm) in self.ast.if_arms(arms).iter().enumerate() {
                    match arm.cond.valid() {
                        Some(cond) if i == 0 => self.tag(out, &format!("#if {}", self.expr(cond))),
                        Some(cond) => self.tag(out, &format!("#elseif {}", self.expr(cond))),
                        None => self.tag(out, "#else"),
                    }
                    self.write_elements(arm.body, out);
                }
                self.end_tag(out, "if");
            }
            ElementKind::List {
                source,
                binding,
                body,
                else_body,
            } => {
                self.tag(
                    out,
                    &format!("#list {}{}", self.expr(source), self.binding(binding)),
                );
                self.write_elements(body, out);
                if !else_body.is_empty() {
                    self.tag(out, "#else");
                    self.write_elements(else_body, out);
                }
                self.end_tag(out, "list");
            }
            ElementKind::Items { binding, body } => {
                self.block(out, &format!("#items{}", self.binding(binding)), "items", body);
            }
            ElementKind::Sep(body) => self.block(out, "#sep", "sep", body),
            ElementKind::Switch { value, cases } => {
                self.tag(out, &format!("#switch {}", self.expr(value)));
                for case in self.ast.cases(cases) {
                    let mut values = String::new();
                    self.write_list(case.values, &mut values);
                    match case.kind {
                        CaseKind::Case => self.tag(out, &format!("#case {values}")),
                        CaseKind::On => self.tag(out, &format!("#on {values}")),
                        CaseKind::Default => self.tag(out, "#default"),
                    }
                    self.write_elements(case.body, out);
                }
                self.end_tag(out, "switch");
            }
            ElementKind::Attempt { body, recover } => {
                self.tag(out, "#attempt");
                self.write_elements(body, out);
                self.tag(out, "#recover");
                self.write_elements(recover, out);
                self.end_tag(out, "attempt");
            }
            ElementKind::AutoEsc(body) => self.block(out, "#autoesc", "autoesc", body),
            ElementKind::NoAutoEsc(body) => self.block(out, "#noautoesc", "noautoesc", body),
            ElementKind::OutputFormatBlock { format, body } => {
                self.block(
                    out,
                    &format!("#outputformat \"{}\"", format.name()),
                    "outputformat",
                    body,
                );
            }
            ElementKind::Assign { scope, assignments } => {
                let mut s = scope.directive().to_owned();
                for assignment in self.ast.assignments(assignments) {
                    s.push(' ');
                    s.push_str(self.name(assignment.target));
                    match assignment.value.valid() {
                        Some(value) => {
                            let _ = write!(
                                s,
                                " {} {}",
                                assignment.op.as_symbol(),
                                self.expr(value)
                            );
                        }
                        None => s.push_str(assignment.op.as_symbol()),
                    }
                }
                self.tag(out, &s);
            }
            ElementKind::AssignCapture {
                scope,
                target,
                body,
                ..
            } => {
                let directive = scope.directive();
                self.block(
                    out,
                    &format!("{directive} {}", self.name(target)),
                    &directive[1..],
                    body,
                );
            }
            ElementKind::MacroDef {
                name,
                params,
                catch_all,
                body,
                is_function,
            } => {
                let directive = if is_function { "function" } else { "macro" };
                let mut s = format!("#{directive} {}", self.name(name));
                for param in self.ast.params(params) {
                    s.push(' ');
                    s.push_str(self.name(param.name));
                    if let Some(default) = param.default.valid() {
                        s.push('=');
                        s.push_str(&self.expr(default));
                    }
                }
                if !catch_all.is_empty() {
                    let _ = write!(s, " {}...", self.name(catch_all));
                }
                self.block(out, &s, directive, body);
            }
            ElementKind::UserCall {
                callee,
                args,
                loop_vars,
                body,
                has_body,
            } => {
                let mut s = format!("@{}", self.expr(callee));
                let args = self.ast.args(args);
                let positional = args.first().is_some_and(|a| a.name.is_empty());
                for (i, arg) in args.iter().enumerate() {
                    if positional && i > 0 {
                        s.push(',');
                    }
                    s.push(' ');
                    if !arg.name.is_empty() {
                        s.push_str(self.name(arg.name));
                        s.push('=');
                    }
                    s.push_str(&self.expr(arg.value));
                }
                let vars = self.ast.names(loop_vars);
                if !vars.is_empty() {
                    let names: Vec<&str> = vars.iter().map(|n| self.name(*n)).collect();
                    let _ = write!(s, "; {}", names.join(", "));
                }
                if has_body {
                    self.tag(out, &s);
                    self.write_elements(body, out);
                    out.push(self.open);
                    out.push_str("/@");
                    out.push(self.close);
                } else {
                    s.push('/');
                    self.tag(out, &s);
                }
            }
            ElementKind::Nested(args) => {
                let mut s = "#nested".to_owned();
                if !args.is_empty() {
                    s.push(' ');
                    self.write_list(args, &mut s);
                }
                self.tag(out, &s);
            }
            ElementKind::Return(value) => match value.valid() {
                Some(value) => self.tag(out, &format!("#return {}", self.expr(value))),
                None => self.tag(out, "#return"),
            },
            ElementKind::Break => self.tag(out, "#break"),
            ElementKind::Continue => self.tag(out, "#continue"),
            ElementKind::Stop(message) => match message.valid() {
                Some(message) => self.tag(out, &format!("#stop {}", self.expr(message))),
                None => self.tag(out, "#stop"),
            },
            ElementKind::Comment(text) => {
                out.push(self.open);
                out.push_str("#--");
                out.push_str(self.name(text));
                out.push_str("--");
                out.push(self.close);
            }
            ElementKind::Setting { name, value } => {
                self.tag(
                    out,
                    &format!("#setting {}={}", self.name(name), self.expr(value)),
                );
            }
            ElementKind::Flush => self.tag(out, "#flush"),
            ElementKind::Compress(body) => self.block(out, "#compress", "compress", body),
            ElementKind::FtlHeader(args) => {
                let mut s = "#ftl".to_owned();
                for arg in self.ast.args(args) {
                    let _ = write!(s, " {}={}", self.name(arg.name), self.expr(arg.value));
                }
                self.tag(out, &s);
            }
        }
    }
}

/// Escape text for the inside of a double-quoted string literal.
pub fn escape_string_literal(text: &str, out: &mut String) {
    let mut prev = '\0';
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '{' if prev == '$' => out.push_str("\\{"),
            c => out.push(c),
        }
        prev = c;
    }
}
