//! Directive parameters and block directives.

use ftl_ir::{
    camel_to_snake, Arg, AssignOp, AssignScope, Assignment, CaseKind, ElementId, ElementKind,
    ElementRange, ExprId, ExprKind, ExprRange, IfArm, LoopBinding, MacroParam, Name, Span,
    SwitchCase,
};
use ftl_lexer::{Directive, Piece, TokenKind};
use ftl_output::OutputFormat;

use super::elements::BlockEnd;
use super::Header;
use crate::{ParseContext, ParseError, ParseErrorKind, Parser};

/// Names accepted by `#setting`.
pub(crate) const SETTING_NAMES: &[&str] = &[
    "locale",
    "time_zone",
    "number_format",
    "boolean_format",
    "date_format",
    "time_format",
    "datetime_format",
    "output_encoding",
];

impl Parser<'_> {
    pub(crate) fn parse_directive(
        &mut self,
        directive: Directive,
        span: Span,
        params: Span,
        self_closing: bool,
    ) -> Result<ElementId, ParseError> {
        match directive {
            Directive::If => self.parse_if(span, params),
            Directive::List => self.parse_list(span, params),
            Directive::Items => self.parse_items(span, params),
            Directive::Sep => self.parse_sep(span, params),
            Directive::Switch => self.parse_switch(span, params),
            Directive::Attempt => self.parse_attempt(span, params),
            Directive::AutoEsc | Directive::NoAutoEsc | Directive::OutputFormat => {
                self.parse_output_block(directive, span, params)
            }
            Directive::Compress => {
                self.expect_no_params(directive, params)?;
                let (body, end) = self.parse_body()?;
                let close = self.expect_close(end, directive, span)?;
                Ok(self.element(ElementKind::Compress(body), span.merge(close)))
            }
            Directive::Assign | Directive::Global | Directive::Local => {
                self.parse_assign(directive, span, params, self_closing)
            }
            Directive::Macro | Directive::Function => self.parse_macro(directive, span, params),
            Directive::Nested => {
                self.require(directive, ParseContext::IN_MACRO, "must be inside #macro", span)?;
                self.begin_tokens(params)?;
                let args = if self.cursor.at_end() {
                    ExprRange::EMPTY
                } else {
                    self.parse_expr_list()?
                };
                self.finish_tokens("`,` or end of tag")?;
                Ok(self.element(ElementKind::Nested(args), span))
            }
            Directive::Return => self.parse_return(span, params),
            Directive::Break => {
                self.require(
                    directive,
                    ParseContext::IN_LOOP.union(ParseContext::IN_SWITCH),
                    "must be inside #list or #switch",
                    span,
                )?;
                self.expect_no_params(directive, params)?;
                Ok(self.element(ElementKind::Break, span))
            }
            Directive::Continue => {
                self.require(directive, ParseContext::IN_LOOP, "must be inside #list", span)?;
                self.expect_no_params(directive, params)?;
                Ok(self.element(ElementKind::Continue, span))
            }
            Directive::Stop => {
                let message = self.parse_optional_expr(params)?;
                Ok(self.element(ElementKind::Stop(message), span))
            }
            Directive::Setting => self.parse_setting(span, params),
            Directive::Flush => {
                self.expect_no_params(directive, params)?;
                Ok(self.element(ElementKind::Flush, span))
            }
            Directive::Ftl => match self.header {
                Some(header) if header.span == span => {
                    Ok(self.element(ElementKind::FtlHeader(header.args), span))
                }
                _ => Err(self.error(ParseErrorKind::HeaderNotFirst, span)),
            },
            Directive::NoParse => Err(self.error(
                ParseErrorKind::UnclosedDirective(directive.name()),
                span,
            )),
            Directive::ElseIf
            | Directive::Else
            | Directive::Recover
            | Directive::Case
            | Directive::On
            | Directive::Default => Err(self.unexpected_end(
                BlockEnd::Clause {
                    directive,
                    index: self.piece_pos.saturating_sub(1),
                },
                None,
                span,
            )),
        }
    }

    fn require(
        &self,
        directive: Directive,
        flags: ParseContext,
        requirement: &'static str,
        span: Span,
    ) -> Result<(), ParseError> {
        if self.context.has(flags) {
            Ok(())
        } else {
            Err(self.error(
                ParseErrorKind::MisplacedDirective {
                    directive: directive.name(),
                    requirement,
                },
                span,
            ))
        }
    }

    pub(crate) fn expect_no_params(
        &self,
        directive: Directive,
        params: Span,
    ) -> Result<(), ParseError> {
        if self.slice(params).trim().is_empty() {
            Ok(())
        } else {
            Err(self.error(ParseErrorKind::UnexpectedParams(directive.name()), params))
        }
    }

    /// The single required expression of a tag.
    fn parse_tag_expr(&mut self, params: Span) -> Result<ExprId, ParseError> {
        self.begin_tokens(params)?;
        if self.cursor.at_end() {
            return Err(self.unexpected("expression"));
        }
        let expr = self.parse_expr()?;
        self.finish_tokens("end of tag")?;
        Ok(expr)
    }

    fn parse_optional_expr(&mut self, params: Span) -> Result<ExprId, ParseError> {
        self.begin_tokens(params)?;
        if self.cursor.at_end() {
            return Ok(ExprId::INVALID);
        }
        let expr = self.parse_expr()?;
        self.finish_tokens("end of tag")?;
        Ok(expr)
    }

    /// `expr, expr, ...` on the current cursor.
    fn parse_expr_list(&mut self) -> Result<ExprRange, ParseError> {
        let mut ids = vec![self.parse_expr()?];
        while self.cursor.eat(TokenKind::Comma) {
            ids.push(self.parse_expr()?);
        }
        Ok(self.ast.push_exprs(&ids))
    }

    fn parse_if(&mut self, open: Span, params: Span) -> Result<ElementId, ParseError> {
        let mut arms = Vec::new();
        let mut cond = self.parse_tag_expr(params)?;
        loop {
            let (body, end) = self.parse_body()?;
            arms.push(IfArm { cond, body });
            match end {
                BlockEnd::Clause {
                    directive: Directive::ElseIf,
                    index,
                } if cond.is_valid() => {
                    let (_, params) = self.take_clause(index);
                    cond = self.parse_tag_expr(params)?;
                }
                BlockEnd::Clause {
                    directive: Directive::Else,
                    index,
                } if cond.is_valid() => {
                    let (_, params) = self.take_clause(index);
                    self.expect_no_params(Directive::Else, params)?;
                    cond = ExprId::INVALID;
                }
                other => {
                    let close = self.expect_close(other, Directive::If, open)?;
                    let arms = self.ast.push_if_arms(&arms);
                    return Ok(self.element(ElementKind::If(arms), open.merge(close)));
                }
            }
        }
    }

    /// `name` or `key, value` after `as`.
    fn parse_binding(&mut self) -> Result<LoopBinding, ParseError> {
        let key = self.expect(TokenKind::Ident, "loop variable name")?;
        let key = self.interner.intern(self.slice(key));
        let value = if self.cursor.eat(TokenKind::Comma) {
            let value = self.expect(TokenKind::Ident, "loop variable name")?;
            self.interner.intern(self.slice(value))
        } else {
            Name::EMPTY
        };
        Ok(LoopBinding { key, value })
    }

    fn push_binding(&mut self, binding: LoopBinding) {
        self.loop_vars.push(binding.key);
        if binding.is_hash_listing() {
            self.loop_vars.push(binding.value);
        }
    }

    fn parse_list(&mut self, open: Span, params: Span) -> Result<ElementId, ParseError> {
        self.begin_tokens(params)?;
        if self.cursor.at_end() {
            return Err(self.unexpected("expression"));
        }
        let source = self.parse_expr()?;
        let binding = if self.cursor.eat(TokenKind::As) {
            self.parse_binding()?
        } else {
            LoopBinding::default()
        };
        self.finish_tokens("`as` or end of tag")?;

        let saved_context = self.context;
        let saved_items = std::mem::replace(&mut self.items_found, 0);
        let saved_vars = self.loop_vars.len();
        if binding.is_bound() {
            self.context = self
                .context
                .without(ParseContext::LIST_WITHOUT_AS)
                .with(ParseContext::IN_LOOP.union(ParseContext::CAN_SEP));
            self.push_binding(binding);
        } else {
            self.context = self
                .context
                .without(ParseContext::CAN_SEP)
                .with(ParseContext::LIST_WITHOUT_AS);
        }
        let result = self.parse_body();
        self.context = saved_context;
        self.loop_vars.truncate(saved_vars);
        let items = std::mem::replace(&mut self.items_found, saved_items);
        let (body, mut end) = result?;
        if !binding.is_bound() && items == 0 {
            return Err(self.error(ParseErrorKind::MissingItems, open));
        }

        let mut else_body = ElementRange::EMPTY;
        if let BlockEnd::Clause {
            directive: Directive::Else,
            index,
        } = end
        {
            let (_, params) = self.take_clause(index);
            self.expect_no_params(Directive::Else, params)?;
            let (body, next) = self.parse_body()?;
            else_body = body;
            end = next;
        }
        let close = self.expect_close(end, Directive::List, open)?;
        Ok(self.element(
            ElementKind::List {
                source,
                binding,
                body,
                else_body,
            },
            open.merge(close),
        ))
    }

    fn parse_items(&mut self, open: Span, params: Span) -> Result<ElementId, ParseError> {
        self.require(
            Directive::Items,
            ParseContext::LIST_WITHOUT_AS,
            "must be inside a #list that has no `as`",
            open,
        )?;
        self.begin_tokens(params)?;
        self.expect(TokenKind::As, "`as`")?;
        let binding = self.parse_binding()?;
        self.finish_tokens("end of tag")?;

        let saved_context = self.context;
        let saved_vars = self.loop_vars.len();
        self.context = self
            .context
            .without(ParseContext::LIST_WITHOUT_AS)
            .with(ParseContext::IN_LOOP.union(ParseContext::CAN_SEP));
        self.push_binding(binding);
        let result = self.parse_body();
        self.context = saved_context;
        self.loop_vars.truncate(saved_vars);
        let (body, end) = result?;
        let close = self.expect_close(end, Directive::Items, open)?;
        self.items_found += 1;
        Ok(self.element(ElementKind::Items { binding, body }, open.merge(close)))
    }

    /// `#sep`; its end tag may be left out when the loop ends right after it.
    fn parse_sep(&mut self, open: Span, params: Span) -> Result<ElementId, ParseError> {
        self.require(
            Directive::Sep,
            ParseContext::CAN_SEP,
            "must be inside #list ... as or #items",
            open,
        )?;
        self.expect_no_params(Directive::Sep, params)?;
        let (body, end) = self.parse_body()?;
        let end_span = match end {
            BlockEnd::Close {
                directive: Directive::Sep,
                index,
            } => {
                self.piece_pos = index + 1;
                self.pieces[index].span()
            }
            BlockEnd::Close {
                directive: Directive::List | Directive::Items,
                index,
            }
            | BlockEnd::Clause {
                directive: Directive::Else,
                index,
            } => Span::point(self.pieces[index].span().start),
            other => return Err(self.unexpected_end(other, Some(Directive::Sep), open)),
        };
        Ok(self.element(ElementKind::Sep(body), open.merge(end_span)))
    }

    fn parse_switch(&mut self, open: Span, params: Span) -> Result<ElementId, ParseError> {
        let value = self.parse_tag_expr(params)?;
        let saved_context = self.context;
        self.context = self.context.with(ParseContext::IN_SWITCH);
        let result = self.parse_switch_cases(open);
        self.context = saved_context;
        let (cases, close) = result?;
        let cases = self.ast.push_cases(&cases);
        Ok(self.element(ElementKind::Switch { value, cases }, open.merge(close)))
    }

    fn parse_switch_cases(&mut self, open: Span) -> Result<(Vec<SwitchCase>, Span), ParseError> {
        let mut cases = Vec::new();
        let mut style = None;
        let mut has_default = false;
        loop {
            let Some(piece) = self.pieces.get(self.piece_pos).copied() else {
                return Err(self.error(ParseErrorKind::UnclosedDirective("switch"), open));
            };
            match piece {
                Piece::Text(span) if self.slice(span).trim().is_empty() => self.piece_pos += 1,
                Piece::Comment { .. } => self.piece_pos += 1,
                Piece::Tag {
                    directive: Directive::Switch,
                    closing: true,
                    span,
                    ..
                } => {
                    self.piece_pos += 1;
                    return Ok((cases, span));
                }
                Piece::Tag {
                    directive: directive @ (Directive::Case | Directive::On | Directive::Default),
                    closing: false,
                    span,
                    params,
                    ..
                } => {
                    self.piece_pos += 1;
                    let kind = match directive {
                        Directive::Case => CaseKind::Case,
                        Directive::On => CaseKind::On,
                        _ => CaseKind::Default,
                    };
                    let values = if kind == CaseKind::Default {
                        if has_default {
                            return Err(self.error(ParseErrorKind::DuplicateDefault, span));
                        }
                        has_default = true;
                        self.expect_no_params(directive, params)?;
                        ExprRange::EMPTY
                    } else {
                        if style.is_some_and(|s| s != kind) {
                            return Err(self.error(ParseErrorKind::MixedCaseAndOn, span));
                        }
                        style = Some(kind);
                        self.begin_tokens(params)?;
                        if self.cursor.at_end() {
                            return Err(self.unexpected("expression"));
                        }
                        let values = self.parse_expr_list()?;
                        self.finish_tokens("`,` or end of tag")?;
                        values
                    };
                    let (body, end) = self.parse_body()?;
                    cases.push(SwitchCase { kind, values, body });
                    match end {
                        BlockEnd::Clause {
                            directive: Directive::Case | Directive::On | Directive::Default,
                            ..
                        }
                        | BlockEnd::Close {
                            directive: Directive::Switch,
                            ..
                        } => {}
                        other => {
                            return Err(self.unexpected_end(other, Some(Directive::Switch), open))
                        }
                    }
                }
                other => return Err(self.error(ParseErrorKind::TextInSwitch, other.span())),
            }
        }
    }

    fn parse_attempt(&mut self, open: Span, params: Span) -> Result<ElementId, ParseError> {
        self.expect_no_params(Directive::Attempt, params)?;
        let (body, end) = self.parse_body()?;
        let index = match end {
            BlockEnd::Clause {
                directive: Directive::Recover,
                index,
            } => index,
            BlockEnd::Close {
                directive: Directive::Attempt,
                ..
            } => {
                return Err(self.error(
                    ParseErrorKind::MissingClause {
                        directive: "attempt",
                        clause: "recover",
                    },
                    open,
                ))
            }
            other => return Err(self.unexpected_end(other, Some(Directive::Attempt), open)),
        };
        let (_, params) = self.take_clause(index);
        self.expect_no_params(Directive::Recover, params)?;
        let (recover, end) = self.parse_body()?;
        let close = self.expect_close(end, Directive::Attempt, open)?;
        Ok(self.element(ElementKind::Attempt { body, recover }, open.merge(close)))
    }

    /// `#autoesc`, `#noautoesc` and `#outputformat`.
    fn parse_output_block(
        &mut self,
        directive: Directive,
        open: Span,
        params: Span,
    ) -> Result<ElementId, ParseError> {
        let saved = (self.format, self.auto_escape);
        match directive {
            Directive::AutoEsc => {
                self.expect_no_params(directive, params)?;
                if !self.format.is_markup() {
                    return Err(self.error(
                        ParseErrorKind::AutoEscNotMarkup(self.format.name()),
                        open,
                    ));
                }
                self.auto_escape = true;
            }
            Directive::NoAutoEsc => {
                self.expect_no_params(directive, params)?;
                self.auto_escape = false;
            }
            _ => {
                let format = self.parse_format_param(params)?;
                self.format = format;
                self.auto_escape = self.auto_escape_policy && format.is_markup();
            }
        }
        let format = self.format;
        let result = self.parse_body();
        (self.format, self.auto_escape) = saved;
        let (body, end) = result?;
        let close = self.expect_close(end, directive, open)?;
        let kind = match directive {
            Directive::AutoEsc => ElementKind::AutoEsc(body),
            Directive::NoAutoEsc => ElementKind::NoAutoEsc(body),
            _ => ElementKind::OutputFormatBlock { format, body },
        };
        Ok(self.element(kind, open.merge(close)))
    }

    fn parse_format_param(&mut self, params: Span) -> Result<OutputFormat, ParseError> {
        let id = self.parse_tag_expr(params)?;
        let name = self.constant_string(id, "#outputformat parameter")?;
        self.lookup_format(&name, self.expr_span(id))
    }

    fn lookup_format(&self, name: &str, span: Span) -> Result<OutputFormat, ParseError> {
        self.formats
            .by_name(name)
            .ok_or_else(|| self.error(ParseErrorKind::UnknownOutputFormat(name.to_owned()), span))
    }

    fn constant_string(&self, id: ExprId, param: &str) -> Result<String, ParseError> {
        match self.ast.expr(id).kind {
            ExprKind::Str(name) => Ok(self.interner.lookup(name).to_owned()),
            _ => Err(self.error(
                ParseErrorKind::InvalidParamValue {
                    param: param.to_owned(),
                    expected: "a string literal",
                },
                self.expr_span(id),
            )),
        }
    }

    fn constant_bool(&self, id: ExprId, param: &str) -> Result<bool, ParseError> {
        match self.ast.expr(id).kind {
            ExprKind::Bool(value) => Ok(value),
            _ => Err(self.error(
                ParseErrorKind::InvalidParamValue {
                    param: param.to_owned(),
                    expected: "a boolean literal",
                },
                self.expr_span(id),
            )),
        }
    }

    fn parse_assign(
        &mut self,
        directive: Directive,
        open: Span,
        params: Span,
        self_closing: bool,
    ) -> Result<ElementId, ParseError> {
        let scope = match directive {
            Directive::Assign => AssignScope::Namespace,
            Directive::Global => AssignScope::Global,
            _ => AssignScope::Local,
        };
        if scope == AssignScope::Local {
            self.require(
                directive,
                ParseContext::IN_MACRO.union(ParseContext::IN_FUNCTION),
                "must be inside #macro or #function",
                open,
            )?;
        }
        self.begin_tokens(params)?;
        let (mut target, _) = self.parse_name("variable name")?;

        if self.cursor.at_end() && !self_closing {
            let (format, auto_escape) = (self.format, self.auto_escape);
            let (body, end) = self.parse_body()?;
            let close = self.expect_close(end, directive, open)?;
            return Ok(self.element(
                ElementKind::AssignCapture {
                    scope,
                    target,
                    body,
                    format,
                    auto_escape,
                },
                open.merge(close),
            ));
        }

        let mut assignments = Vec::new();
        loop {
            let op = match self.cursor.kind() {
                TokenKind::Eq => AssignOp::Set,
                TokenKind::PlusEq => AssignOp::Add,
                TokenKind::MinusEq => AssignOp::Sub,
                TokenKind::StarEq => AssignOp::Mul,
                TokenKind::SlashEq => AssignOp::Div,
                TokenKind::PercentEq => AssignOp::Rem,
                TokenKind::PlusPlus => AssignOp::Inc,
                TokenKind::MinusMinus => AssignOp::Dec,
                _ => return Err(self.unexpected("`=` or an assignment operator")),
            };
            self.cursor.advance();
            let value = if matches!(op, AssignOp::Inc | AssignOp::Dec) {
                ExprId::INVALID
            } else {
                self.parse_value_expr()?
            };
            assignments.push(Assignment { target, op, value });
            self.cursor.eat(TokenKind::Comma);
            if self.cursor.at_end() {
                break;
            }
            target = self.parse_name("variable name")?.0;
        }
        let assignments = self.ast.push_assignments(&assignments);
        Ok(self.element(ElementKind::Assign { scope, assignments }, open))
    }

    fn parse_macro(
        &mut self,
        directive: Directive,
        open: Span,
        params: Span,
    ) -> Result<ElementId, ParseError> {
        if self
            .context
            .has(ParseContext::IN_MACRO.union(ParseContext::IN_FUNCTION))
        {
            return Err(self.error(ParseErrorKind::NestedMacro, open));
        }
        self.begin_tokens(params)?;
        let (name, _) = self.parse_name("macro name")?;
        let parens = self.cursor.eat(TokenKind::LParen);
        let mut macro_params = Vec::new();
        let mut catch_all = Name::EMPTY;
        while self.cursor.check(TokenKind::Ident) {
            if !catch_all.is_empty() {
                return Err(self.unexpected("end of parameters after the catch-all parameter"));
            }
            let token = self.cursor.advance();
            let param = self.interner.intern(self.slice(token.span));
            if self.cursor.eat(TokenKind::Ellipsis) {
                catch_all = param;
            } else {
                let default = if self.cursor.eat(TokenKind::Eq) {
                    self.parse_value_expr()?
                } else {
                    ExprId::INVALID
                };
                macro_params.push(MacroParam {
                    name: param,
                    default,
                });
            }
            self.cursor.eat(TokenKind::Comma);
        }
        if parens {
            self.expect(TokenKind::RParen, "`)`")?;
        }
        self.finish_tokens("parameter name")?;

        let is_function = directive == Directive::Function;
        let saved_context = self.context;
        let saved_vars = std::mem::take(&mut self.loop_vars);
        self.context = self.context.without(ParseContext::LOOP_FLAGS).with(if is_function {
            ParseContext::IN_FUNCTION
        } else {
            ParseContext::IN_MACRO
        });
        let result = self.parse_body();
        self.context = saved_context;
        self.loop_vars = saved_vars;
        let (body, end) = result?;
        let close = self.expect_close(end, directive, open)?;

        let params = self.ast.push_params(&macro_params);
        let id = self.element(
            ElementKind::MacroDef {
                name,
                params,
                catch_all,
                body,
                is_function,
            },
            open.merge(close),
        );
        self.macros.push(id);
        Ok(id)
    }

    fn parse_return(&mut self, span: Span, params: Span) -> Result<ElementId, ParseError> {
        self.require(
            Directive::Return,
            ParseContext::IN_MACRO.union(ParseContext::IN_FUNCTION),
            "must be inside #macro or #function",
            span,
        )?;
        let value = self.parse_optional_expr(params)?;
        if value.is_valid() && self.context.has(ParseContext::IN_MACRO) {
            return Err(self.error(
                ParseErrorKind::MisplacedDirective {
                    directive: "return",
                    requirement: "with a value must be inside #function",
                },
                span,
            ));
        }
        Ok(self.element(ElementKind::Return(value), span))
    }

    fn parse_setting(&mut self, span: Span, params: Span) -> Result<ElementId, ParseError> {
        self.begin_tokens(params)?;
        let name_span = self.expect(TokenKind::Ident, "setting name")?;
        let setting = camel_to_snake(self.slice(name_span));
        if !SETTING_NAMES.contains(&setting.as_str()) {
            return Err(self.error(ParseErrorKind::UnknownSetting(setting), name_span));
        }
        self.expect(TokenKind::Eq, "`=`")?;
        let value = self.parse_value_expr()?;
        self.finish_tokens("end of tag")?;
        let name = self.interner.intern(&setting);
        Ok(self.element(ElementKind::Setting { name, value }, span))
    }

    /// Parse a leading `#ftl` header and apply its parameters.
    pub(crate) fn parse_header(&mut self) -> Result<(), ParseError> {
        let mut first = 0;
        while let Some(Piece::Text(span)) = self.pieces.get(first) {
            if !self.slice(*span).trim().is_empty() {
                return Ok(());
            }
            first += 1;
        }
        let Some(&Piece::Tag {
            directive: Directive::Ftl,
            closing: false,
            span,
            params,
            ..
        }) = self.pieces.get(first)
        else {
            return Ok(());
        };
        self.pieces.drain(..first);

        self.begin_tokens(params)?;
        let mut args = Vec::new();
        while !self.cursor.at_end() {
            let name_span = self.expect(TokenKind::Ident, "header parameter name")?;
            self.expect(TokenKind::Eq, "`=`")?;
            let value = self.parse_value_expr()?;
            self.apply_header_param(name_span, value)?;
            let name = self.interner.intern(self.slice(name_span));
            args.push(Arg { name, value });
            self.cursor.eat(TokenKind::Comma);
        }
        let args = self.ast.push_args(&args);
        self.header = Some(Header { span, args });
        self.auto_escape = self.auto_escape_policy && self.format.is_markup();
        tracing::debug!(format = %self.format, auto_escape = self.auto_escape, "ftl header");
        Ok(())
    }

    fn apply_header_param(&mut self, name_span: Span, value: ExprId) -> Result<(), ParseError> {
        let param = camel_to_snake(self.slice(name_span));
        match param.as_str() {
            "output_format" => {
                let name = self.constant_string(value, &param)?;
                self.format = self.lookup_format(&name, self.expr_span(value))?;
            }
            "auto_esc" => self.auto_escape_policy = self.constant_bool(value, &param)?,
            "strip_whitespace" => self.strip_whitespace = self.constant_bool(value, &param)?,
            "strip_text" => self.strip_text = self.constant_bool(value, &param)?,
            "encoding" | "ns_prefixes" | "attributes" => {}
            _ => return Err(self.error(ParseErrorKind::UnknownHeaderParam(param), name_span)),
        }
        Ok(())
    }

    /// `<@callee args; loopVars>`, with its body when not self-closing.
    pub(crate) fn parse_user_call(
        &mut self,
        open: Span,
        params: Span,
        self_closing: bool,
    ) -> Result<ElementId, ParseError> {
        self.begin_tokens(params)?;
        let callee = self.parse_callee()?;
        let callee_span = self.expr_span(callee);

        let mut args = Vec::new();
        if self.at_named_arg() {
            while self.at_named_arg() {
                let name_span = self.cursor.advance().span;
                self.cursor.advance();
                let name = self.interner.intern(self.slice(name_span));
                let value = self.parse_value_expr()?;
                args.push(Arg { name, value });
                self.cursor.eat(TokenKind::Comma);
            }
        } else if !self.cursor.at_end() && !self.cursor.check(TokenKind::Semicolon) {
            loop {
                let value = self.parse_value_expr()?;
                args.push(Arg {
                    name: Name::EMPTY,
                    value,
                });
                if !self.cursor.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        let mut loop_vars = Vec::new();
        if self.cursor.eat(TokenKind::Semicolon) {
            loop {
                let span = self.expect(TokenKind::Ident, "nested content parameter name")?;
                loop_vars.push(self.interner.intern(self.slice(span)));
                if !self.cursor.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.finish_tokens("named argument, `;` or end of tag")?;
        let args = self.ast.push_args(&args);
        let loop_vars = self.ast.push_names(&loop_vars);

        if self_closing {
            return Ok(self.element(
                ElementKind::UserCall {
                    callee,
                    args,
                    loop_vars,
                    body: ElementRange::EMPTY,
                    has_body: false,
                },
                open,
            ));
        }

        let saved_context = self.context;
        self.context = self.context.without(ParseContext::LOOP_FLAGS);
        let result = self.parse_body();
        self.context = saved_context;
        let (body, end) = result?;
        let index = match end {
            BlockEnd::CallEnd { index } => index,
            BlockEnd::Eof => {
                return Err(self.error(
                    ParseErrorKind::UnclosedCall(self.slice(callee_span).to_owned()),
                    open,
                ))
            }
            other => return Err(self.unexpected_end(other, None, open)),
        };
        let Piece::UserCallEnd { span: end_span, name } = self.pieces[index] else {
            return Err(self.unexpected_end(end, None, open));
        };
        let callee_text = self.slice(callee_span);
        let same_callee = without_whitespace(self.slice(name)) == without_whitespace(callee_text);
        if !name.is_empty() && !same_callee {
            return Err(self.error(
                ParseErrorKind::UnexpectedEndTag {
                    found: self.slice(end_span).to_owned(),
                    expected: Some(format!(
                        "{}/@{callee_text}{}",
                        self.syntax.open(),
                        self.syntax.close()
                    )),
                },
                end_span,
            ));
        }
        self.piece_pos = index + 1;
        Ok(self.element(
            ElementKind::UserCall {
                callee,
                args,
                loop_vars,
                body,
                has_body: true,
            },
            open.merge(end_span),
        ))
    }

    fn at_named_arg(&self) -> bool {
        self.cursor.check(TokenKind::Ident) && self.cursor.peek_kind(1) == TokenKind::Eq
    }
}

fn without_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests;
