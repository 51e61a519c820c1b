//! Primary expressions and postfix operators.

use ftl_ir::{
    BuiltInRef, ExprId, ExprKind, ExprRange, HashEntry, Name, SpecialVar, Span, StrPart,
    VARIADIC,
};
use ftl_lexer::cook::{self, Segment};
use ftl_lexer::TokenKind;

use crate::{ParseContext, ParseError, ParseErrorKind, Parser};

impl Parser<'_> {
    /// A primary followed by any number of postfix operators.
    ///
    /// `!` ends the chain: its optional fallback operand extends as far as
    /// a unary expression does, so `a!b.c` defaults to `b.c`.
    pub(crate) fn parse_postfix(&mut self) -> Result<ExprId, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            expr = match self.cursor.kind() {
                TokenKind::Dot => self.parse_member(expr)?,
                TokenKind::LBracket => self.parse_index(expr)?,
                TokenKind::Question => self.parse_builtin(expr)?,
                TokenKind::LParen => {
                    let args = self.parse_call_args(false)?;
                    let span = self.expr_span(expr).merge(self.cursor.previous_span());
                    self.alloc(ExprKind::Call { callee: expr, args }, span)
                }
                TokenKind::DoubleQuestion => {
                    let op_span = self.cursor.advance().span;
                    let span = self.expr_span(expr).merge(op_span);
                    self.alloc(ExprKind::Exists(expr), span)
                }
                TokenKind::Bang => {
                    let op_span = self.cursor.advance().span;
                    let fallback = if self.cursor.kind().starts_operand() {
                        self.parse_unary()?
                    } else {
                        ExprId::INVALID
                    };
                    let end = match fallback.valid() {
                        Some(fallback) => self.expr_span(fallback),
                        None => op_span,
                    };
                    let span = self.expr_span(expr).merge(end);
                    return Ok(self.alloc(ExprKind::Default { expr, fallback }, span));
                }
                _ => return Ok(expr),
            };
        }
    }

    /// Callee of a user-directive call: a name with `.` and `[]` access.
    pub(crate) fn parse_callee(&mut self) -> Result<ExprId, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            expr = match self.cursor.kind() {
                TokenKind::Dot => self.parse_member(expr)?,
                TokenKind::LBracket => self.parse_index(expr)?,
                _ => return Ok(expr),
            };
        }
    }

    fn parse_member(&mut self, receiver: ExprId) -> Result<ExprId, ParseError> {
        self.cursor.advance();
        let token = self.cursor.current();
        if !matches!(
            token.kind,
            TokenKind::Ident | TokenKind::True | TokenKind::False | TokenKind::As
        ) {
            return Err(self.unexpected("name after `.`"));
        }
        self.cursor.advance();
        let name = self.interner.intern(self.slice(token.span));
        let span = self.expr_span(receiver).merge(token.span);
        Ok(self.alloc(ExprKind::Dot { receiver, name }, span))
    }

    fn parse_index(&mut self, receiver: ExprId) -> Result<ExprId, ParseError> {
        self.cursor.advance();
        let index = self.with_context(
            self.context.without(ParseContext::NO_SINGLE_EQ),
            Self::parse_expr,
        )?;
        let close = self.expect(TokenKind::RBracket, "`]`")?;
        let span = self.expr_span(receiver).merge(close);
        Ok(self.alloc(ExprKind::Index { receiver, index }, span))
    }

    /// `target?name` with optional arguments.
    fn parse_builtin(&mut self, target: ExprId) -> Result<ExprId, ParseError> {
        self.cursor.advance();
        let name_token = self.cursor.current();
        if name_token.kind != TokenKind::Ident {
            return Err(self.unexpected("built-in name"));
        }
        self.cursor.advance();
        let name = self.slice(name_token.span);
        let Some(builtin) = self.builtins.get(name) else {
            return Err(self.error(
                ParseErrorKind::UnknownBuiltIn {
                    name: name.to_owned(),
                    suggestion: self.builtins.suggest(name),
                },
                name_token.span,
            ));
        };
        match builtin {
            BuiltInRef::Regular(builtin) => {
                if builtin.is_legacy_escaping() && self.auto_escape && self.format.is_markup() {
                    return Err(self.error(
                        ParseErrorKind::LegacyEscaping {
                            builtin: builtin.name(),
                            format: self.format.name(),
                        },
                        name_token.span,
                    ));
                }
                let args = self.parse_builtin_args(builtin.accepts_lambda())?;
                self.check_arity(builtin.name(), builtin.arity(), args, name_token.span)?;
                let span = self.expr_span(target).merge(self.cursor.previous_span());
                Ok(self.alloc(
                    ExprKind::BuiltIn {
                        target,
                        builtin,
                        args,
                    },
                    span,
                ))
            }
            BuiltInRef::LoopVar(builtin) => {
                let var = match self.ast.expr(target).kind {
                    ExprKind::Ident(var) if self.loop_vars.contains(&var) => var,
                    _ => {
                        let span = self.expr_span(target);
                        return Err(self.error(
                            ParseErrorKind::NotALoopVariable {
                                builtin: builtin.name(),
                                name: self.slice(span).to_owned(),
                            },
                            span,
                        ));
                    }
                };
                let args = self.parse_builtin_args(false)?;
                self.check_arity(builtin.name(), builtin.arity(), args, name_token.span)?;
                let span = self.expr_span(target).merge(self.cursor.previous_span());
                Ok(self.alloc(ExprKind::LoopVar { var, builtin, args }, span))
            }
        }
    }

    fn parse_builtin_args(&mut self, allow_lambda: bool) -> Result<ExprRange, ParseError> {
        if self.cursor.check(TokenKind::LParen) {
            self.parse_call_args(allow_lambda)
        } else {
            Ok(ExprRange::EMPTY)
        }
    }

    fn check_arity(
        &self,
        name: &'static str,
        (min, max): (u8, u8),
        args: ExprRange,
        span: Span,
    ) -> Result<(), ParseError> {
        let found = args.len();
        let too_many = max != VARIADIC && found > usize::from(max);
        if found < usize::from(min) || too_many {
            return Err(self.error(
                ParseErrorKind::BuiltInArity {
                    name,
                    min,
                    max,
                    found,
                },
                span,
            ));
        }
        Ok(())
    }

    /// `( expr, ... )`; the cursor is on `(`.
    pub(crate) fn parse_call_args(&mut self, allow_lambda: bool) -> Result<ExprRange, ParseError> {
        self.cursor.advance();
        let context = self.context.without(ParseContext::NO_SINGLE_EQ);
        let ids = self.with_context(context, |p| {
            let mut ids = Vec::new();
            while !p.cursor.check(TokenKind::RParen) {
                let arg = if p.at_lambda() {
                    if !allow_lambda {
                        return Err(p.error(ParseErrorKind::LambdaNotAllowed, p.cursor.span()));
                    }
                    p.parse_lambda()?
                } else {
                    p.parse_expr()?
                };
                ids.push(arg);
                if !p.cursor.eat(TokenKind::Comma) {
                    break;
                }
            }
            p.expect(TokenKind::RParen, "`,` or `)`")?;
            Ok(ids)
        })?;
        Ok(self.ast.push_exprs(&ids))
    }

    fn at_lambda(&self) -> bool {
        match self.cursor.kind() {
            TokenKind::Ident => self.cursor.peek_kind(1) == TokenKind::Arrow,
            TokenKind::LParen => {
                self.cursor.peek_kind(1) == TokenKind::Ident
                    && self.cursor.peek_kind(2) == TokenKind::RParen
                    && self.cursor.peek_kind(3) == TokenKind::Arrow
            }
            _ => false,
        }
    }

    /// `x -> body` or `(x) -> body`.
    fn parse_lambda(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.span();
        let parens = self.cursor.eat(TokenKind::LParen);
        let param_span = self.expect(TokenKind::Ident, "lambda parameter")?;
        if parens {
            self.expect(TokenKind::RParen, "`)`")?;
        }
        self.expect(TokenKind::Arrow, "`->`")?;
        let param = self.interner.intern(self.slice(param_span));
        let body = self.parse_expr()?;
        let span = start.merge(self.expr_span(body));
        Ok(self.alloc(ExprKind::Lambda { param, body }, span))
    }

    fn parse_primary(&mut self) -> Result<ExprId, ParseError> {
        let token = self.cursor.current();
        let kind = match token.kind {
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::Int => {
                let text = self.slice(token.span);
                match text.parse::<i64>() {
                    Ok(value) => ExprKind::Int(value),
                    Err(_) => ExprKind::Float(parse_float(text).to_bits()),
                }
            }
            TokenKind::Decimal => ExprKind::Float(parse_float(self.slice(token.span)).to_bits()),
            TokenKind::Str => {
                self.cursor.advance();
                return self.parse_string(token.span);
            }
            TokenKind::RawStr => {
                let content = cook::literal_content(token.span, true);
                ExprKind::Str(self.interner.intern(self.slice(content)))
            }
            TokenKind::Ident => ExprKind::Ident(self.interner.intern(self.slice(token.span))),
            TokenKind::Dot => {
                self.cursor.advance();
                let name_token = self.cursor.current();
                if name_token.kind != TokenKind::Ident {
                    return Err(self.unexpected("special variable name"));
                }
                let name = self.slice(name_token.span);
                let Some(var) = SpecialVar::from_name(name) else {
                    return Err(self.error(
                        ParseErrorKind::UnknownSpecialVariable(name.to_owned()),
                        token.span.merge(name_token.span),
                    ));
                };
                self.cursor.advance();
                return Ok(self.alloc(ExprKind::Special(var), token.span.merge(name_token.span)));
            }
            TokenKind::LParen => {
                self.cursor.advance();
                let context = self.context.without(ParseContext::NO_SINGLE_EQ);
                let inner = self.with_context(context, Self::parse_expr)?;
                let close = self.expect(TokenKind::RParen, "`)`")?;
                return Ok(self.alloc(ExprKind::Paren(inner), token.span.merge(close)));
            }
            TokenKind::LBracket => return self.parse_sequence(),
            TokenKind::LBrace => return self.parse_hash(),
            _ => return Err(self.unexpected("expression")),
        };
        self.cursor.advance();
        Ok(self.alloc(kind, token.span))
    }

    fn parse_sequence(&mut self) -> Result<ExprId, ParseError> {
        let open = self.cursor.advance().span;
        let context = self.context.without(ParseContext::NO_SINGLE_EQ);
        let items = self.with_context(context, |p| {
            let mut items = Vec::new();
            while !p.cursor.check(TokenKind::RBracket) {
                items.push(p.parse_expr()?);
                if !p.cursor.eat(TokenKind::Comma) {
                    break;
                }
            }
            Ok(items)
        })?;
        let close = self.expect(TokenKind::RBracket, "`,` or `]`")?;
        let items = self.ast.push_exprs(&items);
        Ok(self.alloc(ExprKind::Sequence(items), open.merge(close)))
    }

    fn parse_hash(&mut self) -> Result<ExprId, ParseError> {
        let open = self.cursor.advance().span;
        let context = self.context.without(ParseContext::NO_SINGLE_EQ);
        let entries = self.with_context(context, |p| {
            let mut entries = Vec::new();
            while !p.cursor.check(TokenKind::RBrace) {
                let key = p.parse_expr()?;
                p.expect(TokenKind::Colon, "`:`")?;
                let value = p.parse_expr()?;
                entries.push(HashEntry { key, value });
                if !p.cursor.eat(TokenKind::Comma) {
                    break;
                }
            }
            Ok(entries)
        })?;
        let close = self.expect(TokenKind::RBrace, "`,` or `}`")?;
        let entries = self.ast.push_hash_entries(&entries);
        Ok(self.alloc(ExprKind::Hash(entries), open.merge(close)))
    }

    /// A quoted literal; `${...}` parts are parsed as nested expressions.
    fn parse_string(&mut self, token_span: Span) -> Result<ExprId, ParseError> {
        let content = cook::literal_content(token_span, false);
        let segments = cook::split_interpolations(self.source, content)
            .map_err(|e| self.error(ParseErrorKind::Lex(e.kind), e.span))?;
        if let [Segment::Text(text)] = segments.as_slice() {
            let name = self.interner.intern(text);
            return Ok(self.alloc(ExprKind::Str(name), token_span));
        }
        let mut parts = Vec::with_capacity(segments.len());
        for segment in segments {
            let part = match segment {
                Segment::Text(text) => StrPart::Text(self.interner.intern(&text)),
                Segment::Interp(span) => StrPart::Interp(self.parse_embedded(span)?),
            };
            parts.push(part);
        }
        let parts = self.ast.push_str_parts(&parts);
        Ok(self.alloc(ExprKind::Interpolated(parts), token_span))
    }

    /// Parse the expression at `span` with a fresh cursor.
    fn parse_embedded(&mut self, span: Span) -> Result<ExprId, ParseError> {
        let saved = std::mem::take(&mut self.cursor);
        let result = self.begin_tokens(span).and_then(|()| {
            let context = self.context.without(ParseContext::NO_SINGLE_EQ);
            let expr = self.with_context(context, Self::parse_expr)?;
            self.finish_tokens("`}`")?;
            Ok(expr)
        });
        self.cursor = saved;
        result
    }

    /// Intern an identifier or string literal used as a name.
    pub(crate) fn parse_name(
        &mut self,
        expected: &'static str,
    ) -> Result<(Name, Span), ParseError> {
        let token = self.cursor.current();
        let text = match token.kind {
            TokenKind::Ident => self.slice(token.span).to_owned(),
            TokenKind::Str => cook::unescape(self.source, cook::literal_content(token.span, false))
                .map_err(|e| self.error(ParseErrorKind::Lex(e.kind), e.span))?
                .into_owned(),
            _ => return Err(self.unexpected(expected)),
        };
        self.cursor.advance();
        Ok((self.interner.intern(&text), token.span))
    }
}

fn parse_float(text: &str) -> f64 {
    // The tokenizer only produces digit runs with an optional fraction.
    text.parse().unwrap_or(f64::INFINITY)
}
