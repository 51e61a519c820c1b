//! Binary and unary operators.
//!
//! Precedence, lowest first: `||`, `&&`, equality, relational, range,
//! additive, multiplicative, `**` (right associative), unary. Postfix
//! operators bind tightest and live in `primary`.

use ftl_ir::{ArithOp, CmpOp, Expr, ExprId, ExprKind, RangeKind, Span};
use ftl_lexer::TokenKind;
use ftl_stack::ensure_sufficient_stack;

use crate::{ParseContext, ParseError, Parser};

impl Parser<'_> {
    /// Parse a full expression.
    pub(crate) fn parse_expr(&mut self) -> Result<ExprId, ParseError> {
        ensure_sufficient_stack(|| self.parse_or())
    }

    /// Parse an expression in which `=` is not a comparison.
    pub(crate) fn parse_value_expr(&mut self) -> Result<ExprId, ParseError> {
        self.with_context(self.context.with(ParseContext::NO_SINGLE_EQ), Self::parse_expr)
    }

    /// Run `f` with `context`, restoring the previous context afterwards.
    pub(crate) fn with_context<T>(
        &mut self,
        context: ParseContext,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let saved = self.context;
        self.context = context;
        let result = f(self);
        self.context = saved;
        result
    }

    pub(crate) fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.ast.alloc_expr(Expr::new(kind, span))
    }

    pub(crate) fn expr_span(&self, id: ExprId) -> Span {
        self.ast.expr(id).span
    }

    fn binary(&mut self, kind: ExprKind, left: ExprId, right: ExprId) -> ExprId {
        let span = self.expr_span(left).merge(self.expr_span(right));
        self.alloc(kind, span)
    }

    fn parse_or(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_and()?;
        while self.cursor.eat(TokenKind::OrOr) {
            let right = self.parse_and()?;
            left = self.binary(ExprKind::Or { left, right }, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_equality()?;
        while self.cursor.eat(TokenKind::AndAnd) {
            let right = self.parse_equality()?;
            left = self.binary(ExprKind::And { left, right }, left, right);
        }
        Ok(left)
    }

    fn match_equality_op(&self) -> Option<CmpOp> {
        match self.cursor.kind() {
            TokenKind::EqEq => Some(CmpOp::Eq),
            TokenKind::Eq if !self.context.has(ParseContext::NO_SINGLE_EQ) => Some(CmpOp::Eq),
            TokenKind::NotEq => Some(CmpOp::NotEq),
            _ => None,
        }
    }

    fn match_relational_op(&self) -> Option<CmpOp> {
        match self.cursor.kind() {
            TokenKind::Lt => Some(CmpOp::Lt),
            TokenKind::LtEq => Some(CmpOp::LtEq),
            TokenKind::Gt => Some(CmpOp::Gt),
            TokenKind::GtEq => Some(CmpOp::GtEq),
            _ => None,
        }
    }

    fn match_additive_op(&self) -> Option<ArithOp> {
        match self.cursor.kind() {
            TokenKind::Plus => Some(ArithOp::Add),
            TokenKind::Minus => Some(ArithOp::Sub),
            _ => None,
        }
    }

    fn match_multiplicative_op(&self) -> Option<ArithOp> {
        match self.cursor.kind() {
            TokenKind::Star => Some(ArithOp::Mul),
            TokenKind::Slash => Some(ArithOp::Div),
            TokenKind::Percent => Some(ArithOp::Rem),
            _ => None,
        }
    }

    fn parse_equality(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_relational()?;
        while let Some(op) = self.match_equality_op() {
            self.cursor.advance();
            let right = self.parse_relational()?;
            left = self.binary(ExprKind::Cmp { op, left, right }, left, right);
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_range()?;
        while let Some(op) = self.match_relational_op() {
            self.cursor.advance();
            let right = self.parse_range()?;
            left = self.binary(ExprKind::Cmp { op, left, right }, left, right);
        }
        Ok(left)
    }

    /// `a..b`, `a..<b`, `a..*n` and the right-unbounded `a..`.
    fn parse_range(&mut self) -> Result<ExprId, ParseError> {
        let start = self.parse_additive()?;
        let kind = match self.cursor.kind() {
            TokenKind::DotDot => RangeKind::Inclusive,
            TokenKind::DotDotLt => RangeKind::Exclusive,
            TokenKind::DotDotStar => RangeKind::Length,
            _ => return Ok(start),
        };
        let op_span = self.cursor.advance().span;
        if kind == RangeKind::Inclusive && !self.cursor.kind().starts_operand() {
            let span = self.expr_span(start).merge(op_span);
            return Ok(self.alloc(
                ExprKind::Range {
                    start,
                    end: ExprId::INVALID,
                    kind: RangeKind::Unbounded,
                },
                span,
            ));
        }
        let end = self.parse_additive()?;
        Ok(self.binary(ExprKind::Range { start, end, kind }, start, end))
    }

    fn parse_additive(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_multiplicative()?;
        while let Some(op) = self.match_additive_op() {
            self.cursor.advance();
            let right = self.parse_multiplicative()?;
            left = self.binary(ExprKind::Arith { op, left, right }, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_power()?;
        while let Some(op) = self.match_multiplicative_op() {
            self.cursor.advance();
            let right = self.parse_power()?;
            left = self.binary(ExprKind::Arith { op, left, right }, left, right);
        }
        Ok(left)
    }

    /// `a ** b ** c` groups as `a ** (b ** c)`.
    fn parse_power(&mut self) -> Result<ExprId, ParseError> {
        let base = self.parse_unary()?;
        if !self.cursor.eat(TokenKind::StarStar) {
            return Ok(base);
        }
        let exponent = ensure_sufficient_stack(|| self.parse_power())?;
        Ok(self.binary(
            ExprKind::Arith {
                op: ArithOp::Pow,
                left: base,
                right: exponent,
            },
            base,
            exponent,
        ))
    }

    pub(crate) fn parse_unary(&mut self) -> Result<ExprId, ParseError> {
        let make: fn(ExprId) -> ExprKind = match self.cursor.kind() {
            TokenKind::Bang => ExprKind::Not,
            TokenKind::Minus => ExprKind::Neg,
            TokenKind::Plus => ExprKind::Pos,
            _ => return self.parse_postfix(),
        };
        let op_span = self.cursor.advance().span;
        let operand = ensure_sufficient_stack(|| self.parse_unary())?;
        let span = op_span.merge(self.expr_span(operand));
        Ok(self.alloc(make(operand), span))
    }
}
