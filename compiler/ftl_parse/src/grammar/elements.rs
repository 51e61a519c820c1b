//! Template structure.
//!
//! [`Parser::parse_elements`] collects sibling elements until it meets a
//! piece it can't place: an end tag, a clause of the enclosing block
//! (`#else`, `#case`, ...), the end of a user-directive call, or the end of
//! the template. It leaves that piece unconsumed and reports it as a
//! [`BlockEnd`]; the block parser above decides whether it belongs there.

use ftl_ir::{Element, ElementId, ElementKind, ElementRange, Span};
use ftl_lexer::{strip_whitespace, Directive, Piece};
use ftl_stack::ensure_sufficient_stack;

use crate::{ParseError, ParseErrorKind, ParsedTemplate, Parser};

/// Why [`Parser::parse_elements`] stopped; `index` is the unconsumed piece.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum BlockEnd {
    Eof,
    Clause { directive: Directive, index: usize },
    Close { directive: Directive, index: usize },
    CallEnd { index: usize },
}

/// Directives that continue an enclosing block instead of starting one.
fn is_clause(directive: Directive) -> bool {
    matches!(
        directive,
        Directive::ElseIf
            | Directive::Else
            | Directive::Recover
            | Directive::Case
            | Directive::On
            | Directive::Default
    )
}

fn clause_requirement(directive: Directive) -> &'static str {
    match directive {
        Directive::ElseIf => "must be inside #if",
        Directive::Else => "must be inside #if or #list",
        Directive::Recover => "must be inside #attempt",
        _ => "must be inside #switch",
    }
}

impl Parser<'_> {
    pub(crate) fn parse_template(mut self) -> Result<ParsedTemplate, ParseError> {
        self.parse_header()?;
        if self.strip_whitespace {
            let pieces = std::mem::take(&mut self.pieces);
            self.pieces = strip_whitespace(self.source, pieces);
        }
        let root_format = self.format;
        let root_auto_escape = self.auto_escape;

        let (mut ids, end) = self.parse_elements()?;
        if end != BlockEnd::Eof {
            return Err(self.unexpected_end(end, None, Span::DUMMY));
        }
        if self.strip_text {
            let ast = &self.ast;
            ids.retain(|id| !matches!(ast.element(*id).kind, ElementKind::Text(_)));
        }
        let root = self.ast.push_elements(&ids);
        tracing::debug!(
            elements = self.ast.element_count(),
            exprs = self.ast.expr_count(),
            macros = self.macros.len(),
            "parsed template"
        );
        Ok(ParsedTemplate {
            ast: self.ast,
            interner: self.interner,
            root,
            macros: self.macros,
            syntax: self.syntax,
            interpolation: self.settings.interpolation_syntax,
            output_format: root_format,
            auto_escape: root_auto_escape,
            auto_escape_policy: self.auto_escape_policy,
        })
    }

    pub(crate) fn element(&mut self, kind: ElementKind, span: Span) -> ElementId {
        self.ast.alloc_element(Element::new(kind, span))
    }

    /// Parse siblings until a piece that ends the current block.
    pub(crate) fn parse_elements(&mut self) -> Result<(Vec<ElementId>, BlockEnd), ParseError> {
        ensure_sufficient_stack(|| self.parse_elements_inner())
    }

    fn parse_elements_inner(&mut self) -> Result<(Vec<ElementId>, BlockEnd), ParseError> {
        let mut ids = Vec::new();
        while let Some(piece) = self.pieces.get(self.piece_pos).copied() {
            let index = self.piece_pos;
            let id = match piece {
                Piece::Text(span) => {
                    self.piece_pos += 1;
                    let text = self.interner.intern(self.slice(span));
                    self.element(ElementKind::Text(text), span)
                }
                Piece::NoParse { span, content } => {
                    self.piece_pos += 1;
                    let text = self.interner.intern(self.slice(content));
                    self.element(ElementKind::NoParse(text), span)
                }
                Piece::Comment { span, content } => {
                    self.piece_pos += 1;
                    let text = self.interner.intern(self.slice(content));
                    self.element(ElementKind::Comment(text), span)
                }
                Piece::Interpolation { span, expr } => {
                    self.piece_pos += 1;
                    self.begin_tokens(expr)?;
                    let expr = self.parse_expr()?;
                    self.finish_tokens("end of interpolation")?;
                    let kind = ElementKind::Interpolation {
                        expr,
                        format: self.format,
                        auto_escape: self.auto_escape,
                    };
                    self.element(kind, span)
                }
                Piece::Tag {
                    directive,
                    closing: true,
                    ..
                } => return Ok((ids, BlockEnd::Close { directive, index })),
                Piece::Tag { directive, .. } if is_clause(directive) => {
                    return Ok((ids, BlockEnd::Clause { directive, index }));
                }
                Piece::Tag {
                    span,
                    directive,
                    params,
                    self_closing,
                    ..
                } => {
                    self.piece_pos += 1;
                    tracing::trace!(directive = directive.name(), ?span, "directive");
                    self.parse_directive(directive, span, params, self_closing)?
                }
                Piece::UserCall {
                    span,
                    params,
                    self_closing,
                } => {
                    self.piece_pos += 1;
                    self.parse_user_call(span, params, self_closing)?
                }
                Piece::UserCallEnd { .. } => return Ok((ids, BlockEnd::CallEnd { index })),
            };
            ids.push(id);
        }
        Ok((ids, BlockEnd::Eof))
    }

    /// Parse a block body and push it to the arena.
    pub(crate) fn parse_body(&mut self) -> Result<(ElementRange, BlockEnd), ParseError> {
        let (ids, end) = self.parse_elements()?;
        Ok((self.ast.push_elements(&ids), end))
    }

    /// Consume the end tag of `directive`, or fail describing what was found.
    pub(crate) fn expect_close(
        &mut self,
        end: BlockEnd,
        directive: Directive,
        open: Span,
    ) -> Result<Span, ParseError> {
        match end {
            BlockEnd::Close { directive: found, index } if found == directive => {
                self.piece_pos = index + 1;
                Ok(self.pieces[index].span())
            }
            other => Err(self.unexpected_end(other, Some(directive), open)),
        }
    }

    pub(crate) fn unexpected_end(
        &self,
        end: BlockEnd,
        expected: Option<Directive>,
        open: Span,
    ) -> ParseError {
        let expected_tag = expected.map(|d| format!("</#{}>", d.name()));
        match end {
            BlockEnd::Eof => match expected {
                Some(directive) => {
                    self.error(ParseErrorKind::UnclosedDirective(directive.name()), open)
                }
                None => self.error(
                    ParseErrorKind::UnexpectedToken {
                        found: ftl_lexer::TokenKind::Eof,
                        expected: "end of template",
                    },
                    Span::point(u32::try_from(self.source.len()).unwrap_or(u32::MAX)),
                ),
            },
            BlockEnd::Close { directive, index } => self.error(
                ParseErrorKind::UnexpectedEndTag {
                    found: format!("</#{}>", directive.name()),
                    expected: expected_tag,
                },
                self.pieces[index].span(),
            ),
            BlockEnd::Clause { directive, index } => self.error(
                ParseErrorKind::MisplacedDirective {
                    directive: directive.name(),
                    requirement: clause_requirement(directive),
                },
                self.pieces[index].span(),
            ),
            BlockEnd::CallEnd { index } => {
                let span = self.pieces[index].span();
                self.error(
                    ParseErrorKind::UnexpectedEndTag {
                        found: self.slice(span).to_owned(),
                        expected: expected_tag,
                    },
                    span,
                )
            }
        }
    }

    /// Parameters of the clause tag at `index`, consuming it.
    pub(crate) fn take_clause(&mut self, index: usize) -> (Span, Span) {
        self.piece_pos = index + 1;
        match self.pieces[index] {
            Piece::Tag { span, params, .. } => (span, params),
            other => (other.span(), Span::point(other.span().end)),
        }
    }
}

#[cfg(test)]
mod tests;
