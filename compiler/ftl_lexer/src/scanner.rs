//! Template-level scanning.
//!
//! Splits source into static text and FTL constructs without parsing
//! expressions. The end of each tag or interpolation is found by running the
//! expression tokenizer and tracking bracket depth, so `<#if (a > b)>` and
//! `<#if x == ">">` end at the right `>`.

use ftl_ir::{InterpolationSyntax, Span, TagSyntax};
use logos::Logos;

use crate::raw_token::RawToken;
use crate::tokens::unexpected_kind;
use crate::{LexError, LexErrorKind};

/// Directive names.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Directive {
    If,
    ElseIf,
    Else,
    List,
    Items,
    Sep,
    Switch,
    Case,
    On,
    Default,
    Break,
    Continue,
    Return,
    Stop,
    Attempt,
    Recover,
    AutoEsc,
    NoAutoEsc,
    OutputFormat,
    Assign,
    Global,
    Local,
    Macro,
    Function,
    Nested,
    Setting,
    Flush,
    Compress,
    NoParse,
    Ftl,
}

impl Directive {
    /// Resolve a directive name; camelCase spellings are accepted.
    pub fn from_name(name: &str) -> Result<Directive, LexErrorKind> {
        let lower = name.to_ascii_lowercase();
        let directive = match lower.as_str() {
            "if" => Directive::If,
            "elseif" => Directive::ElseIf,
            "else" => Directive::Else,
            "list" => Directive::List,
            "items" => Directive::Items,
            "sep" => Directive::Sep,
            "switch" => Directive::Switch,
            "case" => Directive::Case,
            "on" => Directive::On,
            "default" => Directive::Default,
            "break" => Directive::Break,
            "continue" => Directive::Continue,
            "return" => Directive::Return,
            "stop" => Directive::Stop,
            "attempt" => Directive::Attempt,
            "recover" => Directive::Recover,
            "autoesc" => Directive::AutoEsc,
            "noautoesc" => Directive::NoAutoEsc,
            "outputformat" => Directive::OutputFormat,
            "assign" => Directive::Assign,
            "global" => Directive::Global,
            "local" => Directive::Local,
            "macro" => Directive::Macro,
            "function" => Directive::Function,
            "nested" => Directive::Nested,
            "setting" => Directive::Setting,
            "flush" => Directive::Flush,
            "compress" => Directive::Compress,
            "noparse" => Directive::NoParse,
            "ftl" => Directive::Ftl,
            "include" | "import" | "visit" | "recurse" | "fallback" | "escape" | "noescape" => {
                return Err(LexErrorKind::UnsupportedDirective(lower));
            }
            _ => return Err(LexErrorKind::UnknownDirective(name.to_owned())),
        };
        Ok(directive)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Directive::If => "if",
            Directive::ElseIf => "elseif",
            Directive::Else => "else",
            Directive::List => "list",
            Directive::Items => "items",
            Directive::Sep => "sep",
            Directive::Switch => "switch",
            Directive::Case => "case",
            Directive::On => "on",
            Directive::Default => "default",
            Directive::Break => "break",
            Directive::Continue => "continue",
            Directive::Return => "return",
            Directive::Stop => "stop",
            Directive::Attempt => "attempt",
            Directive::Recover => "recover",
            Directive::AutoEsc => "autoesc",
            Directive::NoAutoEsc => "noautoesc",
            Directive::OutputFormat => "outputformat",
            Directive::Assign => "assign",
            Directive::Global => "global",
            Directive::Local => "local",
            Directive::Macro => "macro",
            Directive::Function => "function",
            Directive::Nested => "nested",
            Directive::Setting => "setting",
            Directive::Flush => "flush",
            Directive::Compress => "compress",
            Directive::NoParse => "noparse",
            Directive::Ftl => "ftl",
        }
    }
}

/// One top-level construct of a template.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Piece {
    Text(Span),
    /// `#noparse` block; `content` is emitted verbatim.
    NoParse { span: Span, content: Span },
    Comment { span: Span, content: Span },
    Interpolation { span: Span, expr: Span },
    /// Directive start or end tag.
    Tag {
        span: Span,
        directive: Directive,
        closing: bool,
        params: Span,
        self_closing: bool,
    },
    /// `<@callee args>`; `params` starts at the callee.
    UserCall {
        span: Span,
        params: Span,
        self_closing: bool,
    },
    /// `</@callee>` or `</@>`
    UserCallEnd { span: Span, name: Span },
}

impl Piece {
    pub fn span(&self) -> Span {
        match *self {
            Piece::Text(span)
            | Piece::NoParse { span, .. }
            | Piece::Comment { span, .. }
            | Piece::Interpolation { span, .. }
            | Piece::Tag { span, .. }
            | Piece::UserCall { span, .. }
            | Piece::UserCallEnd { span, .. } => span,
        }
    }

    /// FTL tags and comments; lines holding only these are stripped.
    pub fn is_tag(&self) -> bool {
        matches!(
            self,
            Piece::Comment { .. }
                | Piece::Tag { .. }
                | Piece::UserCall { .. }
                | Piece::UserCallEnd { .. }
        )
    }
}

/// Scanner output.
#[derive(Clone, Debug)]
pub struct Scanned {
    pub pieces: Vec<Piece>,
    /// The tag syntax in effect (never [`TagSyntax::AutoDetect`]).
    pub syntax: TagSyntax,
}

/// Split `source` into pieces.
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn scan(
    source: &str,
    tags: TagSyntax,
    interpolation: InterpolationSyntax,
) -> Result<Scanned, LexError> {
    if u32::try_from(source.len()).is_err() {
        return Err(LexError::new(LexErrorKind::SourceTooLarge, Span::DUMMY));
    }
    let syntax = match tags {
        TagSyntax::AutoDetect => detect_syntax(source),
        concrete => concrete,
    };
    tracing::trace!(?syntax, "tag syntax");
    let mut scanner = Scanner {
        src: source,
        pos: 0,
        text_start: 0,
        syntax,
        interpolation,
        pieces: Vec::new(),
    };
    scanner.run()?;
    Ok(Scanned {
        pieces: scanner.pieces,
        syntax,
    })
}

/// The syntax of the first FTL tag, or angle brackets if there is none.
pub fn detect_syntax(source: &str) -> TagSyntax {
    let bytes = source.as_bytes();
    let mut pos = 0;
    while let Some(idx) = memchr::memchr2(b'<', b'[', &bytes[pos..]) {
        let at = pos + idx;
        if is_tag_start(bytes, at + 1) {
            return if bytes[at] == b'<' {
                TagSyntax::Angle
            } else {
                TagSyntax::Square
            };
        }
        pos = at + 1;
    }
    TagSyntax::Angle
}

/// Whether the bytes after an opening bracket start an FTL tag.
fn is_tag_start(bytes: &[u8], at: usize) -> bool {
    let rest = &bytes[at.min(bytes.len())..];
    match rest {
        [b'#', b'-', b'-', ..] => true,
        [b'#', c, ..] | [b'/', b'#', c, ..] => c.is_ascii_alphabetic(),
        [b'@', c, ..] => is_callee_start(*c),
        [b'/', b'@', ..] => true,
        _ => false,
    }
}

fn is_callee_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || matches!(c, b'_' | b'$' | b'.') || c >= 0x80
}

/// What ends the expression text being measured.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Terminator {
    Tag(TagSyntax),
    Interpolation(InterpolationSyntax),
    /// `}` closing `${` inside a string literal.
    Brace,
}

/// Where an expression stops.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct ExprEnd {
    /// End of the expression text.
    pub end: usize,
    /// Offset just past the closing delimiter.
    pub close_end: usize,
    pub self_closing: bool,
}

/// Find the end of the expression text starting at `start`.
pub(crate) fn find_expression_end(
    source: &str,
    start: usize,
    terminator: Terminator,
) -> Result<ExprEnd, LexError> {
    let bytes = source.as_bytes();
    let (is_tag, close) = match terminator {
        Terminator::Tag(syntax) => (true, syntax.close()),
        Terminator::Interpolation(syntax) => (false, syntax.close()),
        Terminator::Brace => (false, '}'),
    };
    let mut lexer = RawToken::lexer(&source[start..]);
    let mut depth = 0usize;
    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let tok_start = start + range.start;
        let tok_end = start + range.end;
        let Ok(token) = result else {
            return Err(LexError::new(
                unexpected_kind(lexer.slice()),
                Span::from_range(tok_start..tok_end),
            ));
        };
        match token {
            RawToken::LParen | RawToken::LBracket | RawToken::LBrace => depth += 1,
            RawToken::RParen | RawToken::RBracket | RawToken::RBrace => {
                let closes = matches!(
                    (token, close),
                    (RawToken::RBracket, ']') | (RawToken::RBrace, '}')
                );
                if depth == 0 && closes {
                    return Ok(ExprEnd {
                        end: tok_start,
                        close_end: tok_end,
                        self_closing: false,
                    });
                }
                depth = depth.saturating_sub(1);
            }
            RawToken::Gt | RawToken::GtEq if depth == 0 && is_tag && close == '>' => {
                return Ok(ExprEnd {
                    end: tok_start,
                    close_end: tok_start + 1,
                    self_closing: false,
                });
            }
            RawToken::Slash
                if depth == 0 && is_tag && bytes.get(tok_end) == Some(&(close as u8)) =>
            {
                return Ok(ExprEnd {
                    end: tok_start,
                    close_end: tok_end + 1,
                    self_closing: true,
                });
            }
            _ => {}
        }
    }
    let span = Span::from_range(start..source.len());
    let kind = if is_tag {
        LexErrorKind::UnclosedTag { expected: close }
    } else {
        LexErrorKind::UnclosedInterpolation { expected: close }
    };
    Err(LexError::new(kind, span))
}

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
    text_start: usize,
    syntax: TagSyntax,
    interpolation: InterpolationSyntax,
    pieces: Vec<Piece>,
}

impl Scanner<'_> {
    fn run(&mut self) -> Result<(), LexError> {
        let bytes = self.src.as_bytes();
        let open = self.syntax.open() as u8;
        let interp = match self.interpolation {
            InterpolationSyntax::Dollar => b'$',
            InterpolationSyntax::Bracket => b'[',
        };
        while self.pos < bytes.len() {
            let Some(idx) = memchr::memchr2(open, interp, &bytes[self.pos..]) else {
                break;
            };
            let at = self.pos + idx;
            match self.markup_at(at)? {
                Some(next) => self.pos = next,
                None => self.pos = at + 1,
            }
        }
        self.flush_text(self.src.len());
        Ok(())
    }

    fn flush_text(&mut self, end: usize) {
        if end > self.text_start {
            self.pieces
                .push(Piece::Text(Span::from_range(self.text_start..end)));
        }
    }

    fn push(&mut self, at: usize, end: usize, piece: Piece) -> usize {
        self.flush_text(at);
        self.pieces.push(piece);
        self.text_start = end;
        end
    }

    /// Recognize a construct starting at `at`; returns the offset after it.
    fn markup_at(&mut self, at: usize) -> Result<Option<usize>, LexError> {
        let rest = &self.src[at..];
        let open = self.interpolation.open();
        if rest.starts_with(open) {
            let expr_start = at + open.len();
            let end = find_expression_end(
                self.src,
                expr_start,
                Terminator::Interpolation(self.interpolation),
            )?;
            let piece = Piece::Interpolation {
                span: Span::from_range(at..end.close_end),
                expr: Span::from_range(expr_start..end.end),
            };
            return Ok(Some(self.push(at, end.close_end, piece)));
        }
        if !rest.starts_with(self.syntax.open()) {
            return Ok(None);
        }
        let bytes = self.src.as_bytes();
        if !is_tag_start(bytes, at + 1) {
            return Ok(None);
        }
        let after = &rest[1..];
        if after.starts_with("#--") {
            return self.comment(at).map(Some);
        }
        if after.starts_with("/@") {
            return self.user_call_end(at).map(Some);
        }
        if after.starts_with('@') {
            let params_start = at + 2;
            let end = find_expression_end(self.src, params_start, Terminator::Tag(self.syntax))?;
            let piece = Piece::UserCall {
                span: Span::from_range(at..end.close_end),
                params: Span::from_range(params_start..end.end),
                self_closing: end.self_closing,
            };
            return Ok(Some(self.push(at, end.close_end, piece)));
        }
        self.directive(at).map(Some)
    }

    fn comment(&mut self, at: usize) -> Result<usize, LexError> {
        let content_start = at + 4;
        let terminator = format!("--{}", self.syntax.close());
        let Some(idx) = self.src[content_start..].find(&terminator) else {
            return Err(LexError::new(
                LexErrorKind::UnclosedComment,
                Span::from_range(at..content_start),
            ));
        };
        let content_end = content_start + idx;
        let end = content_end + terminator.len();
        let piece = Piece::Comment {
            span: Span::from_range(at..end),
            content: Span::from_range(content_start..content_end),
        };
        Ok(self.push(at, end, piece))
    }

    fn user_call_end(&mut self, at: usize) -> Result<usize, LexError> {
        let name_start = at + 3;
        let close = self.syntax.close() as u8;
        let Some(idx) = memchr::memchr(close, &self.src.as_bytes()[name_start..]) else {
            return Err(LexError::new(
                LexErrorKind::UnclosedTag {
                    expected: self.syntax.close(),
                },
                Span::from_range(at..name_start),
            ));
        };
        let name_end = name_start + idx;
        let name = trim_span(self.src, name_start, name_end);
        let end = name_end + 1;
        let piece = Piece::UserCallEnd {
            span: Span::from_range(at..end),
            name,
        };
        Ok(self.push(at, end, piece))
    }

    fn directive(&mut self, at: usize) -> Result<usize, LexError> {
        let bytes = self.src.as_bytes();
        let closing = bytes.get(at + 1) == Some(&b'/');
        let name_start = at + if closing { 3 } else { 2 };
        let name_end = name_start
            + bytes[name_start..]
                .iter()
                .take_while(|b| b.is_ascii_alphabetic())
                .count();
        let name_span = Span::from_range(name_start..name_end);
        let directive = Directive::from_name(&self.src[name_start..name_end])
            .map_err(|kind| LexError::new(kind, name_span))?;

        if closing {
            let ws = bytes[name_end..]
                .iter()
                .take_while(|b| b.is_ascii_whitespace())
                .count();
            let close_at = name_end + ws;
            if bytes.get(close_at) != Some(&(self.syntax.close() as u8)) {
                return Err(LexError::new(
                    LexErrorKind::UnclosedTag {
                        expected: self.syntax.close(),
                    },
                    Span::from_range(at..close_at),
                ));
            }
            let end = close_at + 1;
            let piece = Piece::Tag {
                span: Span::from_range(at..end),
                directive,
                closing: true,
                params: Span::point(to_u32(name_end)),
                self_closing: false,
            };
            return Ok(self.push(at, end, piece));
        }

        let end = find_expression_end(self.src, name_end, Terminator::Tag(self.syntax))?;
        if directive == Directive::NoParse {
            return self.noparse(at, end.close_end);
        }
        let piece = Piece::Tag {
            span: Span::from_range(at..end.close_end),
            directive,
            closing: false,
            params: Span::from_range(name_end..end.end),
            self_closing: end.self_closing,
        };
        Ok(self.push(at, end.close_end, piece))
    }

    fn noparse(&mut self, at: usize, content_start: usize) -> Result<usize, LexError> {
        let open = self.syntax.open();
        let close = self.syntax.close();
        let haystack = &self.src[content_start..];
        let found = [format!("{open}/#noparse"), format!("{open}/#noParse")]
            .iter()
            .filter_map(|needle| haystack.find(needle.as_str()).map(|i| (i, needle.len())))
            .min();
        let Some((idx, len)) = found else {
            return Err(LexError::new(
                LexErrorKind::UnclosedNoParse,
                Span::from_range(at..content_start),
            ));
        };
        let content_end = content_start + idx;
        let after_name = content_end + len;
        let ws = self.src.as_bytes()[after_name..]
            .iter()
            .take_while(|b| b.is_ascii_whitespace())
            .count();
        let close_at = after_name + ws;
        if self.src.as_bytes().get(close_at) != Some(&(close as u8)) {
            return Err(LexError::new(
                LexErrorKind::UnclosedTag { expected: close },
                Span::from_range(content_end..close_at),
            ));
        }
        let end = close_at + 1;
        let piece = Piece::NoParse {
            span: Span::from_range(at..end),
            content: Span::from_range(content_start..content_end),
        };
        Ok(self.push(at, end, piece))
    }
}

fn trim_span(src: &str, start: usize, end: usize) -> Span {
    let text = &src[start..end];
    let leading = text.len() - text.trim_start().len();
    let trimmed = text.trim();
    Span::from_range(start + leading..start + leading + trimmed.len())
}

fn to_u32(offset: usize) -> u32 {
    // Sources longer than u32::MAX are rejected before scanning.
    u32::try_from(offset).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests;
