//! Recursive descent parser for FTL templates.
//!
//! Produces one flat [`Ast`] per template: the scanner's pieces become
//! elements, tag parameters and interpolations are tokenized and parsed into
//! expressions.
//!
//! # Architecture
//!
//! - [`Cursor`] walks the tokens of one tag or interpolation at a time
//! - `grammar::expr` and `grammar::primary` hold the precedence chain
//! - `grammar::elements` builds block structure from pieces
//! - `grammar::directive` parses each directive's parameters
//!
//! Output format and auto-escaping are tracked while parsing; every
//! interpolation records the values in force where it appears, so the
//! interpreter never has to re-derive them.

mod context;
mod cursor;
mod error;
mod grammar;

pub use context::ParseContext;
pub use cursor::Cursor;
pub use error::{ParseError, ParseErrorKind};

use ftl_ir::{
    Ast, BuiltInTable, Canonical, ElementId, ElementRange, InterpolationSyntax, Name,
    StringInterner, TagSyntax,
};
use ftl_lexer::Piece;
use ftl_output::{OutputFormat, OutputFormatRegistry};

/// Parser configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ParserSettings {
    pub tag_syntax: TagSyntax,
    pub interpolation_syntax: InterpolationSyntax,
    /// Output format of the template unless `#ftl output_format` overrides it.
    pub output_format: OutputFormat,
    /// Auto-escape when the output format is a markup format.
    pub auto_escape: bool,
    pub strip_whitespace: bool,
}

impl Default for ParserSettings {
    fn default() -> Self {
        ParserSettings {
            tag_syntax: TagSyntax::AutoDetect,
            interpolation_syntax: InterpolationSyntax::Dollar,
            output_format: OutputFormat::Undefined,
            auto_escape: true,
            strip_whitespace: true,
        }
    }
}

/// A parsed template: arena, names and the root element range.
#[derive(Clone, Debug)]
pub struct ParsedTemplate {
    pub ast: Ast,
    pub interner: StringInterner,
    pub root: ElementRange,
    /// Every `#macro` and `#function` definition, in document order.
    pub macros: Vec<ElementId>,
    /// The tag syntax in effect (auto-detection resolved).
    pub syntax: TagSyntax,
    pub interpolation: InterpolationSyntax,
    /// Output format at the root of the template.
    pub output_format: OutputFormat,
    /// Whether auto-escaping is on at the root of the template.
    pub auto_escape: bool,
    /// The `auto_esc` policy: markup formats entered by `#outputformat`
    /// auto-escape when this is set.
    pub auto_escape_policy: bool,
}

impl ParsedTemplate {
    /// Canonical source of the whole template.
    pub fn canonical(&self) -> String {
        Canonical::with_syntax(&self.ast, &self.interner, self.syntax, self.interpolation)
            .elements(self.root)
    }

    pub fn name(&self, name: Name) -> &str {
        self.interner.lookup(name)
    }
}

/// Parse `source` into a [`ParsedTemplate`].
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn parse(
    source: &str,
    settings: &ParserSettings,
    builtins: &BuiltInTable,
    formats: &OutputFormatRegistry,
) -> Result<ParsedTemplate, ParseError> {
    let scanned = ftl_lexer::scan(source, settings.tag_syntax, settings.interpolation_syntax)
        .map_err(|e| ParseError::new(source, ParseErrorKind::Lex(e.kind), e.span))?;
    tracing::debug!(pieces = scanned.pieces.len(), syntax = ?scanned.syntax, "scanned");
    let parser = Parser::new(source, settings, builtins, formats, scanned.pieces, scanned.syntax);
    parser.parse_template()
}

/// Parser state for one template.
pub(crate) struct Parser<'a> {
    source: &'a str,
    settings: &'a ParserSettings,
    builtins: &'a BuiltInTable,
    formats: &'a OutputFormatRegistry,
    syntax: TagSyntax,
    pieces: Vec<Piece>,
    piece_pos: usize,
    cursor: Cursor,
    ast: Ast,
    interner: StringInterner,
    context: ParseContext,
    format: OutputFormat,
    auto_escape: bool,
    /// `auto_esc` policy: auto-escape markup formats by default.
    auto_escape_policy: bool,
    strip_text: bool,
    strip_whitespace: bool,
    /// Names declared by enclosing `#list`/`#items`, innermost last.
    loop_vars: Vec<Name>,
    macros: Vec<ElementId>,
    /// `#items` seen inside the innermost `#list` without `as`.
    items_found: u32,
    header: Option<grammar::Header>,
}

impl<'a> Parser<'a> {
    fn new(
        source: &'a str,
        settings: &'a ParserSettings,
        builtins: &'a BuiltInTable,
        formats: &'a OutputFormatRegistry,
        pieces: Vec<Piece>,
        syntax: TagSyntax,
    ) -> Self {
        Parser {
            source,
            settings,
            builtins,
            formats,
            syntax,
            pieces,
            piece_pos: 0,
            cursor: Cursor::default(),
            ast: Ast::with_capacity(source.len()),
            interner: StringInterner::new(),
            context: ParseContext::NONE,
            format: settings.output_format,
            auto_escape: settings.auto_escape && settings.output_format.is_markup(),
            auto_escape_policy: settings.auto_escape,
            strip_text: false,
            strip_whitespace: settings.strip_whitespace,
            loop_vars: Vec::new(),
            macros: Vec::new(),
            items_found: 0,
            header: None,
        }
    }

    fn error(&self, kind: ParseErrorKind, span: ftl_ir::Span) -> ParseError {
        ParseError::new(self.source, kind, span)
    }
}

#[cfg(test)]
mod tests;
