//! Parse errors.

use ftl_ir::{LineIndex, SourcePos, Span};
use ftl_lexer::{LexErrorKind, TokenKind};

/// What went wrong while parsing.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("{0}")]
    Lex(LexErrorKind),

    #[error("found {found}, expected {expected}")]
    UnexpectedToken {
        found: TokenKind,
        expected: &'static str,
    },

    #[error("unknown built-in: ?{name}{}", did_you_mean(.suggestion))]
    UnknownBuiltIn {
        name: String,
        suggestion: Option<&'static str>,
    },

    #[error("?{name} takes {}, got {found}", describe_arity(.min, .max))]
    BuiltInArity {
        name: &'static str,
        min: u8,
        max: u8,
        found: usize,
    },

    #[error("?{builtin} can only be applied to a loop variable, and {name} is not one")]
    NotALoopVariable { builtin: &'static str, name: String },

    #[error(
        "using ?{builtin} (legacy escaping) is not allowed when auto-escaping is on with \
         a markup output format ({format}), to avoid double-escaping mistakes"
    )]
    LegacyEscaping {
        builtin: &'static str,
        format: &'static str,
    },

    #[error("lambda arguments are only allowed by ?filter, ?map, ?take_while and ?drop_while")]
    LambdaNotAllowed,

    #[error("#{directive} {requirement}")]
    MisplacedDirective {
        directive: &'static str,
        requirement: &'static str,
    },

    #[error("#{directive} needs #{clause}")]
    MissingClause {
        directive: &'static str,
        clause: &'static str,
    },

    #[error("#{0} takes no parameters")]
    UnexpectedParams(&'static str),

    #[error("unclosed #{0}: its end tag is missing")]
    UnclosedDirective(&'static str),

    #[error("unclosed call of @{0}: its end tag is missing")]
    UnclosedCall(String),

    #[error("unexpected end tag {found}{}", expected_suffix(.expected))]
    UnexpectedEndTag {
        found: String,
        expected: Option<String>,
    },

    #[error("#list without `as` must contain #items")]
    MissingItems,

    #[error("macro and function definitions can't be nested into each other")]
    NestedMacro,

    #[error("the #ftl header must be the first tag of the template")]
    HeaderNotFirst,

    #[error("unknown #ftl parameter: {0}")]
    UnknownHeaderParam(String),

    #[error("unknown setting name: {0}")]
    UnknownSetting(String),

    #[error("{param} must be {expected}")]
    InvalidParamValue {
        param: String,
        expected: &'static str,
    },

    #[error("unknown output format: {0:?}")]
    UnknownOutputFormat(String),

    #[error("#autoesc is not allowed with the non-markup output format {0}")]
    AutoEscNotMarkup(&'static str),

    #[error("unknown special variable: .{0}")]
    UnknownSpecialVariable(String),

    #[error("#switch can't mix #case and #on")]
    MixedCaseAndOn,

    #[error("#switch already has a #default")]
    DuplicateDefault,

    #[error("only #case, #on or #default may follow #switch")]
    TextInSwitch,
}

fn describe_arity(min: &u8, max: &u8) -> String {
    match (*min, *max) {
        (0, 0) => "no arguments".to_owned(),
        (min, ftl_ir::VARIADIC) => format!("at least {min} argument(s)"),
        (min, max) if min == max => format!("exactly {min} argument(s)"),
        (min, max) => format!("{min} to {max} arguments"),
    }
}

fn did_you_mean(suggestion: &Option<&'static str>) -> String {
    suggestion
        .map(|s| format!(" (did you mean ?{s}?)"))
        .unwrap_or_default()
}

fn expected_suffix(expected: &Option<String>) -> String {
    expected
        .as_ref()
        .map(|e| format!("; expected {e}"))
        .unwrap_or_default()
}

/// A parse error with its location.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind} ({pos})")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub pos: SourcePos,
}

impl ParseError {
    pub fn new(source: &str, kind: ParseErrorKind, span: Span) -> Self {
        let pos = LineIndex::new(source).position(source, span.start);
        ParseError { kind, span, pos }
    }

    /// Message without the location suffix.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

#[cfg(test)]
mod tests;
