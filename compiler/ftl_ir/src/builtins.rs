//! Built-in names and the immutable lookup table.
//!
//! Each built-in declares its accepted argument count and the capabilities
//! its target must have. The parser rejects unknown names and wrong
//! argument counts; the evaluator raises a type mismatch naming
//! [`BuiltIn::target`] when the target lacks every accepted capability.

use rustc_hash::FxHashMap;

use crate::Capabilities;

/// Marker for "any number of arguments".
pub const VARIADIC: u8 = u8::MAX;

const S: Capabilities = Capabilities::STRING;
const N: Capabilities = Capabilities::NUMBER;
const B: Capabilities = Capabilities::BOOLEAN;
const D: Capabilities = Capabilities::DATE;
const SEQ: Capabilities = Capabilities::SEQUENCE;
const COLL: Capabilities = Capabilities::SEQUENCE.union(Capabilities::COLLECTION);
const HX: Capabilities = Capabilities::HASH_EX;
const M: Capabilities = Capabilities::MARKUP;
const ANY: Capabilities = Capabilities::all();

macro_rules! define_builtins {
    ($($variant:ident => $name:literal, $min:expr, $max:expr, $target:expr;)*) => {
        /// Built-ins applied with `expr?name`.
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        pub enum BuiltIn {
            $($variant,)*
        }

        impl BuiltIn {
            pub const ALL: &'static [BuiltIn] = &[$(BuiltIn::$variant,)*];

            /// Canonical snake_case name.
            pub const fn name(self) -> &'static str {
                match self {
                    $(BuiltIn::$variant => $name,)*
                }
            }

            /// Minimum and maximum argument count.
            pub const fn arity(self) -> (u8, u8) {
                match self {
                    $(BuiltIn::$variant => ($min, $max),)*
                }
            }

            /// Capabilities the target may have for this built-in to apply.
            pub const fn target(self) -> Capabilities {
                match self {
                    $(BuiltIn::$variant => $target,)*
                }
            }
        }
    };
}

define_builtins! {
    // strings
    UpperCase => "upper_case", 0, 0, S;
    LowerCase => "lower_case", 0, 0, S;
    CapFirst => "cap_first", 0, 0, S;
    UncapFirst => "uncap_first", 0, 0, S;
    Capitalize => "capitalize", 0, 0, S;
    Trim => "trim", 0, 0, S;
    Length => "length", 0, 0, S;
    Contains => "contains", 1, 1, S;
    StartsWith => "starts_with", 1, 1, S;
    EndsWith => "ends_with", 1, 1, S;
    IndexOf => "index_of", 1, 2, S;
    LastIndexOf => "last_index_of", 1, 2, S;
    Replace => "replace", 2, 3, S;
    Split => "split", 1, 2, S;
    LeftPad => "left_pad", 1, 2, S;
    RightPad => "right_pad", 1, 2, S;
    KeepBefore => "keep_before", 1, 2, S;
    KeepAfter => "keep_after", 1, 2, S;
    KeepBeforeLast => "keep_before_last", 1, 2, S;
    KeepAfterLast => "keep_after_last", 1, 2, S;
    RemoveBeginning => "remove_beginning", 1, 1, S;
    RemoveEnding => "remove_ending", 1, 1, S;
    EnsureStartsWith => "ensure_starts_with", 1, 1, S;
    EnsureEndsWith => "ensure_ends_with", 1, 1, S;
    ChopLinebreak => "chop_linebreak", 0, 0, S;
    WordList => "word_list", 0, 0, S;
    Matches => "matches", 1, 2, S;
    Number => "number", 0, 0, S.union(N);
    Boolean => "boolean", 0, 0, S.union(B);
    Html => "html", 0, 0, S.union(M);
    Xml => "xml", 0, 0, S.union(M);
    Xhtml => "xhtml", 0, 0, S.union(M);
    Rtf => "rtf", 0, 0, S.union(M);
    JsString => "js_string", 0, 0, S;
    JsonString => "json_string", 0, 0, S;
    Url => "url", 0, 1, S;
    // numbers
    Abs => "abs", 0, 0, N;
    Round => "round", 0, 0, N;
    Floor => "floor", 0, 0, N;
    Ceiling => "ceiling", 0, 0, N;
    Int => "int", 0, 0, N;
    IsInfinite => "is_infinite", 0, 0, N;
    IsNan => "is_nan", 0, 0, N;
    LowerAbc => "lower_abc", 0, 0, N;
    UpperAbc => "upper_abc", 0, 0, N;
    // booleans
    Then => "then", 2, 2, B;
    // several types
    C => "c", 0, 0, S.union(N).union(B);
    String => "string", 0, 2, S.union(N).union(B).union(D);
    // dates
    Date => "date", 0, 1, S.union(D);
    Time => "time", 0, 1, S.union(D);
    Datetime => "datetime", 0, 1, S.union(D);
    IsoUtc => "iso_utc", 0, 0, D;
    // sequences
    Size => "size", 0, 0, SEQ.union(HX);
    First => "first", 0, 0, COLL;
    Last => "last", 0, 0, SEQ;
    Reverse => "reverse", 0, 0, SEQ;
    Sort => "sort", 0, 0, COLL;
    SortBy => "sort_by", 1, 1, COLL;
    Join => "join", 1, 3, COLL;
    SeqContains => "seq_contains", 1, 1, COLL;
    SeqIndexOf => "seq_index_of", 1, 2, SEQ;
    SeqLastIndexOf => "seq_last_index_of", 1, 2, SEQ;
    Chunk => "chunk", 1, 2, SEQ;
    Min => "min", 0, 0, COLL;
    Max => "max", 0, 0, COLL;
    Filter => "filter", 1, 1, COLL;
    Map => "map", 1, 1, COLL;
    TakeWhile => "take_while", 1, 1, COLL;
    DropWhile => "drop_while", 1, 1, COLL;
    Sequence => "sequence", 0, 0, COLL;
    // hashes
    Keys => "keys", 0, 0, HX;
    Values => "values", 0, 0, HX;
    // any value
    HasContent => "has_content", 0, 0, ANY;
    IsString => "is_string", 0, 0, ANY;
    IsNumber => "is_number", 0, 0, ANY;
    IsBoolean => "is_boolean", 0, 0, ANY;
    IsDate => "is_date", 0, 0, ANY;
    IsSequence => "is_sequence", 0, 0, ANY;
    IsHash => "is_hash", 0, 0, ANY;
    IsHashEx => "is_hash_ex", 0, 0, ANY;
    IsCollection => "is_collection", 0, 0, ANY;
    IsEnumerable => "is_enumerable", 0, 0, ANY;
    IsIndexable => "is_indexable", 0, 0, ANY;
    IsMacro => "is_macro", 0, 0, ANY;
    IsDirective => "is_directive", 0, 0, ANY;
    IsMethod => "is_method", 0, 0, ANY;
    IsMarkupOutput => "is_markup_output", 0, 0, ANY;
    Default => "default", 1, VARIADIC, ANY;
    IfExists => "if_exists", 0, 0, ANY;
    Switch => "switch", 2, VARIADIC, ANY;
    // markup
    Esc => "esc", 0, 0, S.union(N).union(D).union(M);
    NoEsc => "no_esc", 0, 0, S.union(N).union(D).union(M);
    MarkupString => "markup_string", 0, 0, M;
}

impl BuiltIn {
    /// Built-ins whose target may be missing without raising an error.
    pub const fn accepts_missing_target(self) -> bool {
        matches!(
            self,
            BuiltIn::HasContent | BuiltIn::Default | BuiltIn::IfExists
        )
    }

    /// Built-ins that evaluate only some of their arguments.
    pub const fn has_lazy_args(self) -> bool {
        matches!(self, BuiltIn::Then | BuiltIn::Switch)
    }

    /// Built-ins that take a `x -> expr` argument.
    pub const fn accepts_lambda(self) -> bool {
        matches!(
            self,
            BuiltIn::Filter | BuiltIn::Map | BuiltIn::TakeWhile | BuiltIn::DropWhile
        )
    }

    /// The legacy escaping built-ins that double-escape under auto-escaping.
    pub const fn is_legacy_escaping(self) -> bool {
        matches!(
            self,
            BuiltIn::Html | BuiltIn::Xml | BuiltIn::Xhtml | BuiltIn::Rtf
        )
    }
}

macro_rules! define_loop_builtins {
    ($($variant:ident => $name:literal, $min:expr, $max:expr;)*) => {
        /// Built-ins applied to a loop variable (`x?index`).
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        pub enum LoopVarBuiltIn {
            $($variant,)*
        }

        impl LoopVarBuiltIn {
            pub const ALL: &'static [LoopVarBuiltIn] = &[$(LoopVarBuiltIn::$variant,)*];

            pub const fn name(self) -> &'static str {
                match self {
                    $(LoopVarBuiltIn::$variant => $name,)*
                }
            }

            pub const fn arity(self) -> (u8, u8) {
                match self {
                    $(LoopVarBuiltIn::$variant => ($min, $max),)*
                }
            }
        }
    };
}

define_loop_builtins! {
    Index => "index", 0, 0;
    Counter => "counter", 0, 0;
    HasNext => "has_next", 0, 0;
    IsFirst => "is_first", 0, 0;
    IsLast => "is_last", 0, 0;
    ItemParity => "item_parity", 0, 0;
    ItemParityCap => "item_parity_cap", 0, 0;
    IsOddItem => "is_odd_item", 0, 0;
    IsEvenItem => "is_even_item", 0, 0;
    ItemCycle => "item_cycle", 1, VARIADIC;
}

/// A name resolved through the [`BuiltInTable`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BuiltInRef {
    Regular(BuiltIn),
    LoopVar(LoopVarBuiltIn),
}

/// Immutable name to built-in table.
///
/// Built once per configuration and passed by reference to the parser.
/// Both the snake_case and the camelCase spelling of every name resolve.
#[derive(Clone, Debug)]
pub struct BuiltInTable {
    by_name: FxHashMap<String, BuiltInRef>,
}

impl BuiltInTable {
    pub fn new() -> Self {
        let mut by_name = FxHashMap::default();
        let entries = BuiltIn::ALL
            .iter()
            .map(|b| (b.name(), BuiltInRef::Regular(*b)))
            .chain(
                LoopVarBuiltIn::ALL
                    .iter()
                    .map(|b| (b.name(), BuiltInRef::LoopVar(*b))),
            );
        for (name, builtin) in entries {
            by_name.insert(snake_to_camel(name), builtin);
            by_name.insert(name.to_owned(), builtin);
        }
        BuiltInTable { by_name }
    }

    pub fn get(&self, name: &str) -> Option<BuiltInRef> {
        self.by_name.get(name).copied()
    }

    /// The known snake_case name closest to a misspelled one.
    pub fn suggest(&self, name: &str) -> Option<&'static str> {
        let wanted = camel_to_snake(name);
        BuiltIn::ALL
            .iter()
            .map(|b| b.name())
            .chain(LoopVarBuiltIn::ALL.iter().map(|b| b.name()))
            .map(|candidate| (edit_distance(&wanted, candidate), candidate))
            .filter(|(distance, _)| *distance <= 2)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, candidate)| candidate)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl Default for BuiltInTable {
    fn default() -> Self {
        Self::new()
    }
}

/// `upper_case` to `upperCase`.
pub fn snake_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// `upperCase` to `upper_case`.
pub fn camel_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut row = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            row[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(row[j] + 1);
        }
        prev = row;
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests;
