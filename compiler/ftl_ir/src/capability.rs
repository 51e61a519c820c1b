//! Capability sets of runtime values.

use bitflags::bitflags;

bitflags! {
    /// The facets a value can expose.
    ///
    /// A single value may have several (a host object can be both a hash and
    /// a string). Built-ins and operators state the set they accept, and a
    /// value lacking every one of them produces a type-mismatch error that
    /// names the set.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct Capabilities: u16 {
        const STRING = 1;
        const NUMBER = 1 << 1;
        const BOOLEAN = 1 << 2;
        const DATE = 1 << 3;
        const HASH = 1 << 4;
        /// Hash whose keys and values can be listed.
        const HASH_EX = 1 << 5;
        const SEQUENCE = 1 << 6;
        /// One-shot iterable.
        const COLLECTION = 1 << 7;
        const METHOD = 1 << 8;
        const DIRECTIVE = 1 << 9;
        const MARKUP = 1 << 10;
    }
}

impl Capabilities {
    /// Anything that can be converted to a string by interpolation.
    pub const STRINGABLE: Capabilities = Capabilities::STRING
        .union(Capabilities::NUMBER)
        .union(Capabilities::DATE)
        .union(Capabilities::BOOLEAN)
        .union(Capabilities::MARKUP);

    /// Anything `#list` can iterate.
    pub const LISTABLE: Capabilities = Capabilities::SEQUENCE
        .union(Capabilities::COLLECTION)
        .union(Capabilities::HASH_EX);

    /// Human-readable description: `"string or number"`.
    pub fn describe(self) -> String {
        const NAMES: [(Capabilities, &str); 11] = [
            (Capabilities::STRING, "string"),
            (Capabilities::NUMBER, "number"),
            (Capabilities::BOOLEAN, "boolean"),
            (Capabilities::DATE, "date"),
            (Capabilities::HASH, "hash"),
            (Capabilities::HASH_EX, "extended hash"),
            (Capabilities::SEQUENCE, "sequence"),
            (Capabilities::COLLECTION, "collection"),
            (Capabilities::METHOD, "method"),
            (Capabilities::DIRECTIVE, "directive"),
            (Capabilities::MARKUP, "markup output"),
        ];
        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(cap, _)| self.contains(*cap))
            .map(|(_, name)| *name)
            .collect();
        match names.as_slice() {
            [] => "nothing".to_owned(),
            [one] => (*one).to_owned(),
            [init @ .., last] => format!("{} or {last}", init.join(", ")),
        }
    }
}
