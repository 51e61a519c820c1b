use super::*;
use pretty_assertions::assert_eq;

#[test]
fn both_spellings_resolve() {
    let table = BuiltInTable::new();
    assert_eq!(
        table.get("upper_case"),
        Some(BuiltInRef::Regular(BuiltIn::UpperCase))
    );
    assert_eq!(
        table.get("upperCase"),
        Some(BuiltInRef::Regular(BuiltIn::UpperCase))
    );
    assert_eq!(
        table.get("has_next"),
        Some(BuiltInRef::LoopVar(LoopVarBuiltIn::HasNext))
    );
    assert_eq!(table.get("noEsc"), Some(BuiltInRef::Regular(BuiltIn::NoEsc)));
    assert_eq!(table.get("no_such_thing"), None);
}

#[test]
fn names_are_unique() {
    let table = BuiltInTable::new();
    let total = BuiltIn::ALL.len() + LoopVarBuiltIn::ALL.len();
    // Single-word names have identical spellings.
    let single_word = BuiltIn::ALL
        .iter()
        .map(|b| b.name())
        .chain(LoopVarBuiltIn::ALL.iter().map(|b| b.name()))
        .filter(|n| !n.contains('_'))
        .count();
    assert_eq!(table.len(), total * 2 - single_word);
}

#[test]
fn suggestion_for_typo() {
    let table = BuiltInTable::new();
    assert_eq!(table.suggest("uper_case"), Some("upper_case"));
    assert_eq!(table.suggest("lenght"), Some("length"));
    assert_eq!(table.suggest("qqqqqqqq"), None);
}

#[test]
fn case_conversion() {
    assert_eq!(snake_to_camel("keep_before_last"), "keepBeforeLast");
    assert_eq!(camel_to_snake("isoUtc"), "iso_utc");
    assert_eq!(camel_to_snake("c"), "c");
}

#[test]
fn arity_and_targets() {
    assert_eq!(BuiltIn::Replace.arity(), (2, 3));
    assert_eq!(BuiltIn::Default.arity().1, VARIADIC);
    assert!(BuiltIn::UpperCase.target().contains(Capabilities::STRING));
    assert!(!BuiltIn::UpperCase.target().contains(Capabilities::MARKUP));
    assert!(BuiltIn::HasContent.accepts_missing_target());
    assert!(BuiltIn::Html.is_legacy_escaping());
}
