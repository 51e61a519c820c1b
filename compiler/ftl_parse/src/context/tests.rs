use super::*;

#[test]
fn flags_combine_and_clear() {
    let ctx = ParseContext::new()
        .with(ParseContext::IN_LOOP)
        .with(ParseContext::IN_MACRO);
    assert!(ctx.has(ParseContext::IN_LOOP));
    assert!(ctx.has(ParseContext::IN_MACRO.union(ParseContext::IN_FUNCTION)));
    assert!(!ctx.has(ParseContext::IN_SWITCH));

    let ctx = ctx.without(ParseContext::LOOP_FLAGS);
    assert!(!ctx.has(ParseContext::IN_LOOP));
    assert!(ctx.has(ParseContext::IN_MACRO));
}

#[test]
fn none_has_nothing() {
    assert!(!ParseContext::NONE.has(ParseContext::LOOP_FLAGS));
    assert_eq!(ParseContext::default(), ParseContext::NONE);
}
