use super::*;
use pretty_assertions::assert_eq;

#[test]
fn invalid_reference_message_names_the_expression() {
    let error = TemplateError::invalid_reference("user.name");
    assert_eq!(
        error.message,
        "The following has evaluated to null or missing:\n==> user.name"
    );
    assert_eq!(error.blamed.as_deref(), Some("user.name"));
    assert!(error.is_invalid_reference());
    assert_eq!(error.tips.len(), 1);
}

#[test]
fn fast_invalid_reference_has_no_message() {
    let error = TemplateError::fast_invalid_reference();
    assert!(error.message.is_empty());
    assert_eq!(error.kind, TemplateErrorKind::InvalidReference { fast: true });
}

#[test]
fn type_mismatch_describes_the_accepted_set() {
    let error = TemplateError::type_mismatch(
        Capabilities::STRING | Capabilities::NUMBER,
        "a sequence",
        "xs",
    );
    assert_eq!(
        error.message,
        "Expected a string or number, but this has evaluated to a sequence:\n==> xs"
    );
    let error = TemplateError::type_mismatch(Capabilities::HASH_EX, "a number", "n");
    assert!(error.message.starts_with("Expected an extended hash"));
}

#[test]
fn recoverability() {
    assert!(TemplateError::custom("x").is_recoverable());
    assert!(TemplateError::arithmetic(ArithmeticError::DivisionByZero).is_recoverable());
    assert!(!TemplateError::bug("x").is_recoverable());
    assert!(!TemplateError::stopped(None).is_recoverable());
    assert!(!TemplateError::interrupted().is_recoverable());
}

#[test]
fn display_includes_tips_and_stack() {
    let mut error = TemplateError::custom("Boom");
    error.stack = vec![
        StackEntry {
            description: "${...}".to_owned(),
            pos: SourcePos { line: 2, column: 3 },
        },
        StackEntry {
            description: "#list".to_owned(),
            pos: SourcePos { line: 1, column: 1 },
        },
    ];
    assert_eq!(
        error.to_string(),
        "Boom\n\nFTL stack trace:\n  - Failed at: ${...}  [line 2, column 3]\n  \
         - Reached through: #list  [line 1, column 1]"
    );
}

#[test]
fn display_without_stack_shows_position() {
    let mut error = TemplateError::custom("Boom");
    error.pos = Some(SourcePos { line: 4, column: 7 });
    assert_eq!(error.to_string(), "Boom\n\n  at line 4, column 7");
}

mod render_error {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn stop_and_interrupt_map_to_their_variants() {
        let stopped = RenderError::from(TemplateError::stopped(Some("halt".to_owned())));
        assert_eq!(stopped.to_string(), "template processing was stopped: halt");
        let stopped = RenderError::from(TemplateError::stopped(None));
        assert_eq!(stopped.to_string(), "template processing was stopped");
        assert!(matches!(
            RenderError::from(TemplateError::interrupted()),
            RenderError::Interrupted
        ));
        assert!(matches!(
            RenderError::from(TemplateError::custom("x")),
            RenderError::Template(_)
        ));
    }
}
