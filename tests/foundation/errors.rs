//! Integration tests for Error types
//!
//! Tests error construction, display, context, and error kinds.

use strata_foundation::{Error, ErrorContext, ErrorKind, GraphId, SemanticLimit};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_invalid_rule() {
    let err = Error::invalid_rule("trans", "head functor in body position");
    assert!(matches!(err.kind, ErrorKind::InvalidRule { .. }));
    assert!(err.is_rule_error());
    assert!(!err.is_parse_error());
    let msg = format!("{err}");
    assert!(msg.contains("trans"));
    assert!(msg.contains("head functor"));
}

#[test]
fn error_unbound_variable() {
    let err = Error::unbound_variable("r1", "?z");
    assert!(err.is_rule_error());
    assert_eq!(format!("{err}"), "unbound variable ?z in rule r1");
}

#[test]
fn error_store_and_unknown_graph() {
    let err = Error::store("disk full");
    assert!(matches!(err.kind, ErrorKind::Store(_)));
    assert!(format!("{err}").contains("disk full"));

    let err = Error::unknown_graph(GraphId::new(7));
    assert!(matches!(err.kind, ErrorKind::UnknownGraph(id) if id.index() == 7));
}

#[test]
fn error_limits() {
    let err = Error::limit_exceeded(SemanticLimit::MaxRounds { limit: 3 });
    assert_eq!(format!("{err}"), "limit exceeded: max rounds (3) exceeded");

    let err = Error::limit_exceeded(SemanticLimit::MaxDerivations {
        limit: 10,
        context: Some("rule trans".into()),
    });
    assert_eq!(
        format!("{err}"),
        "limit exceeded: max derivations (10) exceeded: rule trans"
    );
}

#[test]
fn parse_error_display_has_position() {
    let err = Error::new(ErrorKind::ParseError {
        message: "expected ')'".into(),
        line: 4,
        column: 12,
        context: "[r: (?x ex:p ?y -> ".into(),
    });
    assert!(err.is_parse_error());
    assert_eq!(format!("{err}"), "parse error at 4:12: expected ')'");
}

// =============================================================================
// Error Context
// =============================================================================

#[test]
fn context_display() {
    let ctx = ErrorContext::new()
        .with_source("family.rules")
        .with_position(3, 9)
        .with_frame("round 2");
    let shown = format!("{ctx}");
    assert!(shown.starts_with("at family.rules:3:9"));
    assert!(shown.contains("  in round 2"));
}

#[test]
fn frames_accumulate_in_order() {
    let err = Error::store("boom").with_frame("rule trans").with_frame("round 3");
    let ctx = err.context.expect("frames create a context");
    assert_eq!(ctx.stack, vec!["rule trans", "round 3"]);
    assert!(ctx.source.is_none());
}

#[test]
fn with_context_replaces_context() {
    let err = Error::store("boom")
        .with_frame("old")
        .with_context(ErrorContext::new().with_source("x.facts"));
    let ctx = err.context.unwrap();
    assert!(ctx.stack.is_empty());
    assert_eq!(ctx.source.as_deref(), Some("x.facts"));
}
