//! Integration tests for Error types
//!
//! Tests error construction, display, context, and error kinds.

use dapstream_foundation::{Error, ErrorContext, ErrorKind, TypeKind};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_type_mismatch() {
    let err = Error::type_mismatch(TypeKind::Int32, TypeKind::String);
    assert!(matches!(
        err.kind,
        ErrorKind::TypeMismatch {
            expected: TypeKind::Int32,
            actual: TypeKind::String
        }
    ));
    let msg = format!("{err}");
    assert!(msg.contains("Int32"));
    assert!(msg.contains("String"));
}

#[test]
fn error_undefined_variable() {
    let err = Error::undefined_variable("people.age");
    assert!(matches!(err.kind, ErrorKind::UndefinedVariable(_)));
    assert!(format!("{err}").contains("people.age"));
}

#[test]
fn error_undefined_function() {
    let err = Error::undefined_function("nofn");
    assert!(matches!(err.kind, ErrorKind::UndefinedFunction(_)));
    assert!(format!("{err}").contains("nofn"));
}

#[test]
fn error_data_source_names_variable() {
    let err = Error::data_source("grid", "disk on fire");
    let msg = format!("{err}");
    assert!(msg.contains("grid"));
    assert!(msg.contains("disk on fire"));
}

#[test]
fn error_predicates() {
    assert!(Error::parse("bad").is_parse_error());
    assert!(!Error::parse("bad").is_internal());
    assert!(Error::internal("oops").is_internal());
    assert!(!Error::framing("stray byte").is_parse_error());
}

// =============================================================================
// Error Display
// =============================================================================

#[test]
fn error_display_response_too_big() {
    let err = Error::new(ErrorKind::ResponseTooBig { limit: 1024 });
    assert!(format!("{err}").contains("1024"));
}

#[test]
fn error_display_semantics_lists_all() {
    let err = Error::new(ErrorKind::Semantics(vec![
        "first problem".to_string(),
        "second problem".to_string(),
    ]));
    let msg = format!("{err}");
    assert!(msg.contains("first problem"));
    assert!(msg.contains("second problem"));
}

#[test]
fn error_from_io() {
    let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read");
    let err: Error = io.into();
    assert!(matches!(err.kind, ErrorKind::Io(_)));
}

// =============================================================================
// Error Context
// =============================================================================

#[test]
fn error_context_builder() {
    let ctx = ErrorContext::new()
        .with_source("survey")
        .with_position(3, 7)
        .with_frame("people")
        .with_frame("people.age");
    assert_eq!(ctx.source.as_deref(), Some("survey"));
    assert_eq!(ctx.line, Some(3));
    assert_eq!(ctx.column, Some(7));
    assert_eq!(ctx.stack, vec!["people", "people.age"]);

    let shown = format!("{ctx}");
    assert!(shown.contains("survey:3:7"));
    assert!(shown.contains("in people.age"));
}

#[test]
fn error_with_context_keeps_kind() {
    let err = Error::framing("bad marker").with_context(ErrorContext::new().with_source("x"));
    assert!(matches!(err.kind, ErrorKind::Framing(_)));
    assert!(err.context.is_some());
}
