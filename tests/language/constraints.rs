//! Integration tests for the constraint parser
//!
//! Tests the projection and selection grammar and error positions.

use dapstream_foundation::{ErrorKind, RelOp};
use dapstream_language::{Operand, ProjectionItem, SelectionItem, Slice, parse_constraint};

// =============================================================================
// Projections
// =============================================================================

#[test]
fn projection_of_paths_and_calls() {
    let c = parse_constraint("people.name, grid[0:2:10][3], select(a)").unwrap();
    assert_eq!(c.projection.len(), 3);
    let ProjectionItem::Path { path, slices, .. } = &c.projection[1] else {
        panic!("expected a path");
    };
    assert_eq!(path, "grid");
    assert_eq!(slices[0], Slice { start: 0, stride: 2, stop: 10 });
    assert_eq!(slices[1], Slice::index(3));
    assert!(matches!(&c.projection[2], ProjectionItem::Call(call) if call.name == "select"));
}

#[test]
fn whitespace_is_insignificant() {
    let a = parse_constraint("a,b&x>1").unwrap();
    let b = parse_constraint(" a , b\n & x > 1 ").unwrap();
    assert_eq!(a.projection.len(), b.projection.len());
    assert_eq!(a.selection.len(), b.selection.len());
}

// =============================================================================
// Selections
// =============================================================================

#[test]
fn every_operator_parses() {
    for (text, op) in [
        ("=", RelOp::Equal),
        ("!=", RelOp::NotEqual),
        ("<", RelOp::Less),
        ("<=", RelOp::LessEqual),
        (">", RelOp::Greater),
        (">=", RelOp::GreaterEqual),
        ("=~", RelOp::Regexp),
    ] {
        let c = parse_constraint(&format!("&x{text}1")).unwrap();
        assert!(
            matches!(&c.selection[0], SelectionItem::Relation { op: parsed, .. } if *parsed == op),
            "{text}"
        );
    }
}

#[test]
fn operands_of_each_kind() {
    let c = parse_constraint(r#"&x={1, 2.5, "s", y, length(z)}"#).unwrap();
    let SelectionItem::Relation { rhs, .. } = &c.selection[0] else {
        panic!("expected a relation");
    };
    assert!(matches!(rhs[0], Operand::Integer(1, _)));
    assert!(matches!(rhs[1], Operand::Float(f, _) if (f - 2.5).abs() < f64::EPSILON));
    assert!(matches!(&rhs[2], Operand::Str(s, _) if s == "s"));
    assert!(matches!(&rhs[3], Operand::Path(p, _) if p == "y"));
    assert!(matches!(&rhs[4], Operand::Call(call) if call.name == "length"));
}

#[test]
fn clauses_keep_source_order() {
    let c = parse_constraint("&a>1&match(b,\"x\")&c<2").unwrap();
    assert_eq!(c.selection.len(), 3);
    assert!(matches!(c.selection[1], SelectionItem::Call(_)));
}

// =============================================================================
// Errors
// =============================================================================

fn position(source: &str) -> (u32, u32) {
    match parse_constraint(source).unwrap_err().kind {
        ErrorKind::ParseError { line, column, .. } => (line, column),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unbalanced_delimiters_are_located() {
    assert_eq!(position("a,b[1:2"), (1, 4));
    assert_eq!(position("&x={1,2"), (1, 4));
    assert_eq!(position("f(a"), (1, 2));
}

#[test]
fn error_context_is_the_source_line() {
    let err = parse_constraint("a\n&x >>").unwrap_err();
    let ErrorKind::ParseError { line, context, .. } = err.kind else {
        panic!("expected a parse error");
    };
    assert_eq!(line, 2);
    assert_eq!(context, "&x >>");
}

#[test]
fn malformed_numbers_are_rejected() {
    assert!(parse_constraint("&x>1e").is_err());
    assert!(parse_constraint("a[99999999999999999999999999999999999999999]").is_err());
}
