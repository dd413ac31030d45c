//! Integration tests for binding constraint text to a dataset
//!
//! Tests projection marking, constant typing, and that a failed bind
//! leaves both the evaluator and the dataset untouched.

use std::sync::Arc;

use dapstream_engine::{Clause, Evaluator, FunctionRegistry, Operand};
use dapstream_foundation::{ErrorKind, Value};
use dapstream_language::parse_declaration;
use dapstream_model::Dataset;

const DECL: &str = "\
Dataset {
    Int16 a[4];
    Float64 grid[y = 3][x = 5];
    Sequence {
        String name;
        Int32 age;
    } people;
} D;
";

fn dataset() -> Dataset {
    parse_declaration(DECL).unwrap()
}

fn evaluator() -> Evaluator {
    Evaluator::new(Arc::new(FunctionRegistry::with_builtins()))
}

fn constant_of(ev: &Evaluator, clause: usize) -> Value {
    let Clause::Relational { rhs, .. } = &ev.clauses()[clause] else {
        panic!("expected a relation");
    };
    let Operand::Constant(id) = rhs[0] else {
        panic!("expected a constant");
    };
    ev.constant(id).unwrap().value().unwrap().clone()
}

// =============================================================================
// Projection
// =============================================================================

#[test]
fn empty_projection_selects_everything() {
    let mut ds = dataset();
    evaluator().parse_constraint("&people.age>1", &mut ds).unwrap();
    assert!(ds.variables().iter().all(|v| v.is_selected()));
    assert!(ds.lookup("people.name").unwrap().is_selected());
}

#[test]
fn array_slice_narrows_dimensions() {
    let mut ds = dataset();
    evaluator().parse_constraint("a[1:3]", &mut ds).unwrap();
    let a = ds.lookup("a").unwrap().as_array().unwrap();
    assert_eq!(a.length(), Some(3));
    assert!(!ds.lookup("grid").unwrap().is_selected());
    assert_eq!(ds.print_constrained(), "Dataset {\n    Int16 a[3];\n} D;\n");
}

#[test]
fn leading_dimensions_only() {
    let mut ds = dataset();
    evaluator().parse_constraint("grid[0:2:2]", &mut ds).unwrap();
    let grid = ds.lookup("grid").unwrap().as_array().unwrap();
    assert_eq!(grid.length(), Some(2 * 5));
}

#[test]
fn selected_column_keeps_table() {
    let mut ds = dataset();
    evaluator().parse_constraint("people.age", &mut ds).unwrap();
    assert!(ds.lookup("people").unwrap().is_selected());
    assert!(!ds.lookup("people.name").unwrap().is_selected());
}

// =============================================================================
// Constants
// =============================================================================

#[test]
fn literal_typing() {
    let mut ev = evaluator();
    ev.parse_constraint(
        "&people.age=7&people.age=3000000000&people.age=10000000000000000000&people.age=1.5&people.name=\"Ann\"",
        &mut dataset(),
    )
    .unwrap();
    assert_eq!(constant_of(&ev, 0), Value::Int32(7));
    assert_eq!(constant_of(&ev, 1), Value::Int64(3_000_000_000));
    assert_eq!(constant_of(&ev, 2), Value::UInt64(10_000_000_000_000_000_000));
    assert_eq!(constant_of(&ev, 3), Value::Float64(1.5));
    assert_eq!(constant_of(&ev, 4), Value::Str("Ann".into()));
}

#[test]
fn literal_too_big_for_any_kind() {
    let err = evaluator()
        .parse_constraint("&people.age=100000000000000000000", &mut dataset())
        .unwrap_err();
    assert!(err.is_parse_error());
}

// =============================================================================
// Atomicity
// =============================================================================

#[test]
fn failed_bind_leaves_everything_unchanged() {
    let mut ds = dataset();
    let mut ev = evaluator();
    ev.parse_constraint("a&people.age>10", &mut ds).unwrap();
    let before = ds.clone();

    for text in [
        "a[0:9]",
        "grid[0][0][0]",
        "missing",
        "&people.height>1",
        "a,b[1:2",
        "&people.age=\"x\"&unknown(a)",
    ] {
        assert!(ev.parse_constraint(text, &mut ds).is_err(), "{text}");
        assert_eq!(ev.clauses().len(), 1, "{text}");
        assert_eq!(ds, before, "{text}");
    }
}

#[test]
fn bind_errors_have_kinds() {
    let kind = |text: &str| evaluator().parse_constraint(text, &mut dataset()).unwrap_err().kind;
    assert!(matches!(kind("nope"), ErrorKind::UndefinedVariable(_)));
    assert!(matches!(kind("a[7]"), ErrorKind::InvalidConstraint(_)));
    assert!(matches!(kind("people[0]"), ErrorKind::InvalidConstraint(_)));
    assert!(matches!(kind("&a>"), ErrorKind::ParseError { .. }));
}

#[test]
fn successive_binds_accumulate_clauses() {
    let mut ds = dataset();
    let mut ev = evaluator();
    ev.parse_constraint("&people.age>1", &mut ds).unwrap();
    ev.parse_constraint("&people.age<9", &mut ds).unwrap();
    assert_eq!(ev.clauses().len(), 2);
    assert_eq!(ev.referenced_paths(), vec!["people.age"]);
}
