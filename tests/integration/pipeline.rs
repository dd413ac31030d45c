//! Server to client round trips without the runtime
//!
//! Each test parses a declaration, binds a constraint, streams the
//! selected data and decodes it on a client built from the constrained
//! declaration.

use std::sync::Arc;

use dapstream_engine::{Evaluator, FunctionRegistry};
use dapstream_foundation::Value;
use dapstream_language::parse_declaration;
use dapstream_model::{Cell, Dataset, MemorySource};
use dapstream_wire::{StreamMarshaller, StreamUnMarshaller};

const DECL: &str = "\
Dataset {
    Int16 a[4];
    Sequence {
        String name;
        Int32 age;
    } people;
} D;
";

fn server() -> (Dataset, Evaluator) {
    let dataset = parse_declaration(DECL).unwrap();
    let evaluator = Evaluator::new(Arc::new(FunctionRegistry::with_builtins()));
    (dataset, evaluator)
}

fn source() -> MemorySource {
    let row = |name: &str, age: i32| vec![Cell::from(Value::Str(name.into())), Cell::from(Value::Int32(age))];
    MemorySource::new()
        .with_array("a", [10, 20, 30, 40].map(Value::Int16).to_vec())
        .with_rows("people", vec![row("Ann", 30), row("Bo", 5), row("Cy", 12)])
}

fn respond(constraint: &str) -> (Dataset, Vec<u8>) {
    let (mut dataset, mut evaluator) = server();
    evaluator.parse_constraint(constraint, &mut dataset).unwrap();
    let mut m = StreamMarshaller::new(Vec::new());
    dataset
        .serialize(&mut m, &evaluator, &mut source(), true)
        .unwrap();
    (dataset, m.into_inner())
}

fn client_for(server: &Dataset) -> Dataset {
    parse_declaration(&server.print_constrained()).unwrap()
}

// =============================================================================
// Arrays
// =============================================================================

#[test]
fn array_hyperslab_reaches_the_client() {
    let (dataset, bytes) = respond("a[1:3]");
    assert_eq!(bytes, vec![0, 0, 0, 3, 0, 20, 0, 30, 0, 40]);

    let mut client = client_for(&dataset);
    assert_eq!(client.variables().len(), 1);
    client
        .deserialize(&mut StreamUnMarshaller::new(bytes.as_slice()))
        .unwrap();
    let a = client.lookup("a").unwrap().as_array().unwrap();
    assert_eq!(a.length(), Some(3));
    assert_eq!(a.values(), &[20, 30, 40].map(Value::Int16));
}

#[test]
fn strided_slice() {
    let (_, bytes) = respond("a[0:2:3]");
    assert_eq!(bytes, vec![0, 0, 0, 2, 0, 10, 0, 30]);
}

// =============================================================================
// Tables
// =============================================================================

#[test]
fn selection_filters_rows() {
    let (dataset, bytes) = respond("people&people.age>10");
    let expected: Vec<u8> = vec![
        0x5A, 0, 0, 0, 3, b'A', b'n', b'n', 0, 0, 0, 30, //
        0x5A, 0, 0, 0, 2, b'C', b'y', 0, 0, 0, 12, //
        0xA5,
    ];
    assert_eq!(bytes, expected);

    let mut client = client_for(&dataset);
    client
        .deserialize(&mut StreamUnMarshaller::new(bytes.as_slice()))
        .unwrap();
    let people = client.lookup("people").unwrap().as_table().unwrap();
    assert_eq!(people.length(), Some(2));
    assert!(!people.instance_error());
    let names: Vec<String> = people
        .instances()
        .iter()
        .map(|row| row[0].value_text())
        .collect();
    assert_eq!(names, vec!["\"Ann\"", "\"Cy\""]);
}

#[test]
fn selection_without_projection_sends_everything_else_whole() {
    let (_, bytes) = respond("&people.name=\"Bo\"");
    // full array, then the single matching row
    assert_eq!(&bytes[..12], &[0, 0, 0, 4, 0, 10, 0, 20, 0, 30, 0, 40]);
    assert_eq!(&bytes[12..], &[0x5A, 0, 0, 0, 2, b'B', b'o', 0, 0, 0, 5, 0xA5]);
}

#[test]
fn truncated_stream_flags_the_table() {
    let (dataset, bytes) = respond("people");
    let cut = &bytes[..bytes.len() - 6];

    let mut client = client_for(&dataset);
    let people = client.lookup_mut("people").unwrap().as_table_mut().unwrap();
    let mut um = StreamUnMarshaller::new(cut);
    assert!(people.deserialize_row(&mut um));
    assert!(people.deserialize_row(&mut um));
    assert!(!people.deserialize_row(&mut um));
    assert!(people.instance_error());
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn malformed_constraint_changes_nothing() {
    let (mut dataset, mut evaluator) = server();
    evaluator
        .parse_constraint("people&people.age>10", &mut dataset)
        .unwrap();
    let before = dataset.clone();

    assert!(evaluator.parse_constraint("a[1:9]&nope>1", &mut dataset).is_err());
    assert_eq!(dataset, before);
    assert_eq!(evaluator.clauses().len(), 1);

    let mut m = StreamMarshaller::new(Vec::new());
    dataset
        .serialize(&mut m, &evaluator, &mut source(), true)
        .unwrap();
    assert_eq!(m.into_inner().last(), Some(&0xA5));
}

#[test]
fn second_clause_after_a_value_clause() {
    let (mut dataset, mut evaluator) = server();
    evaluator.parse_constraint("length(a)", &mut dataset).unwrap();
    assert!(evaluator.evaluate_value(&dataset).unwrap().is_some());

    evaluator
        .parse_constraint("&people.age>10", &mut dataset)
        .unwrap();
    assert!(evaluator.functional_expression());
    assert!(evaluator.evaluate_value(&dataset).unwrap_err().is_internal());
}
