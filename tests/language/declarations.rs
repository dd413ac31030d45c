//! Integration tests for the declaration parser
//!
//! Tests parsing of printed declarations and the round trip through
//! `Dataset::print_declaration`.

use dapstream_foundation::{TypeKind, Value};
use dapstream_language::parse_declaration;
use dapstream_model::{Dataset, Variable};

const SURVEY: &str = "\
Dataset {
    Float32 air%20temp;
    Structure {
        Float64 lat;
        Float64 lon;
    } location;
    Sequence {
        String name;
        Int32 age;
        Sequence {
            UInt16 day;
        } visits;
    } people;
    Url home;
    Byte grid[lat = 3][lon = 4];
} survey;
";

// =============================================================================
// Parsing
// =============================================================================

#[test]
fn every_kind_parses() {
    let ds = parse_declaration(SURVEY).unwrap();
    assert_eq!(ds.name(), "survey");
    assert_eq!(ds.variables().len(), 5);
    assert_eq!(ds.lookup("air temp").unwrap().type_kind(), TypeKind::Float32);
    assert_eq!(ds.lookup("location").unwrap().type_kind(), TypeKind::Record);
    assert_eq!(ds.lookup("home").unwrap().type_kind(), TypeKind::Url);
    let grid = ds.lookup("grid").unwrap().as_array().unwrap();
    assert_eq!(grid.length(), Some(12));
    assert_eq!(grid.dimension(1).unwrap().name, "lon");
}

#[test]
fn nested_sequences_get_levels() {
    let ds = parse_declaration(SURVEY).unwrap();
    let visits = ds.lookup("people.visits").unwrap().as_table().unwrap();
    assert_eq!(visits.level(), 1);
}

#[test]
fn parsed_variables_start_unread_and_unselected() {
    let ds = parse_declaration(SURVEY).unwrap();
    for var in ds.variables() {
        assert!(!var.is_read());
        assert!(!var.is_selected());
    }
}

#[test]
fn prints_back_identically() {
    let ds = parse_declaration(SURVEY).unwrap();
    assert_eq!(ds.print_declaration(), SURVEY);
}

#[test]
fn constrained_print_parses_as_a_client_mirror() {
    let mut ds = parse_declaration(SURVEY).unwrap();
    ds.mark("grid", true).unwrap();
    ds.lookup_mut("grid")
        .unwrap()
        .as_array_mut()
        .unwrap()
        .constrain_dimension(1, 1, 3, 2)
        .unwrap();
    let mirror = parse_declaration(&ds.print_constrained()).unwrap();
    assert_eq!(mirror.variables().len(), 1);
    assert_eq!(
        mirror.lookup("grid").unwrap().as_array().unwrap().length(),
        Some(6)
    );
}

#[test]
fn built_dataset_roundtrips() {
    let ds = Dataset::new("D")
        .with(Variable::scalar("x", Value::UInt64(0)))
        .with(
            Variable::record("r")
                .with_child(Variable::scalar("s", Value::Str(String::new())))
                .unwrap(),
        );
    let text = ds.print_declaration();
    assert_eq!(parse_declaration(&text).unwrap().print_declaration(), text);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn errors_carry_position() {
    let err = parse_declaration("Dataset {\n    Grid g;\n} D;\n").unwrap_err();
    assert!(err.is_parse_error());
    assert!(format!("{err}").contains("2:"));
}
