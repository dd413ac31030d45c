//! Integration tests for arrays and their constraints

use dapstream_foundation::{ErrorKind, Value};
use dapstream_model::Variable;
use proptest::prelude::*;

fn array(dims: &[usize]) -> Variable {
    let mut var = Variable::array("a", Variable::scalar("a", Value::Int16(0)));
    let array = var.as_array_mut().unwrap();
    for size in dims {
        array.append_dimension(*size, "").unwrap();
    }
    var
}

// =============================================================================
// Dimensions
// =============================================================================

#[test]
fn no_dimensions_means_unknown_length() {
    let a = array(&[]);
    assert_eq!(a.as_array().unwrap().length(), None);
}

#[test]
fn zero_size_dimension_is_rejected() {
    let mut a = array(&[]);
    assert!(a.as_array_mut().unwrap().append_dimension(0, "").is_err());
}

#[test]
fn constraint_narrows_one_dimension() {
    let mut a = array(&[4]);
    let arr = a.as_array_mut().unwrap();
    arr.constrain_dimension(0, 1, 3, 1).unwrap();
    assert_eq!(arr.length(), Some(3));
    assert_eq!(arr.full_length(), Some(4));
    arr.reset_constraints();
    assert_eq!(arr.length(), Some(4));
}

#[test]
fn invalid_constraints_are_rejected() {
    let mut a = array(&[4]);
    let arr = a.as_array_mut().unwrap();
    for (start, stop, stride) in [(2, 1, 1), (0, 4, 1), (0, 3, 0)] {
        let err = arr.constrain_dimension(0, start, stop, stride).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidConstraint(_)));
    }
    assert!(arr.constrain_dimension(1, 0, 0, 1).is_err());
    assert_eq!(arr.length(), Some(4));
}

#[test]
fn values_must_match_length_and_kind() {
    let mut a = array(&[3]);
    let arr = a.as_array_mut().unwrap();
    assert!(arr.set_values(vec![Value::Int16(1); 2]).is_err());
    let err = arr.set_values(vec![Value::Int32(1); 3]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
    arr.set_values(vec![Value::Int16(1); 3]).unwrap();
    assert_eq!(arr.element_count(), 3);
}

#[test]
fn extracts_constrained_elements() {
    let mut a = array(&[2, 3]);
    let arr = a.as_array_mut().unwrap();
    arr.constrain_dimension(1, 0, 2, 2).unwrap();
    let full: Vec<Value> = (0..6).map(Value::Int16).collect();
    assert_eq!(
        arr.extract_constrained(&full).unwrap(),
        vec![Value::Int16(0), Value::Int16(2), Value::Int16(3), Value::Int16(5)]
    );
}

proptest! {
    #[test]
    fn length_is_product_of_constrained_extents(
        dims in prop::collection::vec((1usize..6, 0usize..6, 1usize..3), 1..4)
    ) {
        let sizes: Vec<usize> = dims.iter().map(|d| d.0).collect();
        let mut a = array(&sizes);
        let arr = a.as_array_mut().unwrap();
        let mut expected = 1;
        for (index, (size, start, stride)) in dims.iter().copied().enumerate() {
            let start = start.min(size - 1);
            arr.constrain_dimension(index, start, size - 1, stride).unwrap();
            expected *= (size - 1 - start) / stride + 1;
        }
        prop_assert_eq!(arr.length(), Some(expected));
        prop_assert_eq!(arr.constrained_offsets().len(), expected);
    }
}
