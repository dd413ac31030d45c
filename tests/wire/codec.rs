//! Integration tests for primitive encoding
//!
//! Tests byte order, widths, length prefixes, and decode guards.

use dapstream_foundation::{ErrorKind, TypeKind, Value};
use dapstream_wire::{Marshaller, StreamMarshaller, StreamUnMarshaller, UnMarshaller};
use proptest::prelude::*;

fn encode_value(value: &Value) -> Vec<u8> {
    let mut m = StreamMarshaller::new(Vec::new());
    m.put_value(value).unwrap();
    m.into_inner()
}

// =============================================================================
// Encoding
// =============================================================================

#[test]
fn fixed_widths_match_kinds() {
    for kind in TypeKind::SCALARS {
        let Some(width) = kind.wire_width() else {
            continue;
        };
        let zero = Value::zero(kind).unwrap();
        assert_eq!(encode_value(&zero).len(), width, "{kind:?}");
    }
}

#[test]
fn floats_are_big_endian_bits() {
    assert_eq!(encode_value(&Value::Float32(1.0)), vec![0x3F, 0x80, 0, 0]);
    assert_eq!(
        encode_value(&Value::Float64(-2.0)),
        vec![0xC0, 0, 0, 0, 0, 0, 0, 0]
    );
}

#[test]
fn urls_encode_like_strings() {
    assert_eq!(
        encode_value(&Value::Url("h".into())),
        encode_value(&Value::Str("h".into()))
    );
}

#[test]
fn counts_are_u32() {
    let mut m = StreamMarshaller::new(Vec::new());
    m.put_length(3).unwrap();
    assert_eq!(m.bytes_written(), 4);
    assert_eq!(m.into_inner(), vec![0, 0, 0, 3]);
}

// =============================================================================
// Byte Budget
// =============================================================================

#[test]
fn budget_allows_exact_fit() {
    let mut m = StreamMarshaller::new(Vec::new()).with_limit(Some(8));
    m.put_int64(1).unwrap();
    let err = m.put_byte(0).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ResponseTooBig { limit: 8 }));
    assert_eq!(m.into_inner().len(), 8);
}

// =============================================================================
// Decoding
// =============================================================================

#[test]
fn short_input_is_io_error() {
    let mut um = StreamUnMarshaller::new(&[0u8, 1][..]);
    let err = um.get_int32().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Io(_)));
}

#[test]
fn oversized_string_prefix_is_framing_error() {
    let mut um = StreamUnMarshaller::new(&[0u8, 0, 1, 0, b'x'][..]).with_max_string_len(16);
    let err = um.get_str().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Framing(_)));
}

#[test]
fn invalid_utf8_is_framing_error() {
    let mut um = StreamUnMarshaller::new(&[0u8, 0, 0, 1, 0xFF][..]);
    assert!(matches!(um.get_str().unwrap_err().kind, ErrorKind::Framing(_)));
}

#[test]
fn consumed_bytes_are_counted() {
    let bytes = encode_value(&Value::Str("abc".into()));
    let mut um = StreamUnMarshaller::new(bytes.as_slice());
    um.get_value(TypeKind::String).unwrap();
    assert_eq!(um.bytes_read(), 7);
}

proptest! {
    #[test]
    fn int64_decodes_to_itself(v: i64) {
        let bytes = encode_value(&Value::Int64(v));
        let mut um = StreamUnMarshaller::new(bytes.as_slice());
        prop_assert_eq!(um.get_value(TypeKind::Int64).unwrap(), Value::Int64(v));
    }

    #[test]
    fn text_decodes_to_itself(s in "\\PC{0,40}") {
        let bytes = encode_value(&Value::Str(s.clone()));
        prop_assert_eq!(bytes.len(), 4 + s.len());
        let mut um = StreamUnMarshaller::new(bytes.as_slice());
        prop_assert_eq!(um.get_str().unwrap(), s);
    }
}
