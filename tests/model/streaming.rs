//! Integration tests for streaming serialization and decoding
//!
//! Tests the read hook, byte layouts, table framing, and the decoder's
//! handling of broken row streams.

use dapstream_foundation::{Error, ErrorKind, Result, Value};
use dapstream_model::{Cell, DataSource, Dataset, MemorySource, NoSelection, Table, Variable};
use dapstream_wire::{StreamMarshaller, StreamUnMarshaller};
use proptest::prelude::*;

fn encode(ds: &mut Dataset, source: &mut dyn DataSource) -> Vec<u8> {
    let mut m = StreamMarshaller::new(Vec::new());
    ds.serialize(&mut m, &NoSelection, source, false).unwrap();
    m.into_inner()
}

fn station() -> Dataset {
    let mut readings = Variable::array("readings", Variable::scalar("readings", Value::Int16(0)));
    readings
        .as_array_mut()
        .unwrap()
        .append_dimension(4, "time")
        .unwrap();
    let site = Variable::record("site")
        .with_child(Variable::scalar("id", Value::UInt32(0)))
        .unwrap()
        .with_child(Variable::scalar("label", Value::Str(String::new())))
        .unwrap();
    let mut ds = Dataset::new("station").with(site).with(readings);
    ds.mark_all(true);
    ds
}

fn station_source() -> MemorySource {
    MemorySource::new()
        .with_value("site.id", Value::UInt32(258))
        .with_value("site.label", Value::Str("K".into()))
        .with_array("readings", (1..=4).map(Value::Int16).collect())
}

fn people(rows: &[(&str, i32)]) -> (Dataset, MemorySource) {
    let people = Variable::table("people")
        .with_child(Variable::scalar("name", Value::Str(String::new())))
        .unwrap()
        .with_child(Variable::scalar("age", Value::Int32(0)))
        .unwrap();
    let rows = rows
        .iter()
        .map(|(n, a)| vec![Cell::from(Value::Str((*n).into())), Cell::from(Value::Int32(*a))])
        .collect();
    let mut ds = Dataset::new("D").with(people);
    ds.mark_all(true);
    (ds, MemorySource::new().with_rows("people", rows))
}

// =============================================================================
// Byte Layout
// =============================================================================

#[test]
fn records_then_arrays_in_order() {
    let bytes = encode(&mut station(), &mut station_source());
    let expected: Vec<u8> = vec![
        0, 0, 1, 2, // site.id
        0, 0, 0, 1, b'K', // site.label
        0, 0, 0, 4, // readings count
        0, 1, 0, 2, 0, 3, 0, 4, // readings
    ];
    assert_eq!(bytes, expected);
}

#[test]
fn constrained_array_sends_only_the_hyperslab() {
    let mut ds = station();
    ds.lookup_mut("readings")
        .unwrap()
        .as_array_mut()
        .unwrap()
        .constrain_dimension(0, 1, 3, 1)
        .unwrap();
    ds.mark("site", false).unwrap();
    let bytes = encode(&mut ds, &mut station_source());
    assert_eq!(bytes, vec![0, 0, 0, 3, 0, 2, 0, 3, 0, 4]);
}

#[test]
fn station_decodes_on_a_mirror() {
    let bytes = encode(&mut station(), &mut station_source());
    let mut client = station();
    client
        .deserialize(&mut StreamUnMarshaller::new(bytes.as_slice()))
        .unwrap();
    assert_eq!(client.lookup("site.id").unwrap().value(), Some(&Value::UInt32(258)));
    let readings = client.lookup("readings").unwrap().as_array().unwrap();
    assert_eq!(readings.values(), &[1, 2, 3, 4].map(Value::Int16));
    assert!(client.lookup("readings").unwrap().is_read());
}

#[test]
fn array_count_mismatch_is_framing_error() {
    let mut client = station();
    client
        .lookup_mut("readings")
        .unwrap()
        .as_array_mut()
        .unwrap()
        .constrain_dimension(0, 0, 1, 1)
        .unwrap();
    let bytes = encode(&mut station(), &mut station_source());
    let err = client
        .deserialize(&mut StreamUnMarshaller::new(bytes.as_slice()))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Framing(_)));
}

// =============================================================================
// Read Hook
// =============================================================================

/// Counts the no-timeout brackets around every read.
#[derive(Default)]
struct Bracketed {
    inner: MemorySource,
    open: usize,
    closed: usize,
}

impl DataSource for Bracketed {
    fn read(&mut self, dataset: &str, path: &str, var: &mut Variable) -> Result<()> {
        assert_eq!(self.open, self.closed + 1, "read outside a bracket");
        self.inner.read(dataset, path, var)
    }

    fn next_row(&mut self, dataset: &str, path: &str, table: &mut Table) -> Result<bool> {
        self.inner.next_row(dataset, path, table)
    }

    fn begin_no_timeout(&mut self) {
        self.open += 1;
    }

    fn end_no_timeout(&mut self) {
        self.closed += 1;
    }
}

#[test]
fn every_read_is_bracketed() {
    let mut source = Bracketed {
        inner: station_source(),
        ..Bracketed::default()
    };
    encode(&mut station(), &mut source);
    assert_eq!(source.open, 3);
    assert_eq!(source.closed, 3);
}

struct Failing;

impl DataSource for Failing {
    fn read(&mut self, _: &str, path: &str, _: &mut Variable) -> Result<()> {
        Err(Error::data_source(path, "device offline"))
    }

    fn next_row(&mut self, _: &str, path: &str, _: &mut Table) -> Result<bool> {
        Err(Error::data_source(path, "device offline"))
    }
}

#[test]
fn read_failure_names_the_variable() {
    let mut ds = station();
    let mut m = StreamMarshaller::new(Vec::new());
    let err = ds
        .serialize(&mut m, &NoSelection, &mut Failing, false)
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DataSource { ref variable, .. } if variable == "site.id"));
    assert!(m.into_inner().is_empty());
}

// =============================================================================
// Table Rows
// =============================================================================

#[test]
fn rows_are_framed_before_their_fields() {
    let (mut ds, mut source) = people(&[("Ann", 30)]);
    let bytes = encode(&mut ds, &mut source);
    assert_eq!(
        bytes,
        vec![0x5A, 0, 0, 0, 3, b'A', b'n', b'n', 0, 0, 0, 30, 0xA5]
    );
}

#[test]
fn empty_table_is_one_marker() {
    let (mut ds, mut source) = people(&[]);
    assert_eq!(encode(&mut ds, &mut source), vec![0xA5]);
    assert_eq!(ds.lookup("people").unwrap().as_table().unwrap().length(), Some(0));
}

#[test]
fn truncated_row_sets_instance_error() {
    let (mut ds, mut source) = people(&[("Ann", 30), ("Bo", 5)]);
    let bytes = encode(&mut ds, &mut source);
    let cut = &bytes[..bytes.len() - 3];

    let (mut client, _) = people(&[]);
    let table = client.lookup_mut("people").unwrap().as_table_mut().unwrap();
    let mut um = StreamUnMarshaller::new(cut);
    assert!(table.deserialize_row(&mut um));
    assert!(!table.instance_error());
    assert!(!table.deserialize_row(&mut um));
    assert!(table.instance_error());
}

#[test]
fn truncated_table_fails_whole_decode() {
    let (mut ds, mut source) = people(&[("Ann", 30)]);
    let bytes = encode(&mut ds, &mut source);
    let (mut client, _) = people(&[]);
    let err = client
        .deserialize(&mut StreamUnMarshaller::new(&bytes[..bytes.len() - 1]))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Framing(_)));
}

#[test]
fn stray_byte_at_row_boundary() {
    let (mut client, _) = people(&[]);
    let table = client.lookup_mut("people").unwrap().as_table_mut().unwrap();
    let mut um = StreamUnMarshaller::new(&[0x00u8][..]);
    assert!(!table.deserialize_row(&mut um));
    assert!(table.instance_error());
}

/// Serves `rows` rows whose only column is fetched through `read`.
struct Counter {
    rows: i16,
    row: i16,
}

impl DataSource for Counter {
    fn read(&mut self, _: &str, path: &str, var: &mut Variable) -> Result<()> {
        let array = var
            .as_array_mut()
            .ok_or_else(|| Error::data_source(path, "not an array"))?;
        array.set_values(vec![Value::Int16(self.row)])
    }

    fn next_row(&mut self, _: &str, _: &str, _: &mut Table) -> Result<bool> {
        self.row += 1;
        Ok(self.row <= self.rows)
    }
}

#[test]
fn columns_are_read_again_for_every_row() {
    let mut a = Variable::array("a", Variable::scalar("a", Value::Int16(0)));
    a.as_array_mut().unwrap().append_dimension(1, "").unwrap();
    let mut ds = Dataset::new("D").with(Variable::table("t").with_child(a).unwrap());
    ds.mark_all(true);
    let bytes = encode(&mut ds, &mut Counter { rows: 2, row: 0 });
    assert_eq!(
        bytes,
        vec![0x5A, 0, 0, 0, 1, 0, 1, 0x5A, 0, 0, 0, 1, 0, 2, 0xA5]
    );
}

proptest! {
    #[test]
    fn decoded_row_count_matches_sent(ages in prop::collection::vec(0i32..120, 0..20)) {
        let names: Vec<String> = (0..ages.len()).map(|i| format!("p{i}")).collect();
        let rows: Vec<(&str, i32)> = names.iter().map(String::as_str).zip(ages.iter().copied()).collect();
        let (mut ds, mut source) = people(&rows);
        let bytes = encode(&mut ds, &mut source);

        let markers = bytes.iter().filter(|b| **b == 0xA5).count();
        prop_assert!(markers >= 1);

        let (mut client, _) = people(&[]);
        client.deserialize(&mut StreamUnMarshaller::new(bytes.as_slice())).unwrap();
        let table = client.lookup("people").unwrap().as_table().unwrap();
        prop_assert_eq!(table.length(), Some(ages.len()));
        let decoded: Vec<Option<&Value>> = table.instances().iter().map(|r| r[1].value()).collect();
        let sent: Vec<Value> = ages.iter().copied().map(Value::Int32).collect();
        prop_assert_eq!(decoded, sent.iter().map(Some).collect::<Vec<_>>());
    }
}
