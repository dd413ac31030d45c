//! The read hook through which the serializer fetches values.

use std::collections::HashMap;

use dapstream_foundation::{Error, Result, Value};

use crate::table::Table;
use crate::variable::{Body, Variable};

/// Supplies values to the serializer on demand.
///
/// `path` is the dotted path of the node inside its dataset. Reads happen
/// lazily: the serializer only asks for a node whose read flag is unset.
pub trait DataSource {
    /// Fills a scalar, array or record with its value.
    ///
    /// # Errors
    /// Any error aborts the response; nothing is written for the node.
    fn read(&mut self, dataset: &str, path: &str, var: &mut Variable) -> Result<()>;

    /// Loads the next row into the table's columns.
    ///
    /// Returns `Ok(false)` once the rows are exhausted.
    ///
    /// # Errors
    /// Any error aborts the response mid-stream.
    fn next_row(&mut self, dataset: &str, path: &str, table: &mut Table) -> Result<bool>;

    /// Called before a read that may block for a long time.
    fn begin_no_timeout(&mut self) {}

    /// Called after the read started by [`DataSource::begin_no_timeout`].
    fn end_no_timeout(&mut self) {}
}

/// One column value of an in-memory row.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    /// A scalar column.
    Value(Value),
    /// An array column, row-major over its full declared extent.
    Array(Vec<Value>),
    /// A record column, one cell per member.
    Record(Vec<Cell>),
    /// A nested table column holding its own rows.
    Rows(Vec<Vec<Cell>>),
}

impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

#[derive(Clone, Debug, Default)]
struct Cursor {
    rows: Vec<Vec<Cell>>,
    next: usize,
}

/// A [`DataSource`] backed by values held in memory, keyed by dotted path.
///
/// Arrays are stored at their full declared extent; the constrained
/// elements are extracted on read.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    values: HashMap<String, Value>,
    arrays: HashMap<String, Vec<Value>>,
    tables: HashMap<String, Cursor>,
    reads: usize,
}

impl MemorySource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a scalar value.
    #[must_use]
    pub fn with_value(mut self, path: impl Into<String>, value: Value) -> Self {
        self.values.insert(path.into(), value);
        self
    }

    /// Adds an array's values in row-major order over the full extent.
    #[must_use]
    pub fn with_array(mut self, path: impl Into<String>, values: Vec<Value>) -> Self {
        self.arrays.insert(path.into(), values);
        self
    }

    /// Adds the rows of a top-level table.
    #[must_use]
    pub fn with_rows(mut self, path: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        self.tables.insert(path.into(), Cursor { rows, next: 0 });
        self
    }

    /// Number of [`DataSource::read`] calls served.
    #[must_use]
    pub const fn read_count(&self) -> usize {
        self.reads
    }

    /// Rewinds every table to its first row.
    pub fn rewind(&mut self) {
        for cursor in self.tables.values_mut() {
            cursor.next = 0;
        }
    }

    fn load_cells(&mut self, path: &str, columns: &mut [Variable], cells: Vec<Cell>) -> Result<()> {
        if columns.len() != cells.len() {
            return Err(Error::data_source(
                path,
                format!("{} cells supplied for {} columns", cells.len(), columns.len()),
            ));
        }
        for (column, cell) in columns.iter_mut().zip(cells) {
            let column_path = format!("{path}.{}", column.name());
            self.load_cell(&column_path, column, cell)?;
        }
        Ok(())
    }

    fn load_cell(&mut self, path: &str, var: &mut Variable, cell: Cell) -> Result<()> {
        match cell {
            Cell::Value(value) => var
                .set_value(value)
                .map_err(|e| Error::data_source(path, e.to_string())),
            Cell::Array(full) => {
                let array = var
                    .as_array()
                    .ok_or_else(|| Error::data_source(path, "array cell for a non-array"))?;
                let picked = array.extract_constrained(&full)?;
                if let Some(array) = var.as_array_mut() {
                    array
                        .set_values(picked)
                        .map_err(|e| Error::data_source(path, e.to_string()))?;
                }
                var.set_read(true);
                Ok(())
            }
            Cell::Record(cells) => {
                let record = var
                    .as_record_mut()
                    .ok_or_else(|| Error::data_source(path, "record cell for a non-record"))?;
                let mut children: Vec<Variable> = record.iter().cloned().collect();
                self.load_cells(path, &mut children, cells)?;
                for (slot, child) in record.iter_mut().zip(children) {
                    *slot = child;
                }
                var.set_read(true);
                Ok(())
            }
            Cell::Rows(rows) => {
                if var.as_table().is_none() {
                    return Err(Error::data_source(path, "row cells for a non-table"));
                }
                self.tables.insert(path.to_string(), Cursor { rows, next: 0 });
                Ok(())
            }
        }
    }
}

impl DataSource for MemorySource {
    fn read(&mut self, _dataset: &str, path: &str, var: &mut Variable) -> Result<()> {
        self.reads += 1;
        match var.body() {
            Body::Scalar(_) => {
                let value = self
                    .values
                    .get(path)
                    .cloned()
                    .ok_or_else(|| Error::data_source(path, "no value held"))?;
                var.set_value(value)
                    .map_err(|e| Error::data_source(path, e.to_string()))
            }
            Body::Array(array) => {
                let full = self
                    .arrays
                    .get(path)
                    .ok_or_else(|| Error::data_source(path, "no array values held"))?;
                let picked = array.extract_constrained(full)?;
                if let Some(array) = var.as_array_mut() {
                    array.set_values(picked)?;
                }
                var.set_read(true);
                Ok(())
            }
            Body::Record(_) => {
                let names: Vec<String> = var.children().iter().map(|c| c.name().to_string()).collect();
                for (index, name) in names.iter().enumerate() {
                    if let Some(child) = var.child_mut(index) {
                        self.read("", &format!("{path}.{name}"), child)?;
                    }
                }
                var.set_read(true);
                Ok(())
            }
            Body::Table(_) => Err(Error::data_source(path, "tables are read row by row")),
        }
    }

    fn next_row(&mut self, _dataset: &str, path: &str, table: &mut Table) -> Result<bool> {
        let cursor = self
            .tables
            .get_mut(path)
            .ok_or_else(|| Error::data_source(path, "no rows held"))?;
        let Some(row) = cursor.rows.get(cursor.next).cloned() else {
            return Ok(false);
        };
        cursor.next += 1;

        let mut columns: Vec<Variable> = table.iter().cloned().collect();
        self.load_cells(path, &mut columns, row)?;
        for (slot, column) in table.iter_mut().zip(columns) {
            *slot = column;
        }
        Ok(true)
    }
}
