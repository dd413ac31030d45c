//! Unbounded row collections and their streaming frame.
//!
//! On the wire a table is a run of rows, each introduced by
//! [`Marker::Instance`], closed by a single [`Marker::EndOfSequence`].
//! No row count is sent ahead, so producers can stream rows as their
//! source yields them.

use std::ops::Deref;

use dapstream_foundation::{Error, Result};
use dapstream_wire::{Marker, Marshaller, UnMarshaller};
use tracing::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constructor::ChildList;
use crate::variable::{Body, Variable};

/// A sequence of record-shaped rows.
///
/// The child list doubles as the row template and the current row.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Table {
    columns: ChildList,
    level: usize,
    instance_error: bool,
    instances: Vec<Vec<Variable>>,
    row_count: Option<usize>,
}

impl Table {
    /// Creates an empty top-level table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Nesting depth: 0 for a table that is not inside another table.
    #[must_use]
    pub const fn level(&self) -> usize {
        self.level
    }

    /// Sets the nesting depth, renumbering nested tables below it.
    pub fn set_level(&mut self, level: usize) {
        self.level = level;
        for child in self.columns.iter_mut() {
            adopt_level(child, level + 1);
        }
    }

    /// Adds a column, inserting before `before` when given.
    pub fn add_child(&mut self, mut child: Variable, before: Option<usize>) {
        adopt_level(&mut child, self.level + 1);
        self.columns.add_child(child, before);
    }

    /// Mutable column by position.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Variable> {
        self.columns.get_mut(index)
    }

    /// Mutable iterator over the columns.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Variable> {
        self.columns.iter_mut()
    }

    /// Mutable column lookup.
    pub fn lookup_mut(&mut self, name: &str, exact_match: bool) -> Option<&mut Variable> {
        self.columns.lookup_mut(name, exact_match)
    }

    /// True if the last row read ended on anything but a clean marker.
    #[must_use]
    pub const fn instance_error(&self) -> bool {
        self.instance_error
    }

    /// Row count, once known from streaming or decoding.
    #[must_use]
    pub const fn length(&self) -> Option<usize> {
        self.row_count
    }

    pub(crate) fn set_row_count(&mut self, rows: usize) {
        self.row_count = Some(rows);
    }

    /// Rows materialised by [`Table::deserialize_all`].
    #[must_use]
    pub fn instances(&self) -> &[Vec<Variable>] {
        &self.instances
    }

    /// Appends a materialised row built from the current column values.
    pub fn push_current_row(&mut self) {
        self.instances.push(self.columns.to_vec());
        self.row_count = Some(self.instances.len());
    }

    /// Drops materialised rows and forgets the row count.
    pub fn clear_instances(&mut self) {
        self.instances.clear();
        self.row_count = None;
    }

    /// Reads one row into the columns.
    ///
    /// Returns `true` when a row was consumed and another may follow.
    /// Returns `false` at the end-of-sequence marker, and also when the
    /// stream breaks; [`Table::instance_error`] tells the two apart.
    pub fn deserialize_row(&mut self, um: &mut dyn UnMarshaller) -> bool {
        self.instance_error = false;
        match um.get_marker() {
            Ok(byte) if byte == Marker::EndOfSequence.byte() => return false,
            Ok(byte) if byte == Marker::Instance.byte() => {}
            Ok(byte) => {
                warn!(byte, level = self.level, "unexpected byte at row boundary");
                self.instance_error = true;
                return false;
            }
            Err(e) => {
                warn!(error = %e, level = self.level, "row marker unreadable");
                self.instance_error = true;
                return false;
            }
        }
        for column in self.columns.iter_mut() {
            if let Err(e) = column.deserialize(um) {
                warn!(column = column.name(), error = %e, "row truncated");
                self.instance_error = true;
                return false;
            }
        }
        true
    }

    /// Reads rows until the end-of-sequence marker, keeping each one.
    ///
    /// # Errors
    /// Returns a framing error naming `name` if the row stream breaks.
    pub fn deserialize_all(&mut self, name: &str, um: &mut dyn UnMarshaller) -> Result<()> {
        self.clear_instances();
        while self.deserialize_row(um) {
            self.instances.push(self.columns.to_vec());
        }
        if self.instance_error {
            return Err(Error::framing(format!(
                "row stream of '{name}' ended abnormally after {} rows",
                self.instances.len()
            )));
        }
        self.row_count = Some(self.instances.len());
        Ok(())
    }

    /// Writes the materialised rows with their framing markers.
    pub(crate) fn encode_instances(&self, m: &mut dyn Marshaller) -> Result<()> {
        for row in &self.instances {
            m.put_marker(Marker::Instance)?;
            for column in row {
                column.encode(m)?;
            }
        }
        m.put_marker(Marker::EndOfSequence)
    }
}

impl Deref for Table {
    type Target = ChildList;

    fn deref(&self) -> &Self::Target {
        &self.columns
    }
}

/// Assigns `level` to a table, or to every table directly reachable through records.
fn adopt_level(var: &mut Variable, level: usize) {
    if let Some(table) = var.as_table_mut() {
        table.set_level(level);
        return;
    }
    if matches!(var.body(), Body::Record(_)) {
        if let Some(record) = var.as_record_mut() {
            for child in record.iter_mut() {
                adopt_level(child, level);
            }
        }
    }
}
