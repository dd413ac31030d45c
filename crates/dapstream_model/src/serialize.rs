//! Serialization drivers.
//!
//! The driver walks the selected nodes of a dataset in declaration order.
//! Leaves are read through the [`DataSource`] on first use and encoded.
//! Tables pull rows one at a time, run the selection against each, and
//! frame the rows that pass. Column read flags are cleared before every
//! row so values the source does not push are fetched again.

use dapstream_foundation::{Error, ErrorContext, Result, TypeKind};
use dapstream_wire::{Marker, Marshaller, UnMarshaller};
use tracing::{debug, trace};

use crate::dataset::Dataset;
use crate::source::DataSource;
use crate::variable::Variable;

/// A per-row filter evaluated against the dataset's current state.
pub trait Selection {
    /// True if the row currently loaded into `table` should be sent.
    ///
    /// `table` is the dotted path of the table being streamed. Only that
    /// table's current row, and the rows of tables enclosing it, are loaded.
    ///
    /// # Errors
    /// Evaluation failures abort the response.
    fn evaluate(&self, dataset: &Dataset, table: &str) -> Result<bool>;
}

/// A selection that passes every row.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSelection;

impl Selection for NoSelection {
    fn evaluate(&self, _dataset: &Dataset, _table: &str) -> Result<bool> {
        Ok(true)
    }
}

impl Dataset {
    /// Encodes every selected variable, in order.
    ///
    /// With `apply_selection` unset, every row of every table is sent.
    ///
    /// # Errors
    /// Stops at the first read, evaluation or write failure. The bytes
    /// already written are not a valid response.
    pub fn serialize(
        &mut self,
        m: &mut dyn Marshaller,
        selection: &dyn Selection,
        source: &mut dyn DataSource,
        apply_selection: bool,
    ) -> Result<()> {
        for index in 0..self.variables().len() {
            self.serialize_at(&[index], false, m, selection, source, apply_selection)?;
        }
        Ok(())
    }

    /// Encodes one variable by path, whether or not it is selected.
    ///
    /// Its descendants still follow their own selection flags.
    ///
    /// # Errors
    /// Returns an undefined variable error for an unknown path, and
    /// otherwise fails as [`Dataset::serialize`] does.
    pub fn serialize_variable(
        &mut self,
        path: &str,
        m: &mut dyn Marshaller,
        selection: &dyn Selection,
        source: &mut dyn DataSource,
        apply_selection: bool,
    ) -> Result<()> {
        let at = self
            .index_path(path)
            .ok_or_else(|| Error::undefined_variable(path))?;
        self.serialize_at(&at, true, m, selection, source, apply_selection)
    }

    /// Reads a non-table variable through the source if it is unread.
    ///
    /// # Errors
    /// Returns an undefined variable error for an unknown path, or the
    /// source's failure.
    pub fn read(&mut self, path: &str, source: &mut dyn DataSource) -> Result<()> {
        let at = self
            .index_path(path)
            .ok_or_else(|| Error::undefined_variable(path))?;
        self.read_at(&at, source)
    }

    /// Decodes every top-level variable, in order.
    ///
    /// The dataset must mirror the sender's constrained declaration.
    /// Tables are fully materialised.
    ///
    /// # Errors
    /// Returns I/O or framing errors from the stream.
    pub fn deserialize(&mut self, um: &mut dyn UnMarshaller) -> Result<()> {
        for var in self.variables_mut() {
            var.deserialize(um)?;
        }
        Ok(())
    }

    fn serialize_at(
        &mut self,
        at: &[usize],
        required: bool,
        m: &mut dyn Marshaller,
        selection: &dyn Selection,
        source: &mut dyn DataSource,
        apply_selection: bool,
    ) -> Result<()> {
        let node = self.node(at).ok_or_else(|| missing_node(at))?;
        if !required && !node.is_selected() {
            return Ok(());
        }
        match node.type_kind() {
            TypeKind::Record => {
                let count = node.children().len();
                let mut child = at.to_vec();
                child.push(0);
                for index in 0..count {
                    if let Some(last) = child.last_mut() {
                        *last = index;
                    }
                    self.serialize_at(&child, false, m, selection, source, apply_selection)?;
                }
                Ok(())
            }
            TypeKind::Table => self.serialize_table(at, m, selection, source, apply_selection),
            _ => {
                self.read_at(at, source)?;
                self.node(at).ok_or_else(|| missing_node(at))?.encode(m)
            }
        }
    }

    fn read_at(&mut self, at: &[usize], source: &mut dyn DataSource) -> Result<()> {
        let path = self.dotted_path(at).ok_or_else(|| missing_node(at))?;
        let dataset = self.name().to_string();
        let node = self.node_mut(at).ok_or_else(|| missing_node(at))?;
        if node.type_kind() == TypeKind::Table {
            return Err(Error::internal(format!("table '{path}' cannot be read whole")));
        }
        if node.is_read() {
            return Ok(());
        }
        source.begin_no_timeout();
        let outcome = source.read(&dataset, &path, node);
        source.end_no_timeout();
        outcome.map_err(|e| e.with_context(ErrorContext::new().with_source(&dataset).with_frame(&path)))?;
        node.set_dataset_name(dataset);
        node.set_read(true);
        Ok(())
    }

    fn serialize_table(
        &mut self,
        at: &[usize],
        m: &mut dyn Marshaller,
        selection: &dyn Selection,
        source: &mut dyn DataSource,
        apply_selection: bool,
    ) -> Result<()> {
        let path = self.dotted_path(at).ok_or_else(|| missing_node(at))?;
        let dataset = self.name().to_string();
        let mut sent = 0usize;
        let mut skipped = 0usize;

        loop {
            let table = self
                .node_mut(at)
                .and_then(|n| n.as_table_mut())
                .ok_or_else(|| missing_node(at))?;
            table.iter_mut().for_each(Variable::reset_read);
            source.begin_no_timeout();
            let more = source.next_row(&dataset, &path, table);
            source.end_no_timeout();
            if !more? {
                break;
            }

            if apply_selection && !selection.evaluate(self, &path)? {
                skipped += 1;
                trace!(table = %path, skipped, "row filtered");
                continue;
            }

            m.put_marker(Marker::Instance)?;
            let count = self.node(at).map_or(0, |n| n.children().len());
            let mut column = at.to_vec();
            column.push(0);
            for index in 0..count {
                if let Some(last) = column.last_mut() {
                    *last = index;
                }
                self.serialize_at(&column, false, m, selection, source, apply_selection)?;
            }
            sent += 1;
            trace!(table = %path, row = sent, "row sent");
        }

        m.put_marker(Marker::EndOfSequence)?;
        let node = self.node_mut(at).ok_or_else(|| missing_node(at))?;
        node.set_dataset_name(dataset);
        node.set_read(true);
        if let Some(table) = node.as_table_mut() {
            table.set_row_count(sent);
        }
        debug!(table = %path, sent, skipped, "table streamed");
        Ok(())
    }
}

fn missing_node(at: &[usize]) -> Error {
    Error::internal(format!("no node at index path {at:?}"))
}
