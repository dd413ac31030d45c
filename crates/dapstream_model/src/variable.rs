//! The variable node shared by every kind.

use dapstream_foundation::{Error, RelOp, Result, TypeKind, Value};
use dapstream_wire::{Marshaller, UnMarshaller};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::array::Array;
use crate::record::Record;
use crate::table::Table;

/// One typed node of a dataset's declared structure.
///
/// The kind is fixed at construction: scalar nodes only accept values of
/// their own kind, and containers never change shape into another kind.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Variable {
    name: String,
    dataset: Option<String>,
    read: bool,
    selected: bool,
    body: Body,
}

/// Kind-specific payload of a [`Variable`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Body {
    /// A leaf holding one value.
    Scalar(Value),
    /// An N-dimensional array.
    Array(Array),
    /// A fixed-arity record.
    Record(Record),
    /// An unbounded row collection.
    Table(Table),
}

impl Variable {
    /// Creates a variable from a name and a body.
    #[must_use]
    pub fn new(name: impl Into<String>, body: Body) -> Self {
        Self {
            name: name.into(),
            dataset: None,
            read: false,
            selected: false,
            body,
        }
    }

    /// Creates an unread scalar holding `initial` as its placeholder value.
    #[must_use]
    pub fn scalar(name: impl Into<String>, initial: Value) -> Self {
        Self::new(name, Body::Scalar(initial))
    }

    /// Creates an unread scalar of the given kind.
    ///
    /// # Errors
    /// Returns an internal error if `kind` is a container kind.
    pub fn scalar_of(name: impl Into<String>, kind: TypeKind) -> Result<Self> {
        let name = name.into();
        let initial = Value::zero(kind)
            .ok_or_else(|| Error::internal(format!("{kind} is not a scalar kind ({name})")))?;
        Ok(Self::scalar(name, initial))
    }

    /// Creates a scalar that already holds a value (read flag set).
    #[must_use]
    pub fn with_value(name: impl Into<String>, value: Value) -> Self {
        let mut var = Self::scalar(name, value);
        var.read = true;
        var
    }

    /// Creates an array of `template` with no dimensions.
    #[must_use]
    pub fn array(name: impl Into<String>, template: Variable) -> Self {
        Self::new(name, Body::Array(Array::new(template)))
    }

    /// Creates an empty record.
    #[must_use]
    pub fn record(name: impl Into<String>) -> Self {
        Self::new(name, Body::Record(Record::new()))
    }

    /// Creates an empty table at nesting level 0.
    #[must_use]
    pub fn table(name: impl Into<String>) -> Self {
        Self::new(name, Body::Table(Table::new()))
    }

    /// Builder form of [`Variable::add_child`] that appends.
    ///
    /// # Errors
    /// Returns an internal error if this variable is not a record or table.
    pub fn with_child(mut self, child: Variable) -> Result<Self> {
        self.add_child(child, None)?;
        Ok(self)
    }

    // =========================================================================
    // Identity and flags
    // =========================================================================

    /// The variable's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the variable.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The variable's kind.
    #[must_use]
    pub fn type_kind(&self) -> TypeKind {
        match &self.body {
            Body::Scalar(v) => v.kind(),
            Body::Array(_) => TypeKind::Array,
            Body::Record(_) => TypeKind::Record,
            Body::Table(_) => TypeKind::Table,
        }
    }

    /// The dataset this instance was read from, if set.
    #[must_use]
    pub fn dataset_name(&self) -> Option<&str> {
        self.dataset.as_deref()
    }

    /// Records the originating dataset.
    pub fn set_dataset_name(&mut self, dataset: impl Into<String>) {
        self.dataset = Some(dataset.into());
    }

    /// True once the value has been fetched or decoded.
    #[must_use]
    pub const fn is_read(&self) -> bool {
        self.read
    }

    /// Sets the read flag.
    pub fn set_read(&mut self, read: bool) {
        self.read = read;
    }

    /// True if the node is marked for transmission.
    #[must_use]
    pub const fn is_selected(&self) -> bool {
        self.selected
    }

    /// Marks or unmarks this node and every descendant for transmission.
    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
        match &mut self.body {
            Body::Scalar(_) => {}
            Body::Array(array) => array.template_mut().set_selected(selected),
            Body::Record(record) => record.iter_mut().for_each(|c| c.set_selected(selected)),
            Body::Table(table) => table.iter_mut().for_each(|c| c.set_selected(selected)),
        }
    }

    /// Marks only this node, leaving descendants untouched.
    pub(crate) fn set_selected_shallow(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Clears the read flag on this node and every descendant.
    pub fn reset_read(&mut self) {
        self.read = false;
        match &mut self.body {
            Body::Scalar(_) | Body::Array(_) => {}
            Body::Record(record) => record.iter_mut().for_each(Variable::reset_read),
            Body::Table(table) => table.iter_mut().for_each(Variable::reset_read),
        }
    }

    // =========================================================================
    // Body access
    // =========================================================================

    /// The kind-specific payload.
    #[must_use]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// The current scalar value, for scalar kinds.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match &self.body {
            Body::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// Stores a scalar value and sets the read flag.
    ///
    /// # Errors
    /// Returns a type mismatch if the value's kind differs from this variable's kind.
    pub fn set_value(&mut self, value: Value) -> Result<()> {
        let expected = self.type_kind();
        if let Body::Scalar(current) = &mut self.body {
            if expected == value.kind() {
                *current = value;
                self.read = true;
                return Ok(());
            }
        }
        Err(Error::type_mismatch(expected, value.kind()))
    }

    /// The array payload, for arrays.
    #[must_use]
    pub fn as_array(&self) -> Option<&Array> {
        match &self.body {
            Body::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Mutable array payload.
    pub fn as_array_mut(&mut self) -> Option<&mut Array> {
        match &mut self.body {
            Body::Array(a) => Some(a),
            _ => None,
        }
    }

    /// The record payload, for records.
    #[must_use]
    pub fn as_record(&self) -> Option<&Record> {
        match &self.body {
            Body::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Mutable record payload.
    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match &mut self.body {
            Body::Record(r) => Some(r),
            _ => None,
        }
    }

    /// The table payload, for tables.
    #[must_use]
    pub fn as_table(&self) -> Option<&Table> {
        match &self.body {
            Body::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Mutable table payload.
    pub fn as_table_mut(&mut self) -> Option<&mut Table> {
        match &mut self.body {
            Body::Table(t) => Some(t),
            _ => None,
        }
    }

    // =========================================================================
    // Children
    // =========================================================================

    /// Direct children of a record or table; empty for other kinds.
    #[must_use]
    pub fn children(&self) -> &[Variable] {
        match &self.body {
            Body::Record(r) => r.as_slice(),
            Body::Table(t) => t.as_slice(),
            Body::Scalar(_) | Body::Array(_) => &[],
        }
    }

    /// Direct child by position.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<&Variable> {
        self.children().get(index)
    }

    /// Mutable direct child by position.
    pub fn child_mut(&mut self, index: usize) -> Option<&mut Variable> {
        match &mut self.body {
            Body::Record(r) => r.get_mut(index),
            Body::Table(t) => t.get_mut(index),
            Body::Scalar(_) | Body::Array(_) => None,
        }
    }

    /// Adds a child to a record or table, inserting before `before` when given.
    ///
    /// # Errors
    /// Returns an internal error if this variable is not a record or table.
    pub fn add_child(&mut self, child: Variable, before: Option<usize>) -> Result<()> {
        match &mut self.body {
            Body::Record(r) => {
                r.add_child(child, before);
                Ok(())
            }
            Body::Table(t) => {
                t.add_child(child, before);
                Ok(())
            }
            _ => Err(Error::internal(format!(
                "cannot add a child to {} '{}'",
                self.type_kind(),
                self.name
            ))),
        }
    }

    /// Finds a descendant by name.
    ///
    /// With `exact_match` only direct children are searched. Otherwise a
    /// dotted path descends one constructor level per dot.
    #[must_use]
    pub fn lookup(&self, name: &str, exact_match: bool) -> Option<&Variable> {
        match &self.body {
            Body::Record(r) => r.lookup(name, exact_match),
            Body::Table(t) => t.lookup(name, exact_match),
            Body::Scalar(_) | Body::Array(_) => None,
        }
    }

    /// Mutable form of [`Variable::lookup`].
    pub fn lookup_mut(&mut self, name: &str, exact_match: bool) -> Option<&mut Variable> {
        match &mut self.body {
            Body::Record(r) => r.lookup_mut(name, exact_match),
            Body::Table(t) => t.lookup_mut(name, exact_match),
            Body::Scalar(_) | Body::Array(_) => None,
        }
    }

    // =========================================================================
    // Size and comparison
    // =========================================================================

    /// In-memory width of the value in bytes.
    ///
    /// Cardinal kinds report their fixed width. Text reports the size of its
    /// holder, independent of content. Arrays multiply by their constrained
    /// length (zero without dimensions), records and tables sum one row.
    #[must_use]
    pub fn width(&self) -> usize {
        match &self.body {
            Body::Scalar(v) => v
                .kind()
                .wire_width()
                .unwrap_or(std::mem::size_of::<String>()),
            Body::Array(a) => a.width(),
            Body::Record(r) => r.iter().map(Variable::width).fold(0, usize::saturating_add),
            Body::Table(t) => t.iter().map(Variable::width).fold(0, usize::saturating_add),
        }
    }

    /// Compares this variable's value with another's.
    ///
    /// Dispatches on both runtime kinds. Pairings without a defined
    /// comparison, including any container, yield `Ok(false)`.
    ///
    /// # Errors
    /// Returns an internal error if either scalar has not been read, or a
    /// parse error for an invalid regular expression.
    pub fn compare(&self, other: &Variable, op: RelOp) -> Result<bool> {
        let (Some(left), Some(right)) = (self.value(), other.value()) else {
            return Ok(false);
        };
        for var in [self, other] {
            if !var.read {
                return Err(Error::internal(format!(
                    "value of '{}' compared before it was read",
                    var.name
                )));
            }
        }
        left.compare(right, op)
    }

    // =========================================================================
    // Wire encoding
    // =========================================================================

    /// Encodes the value as held, without reading or projection.
    ///
    /// Tables encode their materialised instances.
    ///
    /// # Errors
    /// Propagates marshaller failures, and internal errors for arrays whose
    /// value count disagrees with their constrained length.
    pub fn encode(&self, m: &mut dyn Marshaller) -> Result<()> {
        match &self.body {
            Body::Scalar(v) => m.put_value(v),
            Body::Array(a) => a.encode(&self.name, m),
            Body::Record(r) => r.iter().try_for_each(|c| c.encode(m)),
            Body::Table(t) => t.encode_instances(m),
        }
    }

    /// Decodes a value from the stream and sets the read flag.
    ///
    /// Never calls the read hook. Tables decode every row until the
    /// end-of-sequence marker.
    ///
    /// # Errors
    /// Returns I/O or framing errors from the stream; for tables a framing
    /// error when the row stream ends abnormally.
    pub fn deserialize(&mut self, um: &mut dyn UnMarshaller) -> Result<()> {
        match &mut self.body {
            Body::Scalar(v) => *v = um.get_value(v.kind())?,
            Body::Array(a) => a.decode(&self.name, um)?,
            Body::Record(r) => {
                for child in r.iter_mut() {
                    child.deserialize(um)?;
                }
            }
            Body::Table(t) => t.deserialize_all(&self.name, um)?,
        }
        self.read = true;
        Ok(())
    }
}
