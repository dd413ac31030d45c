//! Arrays and their dimensions.

use dapstream_foundation::escape::www_to_id;
use dapstream_foundation::{Error, Result, TypeKind, Value};
use dapstream_wire::{Marshaller, UnMarshaller};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::variable::Variable;

/// One array dimension with its full and constrained extents.
///
/// Invariant: `start <= stop < size` and `stride >= 1`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Dimension {
    /// Dimension name; empty for anonymous dimensions.
    pub name: String,
    /// Declared extent.
    pub size: usize,
    /// First selected index.
    pub start: usize,
    /// Last selected index (inclusive).
    pub stop: usize,
    /// Step between selected indices.
    pub stride: usize,
}

impl Dimension {
    /// Creates a full-extent dimension. `size` must be at least 1.
    fn full(size: usize, name: String) -> Self {
        Self {
            name,
            size,
            start: 0,
            stop: size - 1,
            stride: 1,
        }
    }

    /// Number of selected indices: `(stop - start) / stride + 1`.
    #[must_use]
    pub const fn constrained_len(&self) -> usize {
        (self.stop - self.start) / self.stride + 1
    }

    /// True if the constraint selects less than the full extent.
    #[must_use]
    pub const fn is_constrained(&self) -> bool {
        self.constrained_len() != self.size
    }

    /// Restores the full extent.
    pub fn reset(&mut self) {
        self.start = 0;
        self.stop = self.size - 1;
        self.stride = 1;
    }

    /// Iterates over the selected indices.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        (self.start..=self.stop).step_by(self.stride)
    }
}

/// Element storage: plain values for scalar templates, records otherwise.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
enum Elements {
    Values(Vec<Value>),
    Members(Vec<Variable>),
}

/// An N-dimensional array of one element template.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Array {
    template: Box<Variable>,
    dims: Vec<Dimension>,
    elements: Elements,
}

impl Array {
    /// Creates an array with no dimensions.
    #[must_use]
    pub fn new(template: Variable) -> Self {
        let elements = if template.type_kind().is_scalar() {
            Elements::Values(Vec::new())
        } else {
            Elements::Members(Vec::new())
        };
        Self {
            template: Box::new(template),
            dims: Vec::new(),
            elements,
        }
    }

    /// The element template.
    #[must_use]
    pub fn template(&self) -> &Variable {
        &self.template
    }

    /// Mutable element template.
    pub fn template_mut(&mut self) -> &mut Variable {
        &mut self.template
    }

    /// Appends a full-extent dimension.
    ///
    /// The name may be empty and is unescaped before it is stored.
    ///
    /// # Errors
    /// Returns an invalid constraint error for a zero size, or when the
    /// element count or byte width of the grown array overflows `usize`.
    pub fn append_dimension(&mut self, size: usize, name: &str) -> Result<()> {
        if size == 0 {
            return Err(Error::invalid_constraint(format!(
                "dimension '{name}' must have a positive size"
            )));
        }
        let fits = self
            .full_length()
            .unwrap_or(1)
            .checked_mul(size)
            .and_then(|n| n.checked_mul(self.template.width()));
        if fits.is_none() {
            return Err(Error::invalid_constraint(format!(
                "dimension '{name}' of size {size} overflows the array extent"
            )));
        }
        self.dims.push(Dimension::full(size, www_to_id(name)));
        Ok(())
    }

    /// Narrows one dimension to `start..=stop` every `stride`.
    ///
    /// # Errors
    /// Returns an invalid constraint error if the dimension does not exist or
    /// the extents violate `start <= stop < size`, `stride >= 1`.
    pub fn constrain_dimension(
        &mut self,
        index: usize,
        start: usize,
        stop: usize,
        stride: usize,
    ) -> Result<()> {
        let count = self.dims.len();
        let dim = self.dims.get_mut(index).ok_or_else(|| {
            Error::invalid_constraint(format!("dimension {index} out of range ({count} dimensions)"))
        })?;
        if stride == 0 || start > stop || stop >= dim.size {
            return Err(Error::invalid_constraint(format!(
                "[{start}:{stride}:{stop}] does not fit dimension of size {}",
                dim.size
            )));
        }
        dim.start = start;
        dim.stop = stop;
        dim.stride = stride;
        Ok(())
    }

    /// Restores every dimension to its full extent.
    pub fn reset_constraints(&mut self) {
        self.dims.iter_mut().for_each(Dimension::reset);
    }

    /// The dimensions in declaration order.
    #[must_use]
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dims
    }

    /// One dimension by position.
    #[must_use]
    pub fn dimension(&self, index: usize) -> Option<&Dimension> {
        self.dims.get(index)
    }

    /// Product of the constrained dimension lengths.
    ///
    /// Recomputed on every call; `None` until a dimension exists.
    #[must_use]
    pub fn length(&self) -> Option<usize> {
        if self.dims.is_empty() {
            None
        } else {
            self.dims
                .iter()
                .try_fold(1usize, |n, d| n.checked_mul(d.constrained_len()))
        }
    }

    /// Product of the declared dimension sizes.
    #[must_use]
    pub fn full_length(&self) -> Option<usize> {
        if self.dims.is_empty() {
            None
        } else {
            self.dims.iter().try_fold(1usize, |n, d| n.checked_mul(d.size))
        }
    }

    /// Width in bytes of the constrained elements.
    #[must_use]
    pub fn width(&self) -> usize {
        self.length()
            .unwrap_or(0)
            .saturating_mul(self.template.width())
    }

    /// Number of elements currently held.
    #[must_use]
    pub fn element_count(&self) -> usize {
        match &self.elements {
            Elements::Values(v) => v.len(),
            Elements::Members(m) => m.len(),
        }
    }

    /// Held values, for scalar templates.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        match &self.elements {
            Elements::Values(v) => v,
            Elements::Members(_) => &[],
        }
    }

    /// Held record elements, for record templates.
    #[must_use]
    pub fn members(&self) -> &[Variable] {
        match &self.elements {
            Elements::Members(m) => m,
            Elements::Values(_) => &[],
        }
    }

    /// Replaces the held values.
    ///
    /// # Errors
    /// Returns a type mismatch if a value differs from the template kind, or
    /// an invalid constraint error if the count differs from [`Array::length`].
    pub fn set_values(&mut self, values: Vec<Value>) -> Result<()> {
        let kind = self.template.type_kind();
        if let Some(bad) = values.iter().find(|v| v.kind() != kind) {
            return Err(Error::type_mismatch(kind, bad.kind()));
        }
        self.check_count(values.len())?;
        self.elements = Elements::Values(values);
        Ok(())
    }

    /// Replaces the held record elements.
    ///
    /// # Errors
    /// Returns a type mismatch if an element differs from the template kind,
    /// or an invalid constraint error if the count differs from [`Array::length`].
    pub fn set_members(&mut self, members: Vec<Variable>) -> Result<()> {
        let kind = self.template.type_kind();
        if let Some(bad) = members.iter().find(|m| m.type_kind() != kind) {
            return Err(Error::type_mismatch(kind, bad.type_kind()));
        }
        self.check_count(members.len())?;
        self.elements = Elements::Members(members);
        Ok(())
    }

    fn check_count(&self, count: usize) -> Result<()> {
        match self.length() {
            Some(len) if len == count => Ok(()),
            Some(len) => Err(Error::invalid_constraint(format!(
                "{count} elements supplied for constrained length {len}"
            ))),
            None => Err(Error::invalid_constraint(
                "array has no dimensions".to_string(),
            )),
        }
    }

    /// Row-major offsets, into the full extent, of every selected element.
    #[must_use]
    pub fn constrained_offsets(&self) -> Vec<usize> {
        let mut offsets = vec![0usize];
        for dim in &self.dims {
            offsets = offsets
                .iter()
                .flat_map(|base| dim.indices().map(move |i| base * dim.size + i))
                .collect();
        }
        if self.dims.is_empty() {
            offsets.clear();
        }
        offsets
    }

    /// Picks the selected elements out of a full-extent row-major slice.
    ///
    /// # Errors
    /// Returns a data source error if `full` is shorter than the declared extent.
    pub fn extract_constrained(&self, full: &[Value]) -> Result<Vec<Value>> {
        let expected = self.full_length().unwrap_or(0);
        if full.len() < expected {
            return Err(Error::data_source(
                self.template.name(),
                format!("{} values supplied for {expected} declared", full.len()),
            ));
        }
        Ok(self
            .constrained_offsets()
            .into_iter()
            .map(|i| full[i].clone())
            .collect())
    }

    /// Encodes the element count then each element.
    pub(crate) fn encode(&self, name: &str, m: &mut dyn Marshaller) -> Result<()> {
        let len = self
            .length()
            .ok_or_else(|| Error::internal(format!("array '{name}' has no dimensions")))?;
        if self.element_count() != len {
            return Err(Error::internal(format!(
                "array '{name}' holds {} elements but its constrained length is {len}",
                self.element_count()
            )));
        }
        m.put_length(len)?;
        match &self.elements {
            Elements::Values(values) => values.iter().try_for_each(|v| m.put_value(v)),
            Elements::Members(members) => members.iter().try_for_each(|v| v.encode(m)),
        }
    }

    /// Decodes an element count then each element.
    pub(crate) fn decode(&mut self, name: &str, um: &mut dyn UnMarshaller) -> Result<()> {
        let count = um.get_length()?;
        if self.length() != Some(count) {
            return Err(Error::framing(format!(
                "array '{name}' expects {:?} elements, stream has {count}",
                self.length()
            )));
        }
        let kind = self.template.type_kind();
        match kind {
            TypeKind::Array | TypeKind::Table => Err(Error::internal(format!(
                "array '{name}' has unsupported element kind {kind}"
            ))),
            TypeKind::Record => {
                let mut members = Vec::with_capacity(count);
                for _ in 0..count {
                    let mut member = (*self.template).clone();
                    member.deserialize(um)?;
                    members.push(member);
                }
                self.elements = Elements::Members(members);
                Ok(())
            }
            _ => {
                let mut values = Vec::with_capacity(count);
                for _ in 0..count {
                    values.push(um.get_value(kind)?);
                }
                self.elements = Elements::Values(values);
                Ok(())
            }
        }
    }
}
