//! Applying a parsed projection to a dataset.

use dapstream_foundation::{Error, Result};
use dapstream_language::Slice;
use dapstream_model::Dataset;

/// Marks `path` selected and narrows its leading dimensions to `slices`.
///
/// # Errors
/// Returns an undefined variable error for an unknown path, or an invalid
/// constraint error when slices are given for a non-array, for more
/// dimensions than it has, or outside a dimension's extent.
pub fn project(dataset: &mut Dataset, path: &str, slices: &[Slice]) -> Result<()> {
    dataset.mark(path, true)?;
    if slices.is_empty() {
        return Ok(());
    }
    let var = dataset
        .lookup_mut(path)
        .ok_or_else(|| Error::undefined_variable(path))?;
    let array = var
        .as_array_mut()
        .ok_or_else(|| Error::invalid_constraint(format!("'{path}' is not an array")))?;
    let rank = array.dimensions().len();
    if slices.len() > rank {
        return Err(Error::invalid_constraint(format!(
            "'{path}' has {rank} dimension(s), {} slices given",
            slices.len()
        )));
    }
    for (index, slice) in slices.iter().enumerate() {
        array.constrain_dimension(index, slice.start, slice.stop, slice.stride)?;
    }
    Ok(())
}
