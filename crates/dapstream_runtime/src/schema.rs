//! `MessagePack` snapshots of dataset schemas.
//!
//! A snapshot keeps the full variable tree, including dimension
//! constraints and any values already held, so a server can restore its
//! catalog without re-parsing declarations.

use std::fs;
use std::path::Path;

use dapstream_foundation::{Error, ErrorContext, ErrorKind, Result};
use dapstream_model::Dataset;

/// Encodes a dataset schema as `MessagePack`, with field names.
///
/// # Errors
/// Returns a serialization error if encoding fails.
pub fn to_bytes(dataset: &Dataset) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(dataset).map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))
}

/// Decodes a dataset schema from `MessagePack` bytes.
///
/// # Errors
/// Returns a serialization error if the bytes are not a dataset snapshot.
pub fn from_bytes(bytes: &[u8]) -> Result<Dataset> {
    rmp_serde::from_slice(bytes).map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))
}

/// Writes a snapshot, replacing any existing file.
///
/// # Errors
/// Returns an I/O error naming the file, or a serialization error.
pub fn save_to_file<P: AsRef<Path>>(dataset: &Dataset, path: P) -> Result<()> {
    let path = path.as_ref();
    let bytes = to_bytes(dataset)?;
    fs::write(path, bytes).map_err(|e| file_error(path, &e))
}

/// Reads a snapshot written by [`save_to_file`].
///
/// # Errors
/// Returns an I/O error naming the file, or a serialization error.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| file_error(path, &e))?;
    from_bytes(&bytes)
}

fn file_error(path: &Path, err: &std::io::Error) -> Error {
    Error::new(ErrorKind::Io(err.to_string()))
        .with_context(ErrorContext::new().with_source(path.display().to_string()))
}
