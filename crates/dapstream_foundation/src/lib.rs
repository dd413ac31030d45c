//! Core types, values, and escaping rules for dapstream.
//!
//! This crate provides:
//! - [`Value`] - A scalar value held by a leaf variable
//! - [`TypeKind`] - The type tag of every variable kind
//! - [`RelOp`] - Relational operators used by selection clauses
//! - [`Error`] - Rich error types with context
//! - [`escape`] - Identifier and attribute escaping for declaration text

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod escape;
pub mod types;
pub mod value;

pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use types::TypeKind;
pub use value::{RelOp, Value};
