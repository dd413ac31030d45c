//! Variable type model, datasets, and streaming serialization for dapstream.
//!
//! This crate provides:
//! - [`Variable`] - One typed node: scalar, [`Array`], [`Record`] or [`Table`]
//! - [`Dataset`] - A named, ordered collection of top-level variables
//! - [`DataSource`] - The read hook the serializer pulls values through
//! - [`Selection`] - The per-row filter applied while streaming tables
//!
//! Declarations print with [`Dataset::print_declaration`], values with
//! [`Variable::print_value`], and schemas validate with
//! [`Dataset::check_semantics`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod array;
pub mod constructor;
pub mod dataset;
mod print;
pub mod record;
mod semantics;
pub mod serialize;
pub mod source;
pub mod table;
pub mod variable;

pub use array::{Array, Dimension};
pub use constructor::ChildList;
pub use dataset::Dataset;
pub use record::Record;
pub use serialize::{NoSelection, Selection};
pub use source::{Cell, DataSource, MemorySource};
pub use table::Table;
pub use variable::{Body, Variable};
