//! Constraint evaluation for dapstream.
//!
//! This crate provides:
//! - [`Evaluator`] - Binds constraint text to a dataset and evaluates its clauses
//! - [`FunctionRegistry`] - Named predicate, value and projection functions
//! - [`project`] - Marks a path and narrows its array dimensions
//!
//! An [`Evaluator`] is also the [`dapstream_model::Selection`] the
//! serializer consults for every streamed table row.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod clause;
pub mod evaluator;
pub mod functions;
pub mod projection;

pub use clause::{Clause, ConstantId, Operand};
pub use evaluator::Evaluator;
pub use functions::{Function, FunctionRegistry, PredicateFn, ProjectionFn, ValueFn};
pub use projection::project;
