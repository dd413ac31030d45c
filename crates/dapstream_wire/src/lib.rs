//! Wire encoding for dapstream.
//!
//! This crate provides:
//! - [`Marshaller`] / [`UnMarshaller`] - The byte sink and source traits used by every variable kind
//! - [`StreamMarshaller`] / [`StreamUnMarshaller`] - Implementations over `std::io` writers and readers
//! - [`Marker`] - The reserved bytes framing streamed table rows
//!
//! # Encoding
//!
//! Integers are big-endian with a fixed width per kind, floats are their
//! IEEE-754 bits in big-endian order, and strings are a `u32` byte length
//! followed by UTF-8 bytes. Nothing is padded.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod marker;
pub mod marshal;
pub mod stream;

pub use marker::Marker;
pub use marshal::{Marshaller, UnMarshaller};
pub use stream::{DEFAULT_MAX_STRING_LEN, StreamMarshaller, StreamUnMarshaller};
