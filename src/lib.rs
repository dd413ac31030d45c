//! dapstream - Streaming data-access protocol engine
//!
//! This crate re-exports all layers of the dapstream system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 5: dapstream_runtime    - Requests, configuration, logging, schema snapshots
//! Layer 4: dapstream_engine     - Constraint evaluation, function registry, projection
//! Layer 3: dapstream_language   - Lexer, constraint and declaration parsers
//! Layer 2: dapstream_model      - Variables, datasets, streaming serialization
//! Layer 1: dapstream_wire       - Marshallers and table framing markers
//! Layer 0: dapstream_foundation - Core types (Value, TypeKind, Error)
//! ```

pub use dapstream_engine as engine;
pub use dapstream_foundation as foundation;
pub use dapstream_language as language;
pub use dapstream_model as model;
pub use dapstream_runtime as runtime;
pub use dapstream_wire as wire;
