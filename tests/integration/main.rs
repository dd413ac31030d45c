//! Cross-layer integration tests for dapstream
//!
//! Tests that verify correct interaction between multiple crates.

mod pipeline;
