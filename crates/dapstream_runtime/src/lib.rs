//! Request handling for dapstream.
//!
//! This crate provides:
//! - [`Engine`] - Holds dataset schemas and answers declaration and data requests
//! - [`EngineConfig`] - Limits and logging settings
//! - [`logging::init`] - Installs a `tracing` subscriber
//! - [`schema`] - `MessagePack` snapshots of dataset schemas

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod engine;
pub mod logging;
pub mod schema;

pub use config::EngineConfig;
pub use engine::{Engine, Request};
