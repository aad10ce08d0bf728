//! svcmap-core
//!
//! Core library for building and incrementally maintaining a structural model
//! of a multi-service codebase.
//!
//! This crate defines the IR (model), service boundary resolution, file-level
//! deltas and the merge engine that applies them, plus a full-scan path and
//! JSON document I/O.
//!
//! All substantive logic lives here so it is fully testable and reusable from
//! multiple frontends.

pub mod boundary;
pub mod config;
pub mod delta;
pub mod merge;
pub mod model;
pub mod scan;
pub mod store;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
