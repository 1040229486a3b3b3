//! Configuration types
//!
//! Planner tunables and item input limits, loadable from TOML.

pub mod types;

pub use types::*;
