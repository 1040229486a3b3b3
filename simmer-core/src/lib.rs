//! Board-agnostic core logic for the Simmer cooking assistant
//!
//! This crate contains all session logic that does not depend on specific
//! hardware or an async runtime:
//!
//! - Session data model (items, batches, the session aggregate)
//! - Cooking planner (temperature grouping, staggering, instruction timelines)
//! - State machine and runner for session execution
//! - Alert output traits
//! - Configuration types and snapshot persistence

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod planner;
pub mod scheduler;
pub mod session;
pub mod state;
#[cfg(feature = "serde")]
pub mod store;
pub mod traits;
