//! Session scheduler
//!
//! Runs a frozen cooking plan: phase countdown and instruction tracking.

pub mod runner;
pub mod timer;

pub use runner::{Progress, SessionRunner};
pub use timer::{PhaseTimer, TickLease};
