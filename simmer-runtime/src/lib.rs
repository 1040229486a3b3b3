//! Async runtime for Simmer cooking sessions
//!
//! Executor-agnostic building blocks for running a session on a device:
//!
//! - Per-phase one-second ticker bound to the runner's tick lease
//! - Session controller applying cook commands to the runner
//! - Session loop (commands, ticks, persistence, status)
//! - Alert loop pulsing the buzzer / vibration fallback chain
//!
//! Tasks are plain `async fn`s; the application wraps them in its
//! executor's task macro and wires them to the statics in [`channels`].

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

// Must come first so the logging macros are visible to the other modules
#[macro_use]
mod fmt;

pub mod channels;
pub mod controller;
pub mod tasks;

pub use channels::{AlertRequest, SessionCommand, StatusReport};
pub use controller::SessionController;
