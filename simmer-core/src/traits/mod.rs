//! Hardware abstraction traits
//!
//! These traits define the interface between the session logic and
//! hardware-specific implementations.

pub mod alert;

pub use alert::{silence_all, sound_alert, AlertError, AlertOutput};
