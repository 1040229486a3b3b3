//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in simmer-core for alert hardware:
//!
//! - Piezo buzzer (audio cue)
//! - Vibration motor (haptic pulse)

#![no_std]
#![deny(unsafe_code)]

pub mod alert;

pub use alert::{Buzzer, GpioAlert, VibrationMotor};
