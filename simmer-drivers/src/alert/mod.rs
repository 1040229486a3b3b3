//! Alert output drivers

pub mod gpio;

pub use gpio::{Buzzer, GpioAlert, VibrationMotor};
