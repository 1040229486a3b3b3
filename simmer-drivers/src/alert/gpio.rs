//! GPIO alert output
//!
//! Drives an alert device switched by a single GPIO pin (directly or via a
//! transistor): an active buzzer, a vibration motor, an indicator LED.

use embedded_hal::digital::OutputPin;
use simmer_core::traits::{AlertError, AlertOutput};

/// GPIO-switched alert output
///
/// The pin can be configured as active-high (default) or active-low. A
/// board without the device fitted is built with [`GpioAlert::absent`] and
/// reports [`AlertError::Unavailable`], so the alert chain moves on.
pub struct GpioAlert<P> {
    pin: Option<P>,
    /// If true, device ON = pin LOW
    inverted: bool,
    /// Current logical state (true = signalling)
    active: bool,
}

/// Active buzzer on a GPIO pin
pub type Buzzer<P> = GpioAlert<P>;

/// Vibration motor on a GPIO pin
pub type VibrationMotor<P> = GpioAlert<P>;

impl<P: OutputPin> GpioAlert<P> {
    /// Create a new GPIO alert output
    ///
    /// # Arguments
    /// - `pin`: The GPIO pin to control
    /// - `inverted`: If true, the device is ON when the pin is LOW
    pub fn new(pin: P, inverted: bool) -> Self {
        let mut alert = Self {
            pin: Some(pin),
            inverted,
            active: false,
        };
        // Ensure the device starts quiet
        alert.silence();
        alert
    }

    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    /// Placeholder for a device this board does not have
    pub fn absent() -> Self {
        Self {
            pin: None,
            inverted: false,
            active: false,
        }
    }

    /// Check if the device is fitted
    pub fn is_present(&self) -> bool {
        self.pin.is_some()
    }

    /// Check if the device is currently signalling
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Release the pin
    pub fn into_inner(self) -> Option<P> {
        self.pin
    }

    fn drive(&mut self, on: bool) -> Result<(), AlertError> {
        let pin = self.pin.as_mut().ok_or(AlertError::Unavailable)?;
        let result = if on != self.inverted {
            pin.set_high()
        } else {
            pin.set_low()
        };
        result.map_err(|_| AlertError::Hardware)
    }
}

impl<P: OutputPin> AlertOutput for GpioAlert<P> {
    fn trigger(&mut self) -> Result<(), AlertError> {
        self.drive(true)?;
        self.active = true;
        Ok(())
    }

    fn silence(&mut self) {
        // Best effort: a pin that fails to drive low has nothing to retry
        let _ = self.drive(false);
        self.active = false;
    }
}
