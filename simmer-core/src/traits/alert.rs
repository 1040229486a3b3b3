//! Completion alert outputs

/// Errors an alert output can report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertError {
    /// Output not fitted or disabled
    Unavailable,
    /// Output failed to drive
    Hardware,
}

/// Trait for anything that can get the cook's attention
///
/// Implementations drive a buzzer, vibration motor, LED, etc.
pub trait AlertOutput {
    /// Begin signalling
    fn trigger(&mut self) -> Result<(), AlertError>;

    /// Stop signalling
    fn silence(&mut self);
}

/// Sound the first output in `chain` that works
///
/// Outputs are tried in order (audio before haptic, typically). Returns the
/// index of the output that fired, or `None` if every output failed. Failures
/// are swallowed.
pub fn sound_alert(chain: &mut [&mut dyn AlertOutput]) -> Option<usize> {
    for (index, output) in chain.iter_mut().enumerate() {
        if output.trigger().is_ok() {
            return Some(index);
        }
    }
    None
}

/// Silence every output in `chain`
pub fn silence_all(chain: &mut [&mut dyn AlertOutput]) {
    for output in chain.iter_mut() {
        output.silence();
    }
}
