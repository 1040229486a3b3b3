//! Phase countdown
//!
//! One countdown per session. Entering a phase arms the timer with a fresh
//! [`TickLease`]; a tick source holding an older lease is stale and its
//! ticks are ignored, so two phases' tick sources can never both count.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Token identifying the single tick source allowed to drive the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TickLease(u32);

impl TickLease {
    pub fn generation(&self) -> u32 {
        self.0
    }
}

/// Countdown for the current phase
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhaseTimer {
    lease: Option<TickLease>,
    generation: u32,
    remaining_s: u32,
    running: bool,
}

impl PhaseTimer {
    pub const fn new() -> Self {
        Self {
            lease: None,
            generation: 0,
            remaining_s: 0,
            running: false,
        }
    }

    /// Reset to `duration_s`, stopped, under a new lease
    ///
    /// Any previously issued lease becomes stale.
    pub fn arm(&mut self, duration_s: u32) -> TickLease {
        self.generation = self.generation.wrapping_add(1);
        let lease = TickLease(self.generation);
        self.lease = Some(lease);
        self.remaining_s = duration_s;
        self.running = false;
        lease
    }

    /// Revoke the lease and stop counting
    pub fn release(&mut self) {
        self.lease = None;
        self.running = false;
    }

    /// Resume counting; returns false if there is nothing to count
    pub fn start(&mut self) -> bool {
        if self.lease.is_none() || self.remaining_s == 0 {
            return false;
        }
        self.running = true;
        true
    }

    /// Stop counting without losing the remaining time
    pub fn pause(&mut self) -> bool {
        let was_running = self.running;
        self.running = false;
        was_running
    }

    /// Count down by `elapsed_s`
    ///
    /// Returns true exactly once, on the tick that reaches zero. Ticks from
    /// a stale lease, or while paused, do nothing.
    pub fn tick(&mut self, lease: TickLease, elapsed_s: u32) -> bool {
        if !self.running || self.lease != Some(lease) {
            return false;
        }
        self.remaining_s = self.remaining_s.saturating_sub(elapsed_s);
        if self.remaining_s == 0 {
            self.running = false;
            return true;
        }
        false
    }

    /// Current lease, if a phase is armed
    pub fn lease(&self) -> Option<TickLease> {
        self.lease
    }

    pub fn remaining_s(&self) -> u32 {
        self.remaining_s
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
