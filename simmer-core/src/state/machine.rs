//! State machine definition
//!
//! Session execution is a function of the current state and an event. The
//! table below only knows about indices; whether an event was the last of
//! its phase, or a phase the last of the plan, is decided by the runner.

use super::events::Event;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Session execution states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum State {
    /// Plan frozen, waiting for the cook to start
    #[default]
    NotStarted,
    /// Cooking a phase; `event` is the next instruction to perform
    Running { phase: u8, event: u8 },
    /// Phase finished, about to move on
    PhaseComplete { phase: u8 },
    /// Every phase finished
    SessionComplete,
    /// Stopped by the user
    Cancelled,
}

impl State {
    /// Check if the phase countdown may run in this state
    pub fn timer_allowed(&self) -> bool {
        matches!(self, State::Running { .. })
    }

    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, State::SessionComplete | State::Cancelled)
    }

    /// Phase index, if a phase is current
    pub fn phase(&self) -> Option<u8> {
        match self {
            State::Running { phase, .. } | State::PhaseComplete { phase } => Some(*phase),
            _ => None,
        }
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use State::*;

        match (self, event) {
            (NotStarted, Start) => Running { phase: 0, event: 0 },

            (Running { phase, event }, EventCompleted) => Running {
                phase,
                event: event.saturating_add(1),
            },
            (Running { phase, .. }, PhaseFinished) => PhaseComplete { phase },
            // Countdown expiry only alerts; the cook decides when to move on
            (Running { .. }, TimerExpired) => self,

            (PhaseComplete { phase }, NextPhase) => Running {
                phase: phase.saturating_add(1),
                event: 0,
            },

            (NotStarted | Running { .. } | PhaseComplete { .. }, SessionFinished) => SessionComplete,
            (NotStarted | Running { .. } | PhaseComplete { .. }, Cancel) => Cancelled,

            // Default: stay in current state
            _ => self,
        }
    }
}
