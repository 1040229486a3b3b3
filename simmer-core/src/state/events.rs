//! Events that trigger state transitions

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Cook actions
    /// User started the session
    Start,
    /// Current instruction done, more remain in the phase
    EventCompleted,
    /// User cancelled the session
    Cancel,

    // Runner events
    /// Current phase finished (last instruction done, or skipped)
    PhaseFinished,
    /// Move on to the next phase
    NextPhase,
    /// Last phase finished, or the user ended the session early
    SessionFinished,

    // Timer events
    /// Phase countdown reached zero
    TimerExpired,
}

impl Event {
    /// Check if this event is user-initiated
    pub fn is_user_event(&self) -> bool {
        matches!(self, Event::Start | Event::EventCompleted | Event::Cancel)
    }

    /// Check if this event is produced by the session runner
    pub fn is_runner_event(&self) -> bool {
        matches!(
            self,
            Event::PhaseFinished | Event::NextPhase | Event::SessionFinished
        )
    }

    /// Check if this event should sound the alert chain
    pub fn needs_alert(&self) -> bool {
        matches!(self, Event::TimerExpired)
    }
}
