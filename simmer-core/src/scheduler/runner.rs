//! Session execution
//!
//! Drives a frozen plan through the state machine: tracks the current phase
//! and instruction, owns the phase countdown and writes completion back into
//! the session. Every operation returns the state machine event it caused,
//! or `None` if it caused none. Changes to the session are tracked by a
//! separate unsaved flag, since marking one action of a combined
//! instruction changes the session without causing an event.

use super::timer::{PhaseTimer, TickLease};
use crate::planner::{CookingPhase, Instruction};
use crate::session::{CookingSession, SessionStatus};
use crate::state::{Event, State};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How far through the plan the session is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Progress {
    /// Current phase (equals `total_phases` once complete)
    pub phase_index: u8,
    pub total_phases: u8,
    /// Completed phases as a percentage
    pub percent: u8,
}

/// Session runner
///
/// Owns the session for the duration of cooking.
#[derive(Debug)]
pub struct SessionRunner {
    session: CookingSession,
    state: State,
    timer: PhaseTimer,
    unsaved: bool,
}

impl SessionRunner {
    /// Take over a session
    ///
    /// A session restored mid-cook resumes at its saved phase, on the first
    /// instruction not yet done, with the countdown reset to the full phase
    /// duration.
    pub fn new(session: CookingSession) -> Self {
        let mut runner = Self {
            session,
            state: State::NotStarted,
            timer: PhaseTimer::new(),
            unsaved: false,
        };

        match runner.session.status() {
            SessionStatus::Completed => runner.state = State::SessionComplete,
            SessionStatus::Cancelled => runner.state = State::Cancelled,
            SessionStatus::InProgress => {
                if let Some(phase) = runner.session.current_phase_index() {
                    if let Some(event) = runner.first_open_event(phase) {
                        runner.state = State::Running { phase, event };
                        runner.arm_timer(phase);
                    }
                }
            }
            SessionStatus::Building => {}
        }
        runner
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn session(&self) -> &CookingSession {
        &self.session
    }

    /// Hand the session back (for persistence or review)
    pub fn into_session(self) -> CookingSession {
        self.session
    }

    /// Phase being cooked
    pub fn current_phase(&self) -> Option<&CookingPhase> {
        let phase = self.state.phase()?;
        self.session.phases().get(phase as usize)
    }

    /// Index of the next instruction in the current phase
    pub fn current_event_index(&self) -> Option<u8> {
        match self.state {
            State::Running { event, .. } => Some(event),
            _ => None,
        }
    }

    /// Text of the next instruction
    pub fn current_instruction(&self) -> Option<Instruction<'_>> {
        let event = self.current_event_index()?;
        self.current_phase()?.instruction(event as usize)
    }

    pub fn progress(&self) -> Progress {
        let total_phases = self.session.phases().len() as u8;
        let phase_index = match self.state {
            State::SessionComplete => total_phases,
            State::Running { phase, .. } | State::PhaseComplete { phase } => phase,
            State::NotStarted | State::Cancelled => {
                self.session.current_phase_index().unwrap_or(0)
            }
        };
        let percent = match (self.state, total_phases) {
            (State::SessionComplete, _) => 100,
            (_, 0) => 0,
            _ => (phase_index as u16 * 100 / total_phases as u16) as u8,
        };
        Progress {
            phase_index,
            total_phases,
            percent,
        }
    }

    /// Countdown remaining in the current phase (seconds)
    pub fn remaining_s(&self) -> u32 {
        self.timer.remaining_s()
    }

    pub fn is_timer_running(&self) -> bool {
        self.timer.is_running()
    }

    /// Whether the session changed since the last [`take_unsaved`](Self::take_unsaved)
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// Clear the unsaved flag, returning whether it was set
    pub fn take_unsaved(&mut self) -> bool {
        core::mem::take(&mut self.unsaved)
    }

    /// Lease for the current phase's tick source
    pub fn tick_lease(&self) -> Option<TickLease> {
        self.timer.lease()
    }

    /// Start cooking the first phase
    ///
    /// The session must have been frozen with
    /// [`CookingSession::begin_cooking`].
    pub fn start(&mut self) -> Option<Event> {
        if self.state != State::NotStarted
            || self.session.status() != SessionStatus::InProgress
            || self.session.phases().is_empty()
        {
            return None;
        }
        self.apply(Event::Start);
        self.enter_phase(0);
        Some(Event::Start)
    }

    pub fn start_timer(&mut self) -> bool {
        self.state.timer_allowed() && self.timer.start()
    }

    pub fn pause_timer(&mut self) -> bool {
        self.timer.pause()
    }

    /// Feed one tick from the source holding `lease`
    ///
    /// Returns `TimerExpired` on the tick that reaches zero; the caller
    /// sounds the alert chain.
    pub fn tick(&mut self, lease: TickLease, elapsed_s: u32) -> Option<Event> {
        if !self.state.timer_allowed() {
            return None;
        }
        if self.timer.tick(lease, elapsed_s) {
            self.apply(Event::TimerExpired);
            return Some(Event::TimerExpired);
        }
        None
    }

    /// Mark every action of the current instruction done and move on
    pub fn complete_event(&mut self) -> Option<Event> {
        let State::Running { phase, event } = self.state else {
            return None;
        };
        let current = self.session.phase_mut(phase as usize)?;
        if current.mark_event_done(event as usize) {
            self.unsaved = true;
        }
        self.advance(phase, event)
    }

    /// Mark one action of the current instruction done
    ///
    /// Moves on only once every action of the instruction is done. Marking
    /// an action while others remain open returns `None` but still leaves
    /// the session with unsaved changes.
    pub fn complete_action(&mut self, action_index: usize) -> Option<Event> {
        let State::Running { phase, event } = self.state else {
            return None;
        };
        let current = self.session.phase_mut(phase as usize)?;
        if !current.mark_action_done(event as usize, action_index) {
            return None;
        }
        self.unsaved = true;
        if !current.is_event_complete(event as usize) {
            return None;
        }
        self.advance(phase, event)
    }

    /// Finish the current phase now, whatever the timer or instructions say
    pub fn complete_phase(&mut self) -> Option<Event> {
        let State::Running { phase, .. } = self.state else {
            return None;
        };
        self.finish_phase(phase)
    }

    /// End the session as completed
    ///
    /// Only a session frozen for cooking and not yet finished can end.
    pub fn complete_session(&mut self) -> Option<Event> {
        if !self.is_cooking() {
            return None;
        }
        Some(self.finish_session())
    }

    /// Stop the session; recorded progress is kept
    ///
    /// Same precondition as [`complete_session`](Self::complete_session).
    pub fn cancel_session(&mut self) -> Option<Event> {
        if !self.is_cooking() {
            return None;
        }
        self.apply(Event::Cancel);
        self.timer.release();
        self.session.set_status(SessionStatus::Cancelled);
        self.unsaved = true;
        Some(Event::Cancel)
    }

    fn is_cooking(&self) -> bool {
        !self.state.is_terminal() && self.session.status() == SessionStatus::InProgress
    }

    fn advance(&mut self, phase: u8, event: u8) -> Option<Event> {
        let count = self.session.phases().get(phase as usize)?.event_count();
        if event as usize + 1 < count {
            self.apply(Event::EventCompleted);
            Some(Event::EventCompleted)
        } else {
            self.finish_phase(phase)
        }
    }

    fn finish_phase(&mut self, phase: u8) -> Option<Event> {
        self.apply(Event::PhaseFinished);
        self.timer.release();

        let next = phase as usize + 1;
        if next < self.session.phases().len() {
            self.apply(Event::NextPhase);
            self.enter_phase(next as u8);
            Some(Event::NextPhase)
        } else {
            Some(self.finish_session())
        }
    }

    fn finish_session(&mut self) -> Event {
        self.apply(Event::SessionFinished);
        self.timer.release();
        self.session.set_status(SessionStatus::Completed);
        self.session.set_current_phase(None);
        self.unsaved = true;
        Event::SessionFinished
    }

    fn enter_phase(&mut self, phase: u8) {
        self.session.set_current_phase(Some(phase));
        self.unsaved = true;
        self.arm_timer(phase);
    }

    fn arm_timer(&mut self, phase: u8) {
        let minutes = self
            .session
            .phases()
            .get(phase as usize)
            .map_or(0, |p| p.total_duration_min());
        self.timer.arm(minutes as u32 * 60);
    }

    fn first_open_event(&self, phase: u8) -> Option<u8> {
        let current = self.session.phases().get(phase as usize)?;
        let open = (0..current.event_count()).find(|i| !current.is_event_complete(*i));
        let index = open.unwrap_or(current.event_count().saturating_sub(1));
        Some(index as u8)
    }

    fn apply(&mut self, event: Event) {
        self.state = self.state.transition(event);
    }
}
