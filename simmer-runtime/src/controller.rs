//! Session controller
//!
//! The synchronous brain of the session loop: turns cook commands and
//! ticks into runner operations and reports status. Kept free of async so
//! it can be tested directly.

use simmer_core::scheduler::{SessionRunner, TickLease};
use simmer_core::session::CookingSession;
use simmer_core::state::{Event, State};

use crate::channels::{SessionCommand, StatusReport};

/// Seconds credited per tick
pub const TICK_SECONDS: u32 = 1;

/// Controller state for a running session
pub struct SessionController {
    runner: SessionRunner,
}

impl SessionController {
    pub fn new(runner: SessionRunner) -> Self {
        Self { runner }
    }

    /// Start cooking if the session has not started yet
    pub fn start(&mut self) -> Option<Event> {
        let event = self.runner.start();
        if event.is_some() {
            info!("Session started, {} phases", self.runner.session().phases().len());
        }
        event
    }

    pub fn runner(&self) -> &SessionRunner {
        &self.runner
    }

    pub fn state(&self) -> State {
        self.runner.state()
    }

    pub fn is_finished(&self) -> bool {
        self.runner.state().is_terminal()
    }

    /// Lease the current phase's ticker must hold
    pub fn tick_lease(&self) -> Option<TickLease> {
        self.runner.tick_lease()
    }

    pub fn is_timer_running(&self) -> bool {
        self.runner.is_timer_running()
    }

    /// Whether the session changed since the last call
    pub fn take_unsaved(&mut self) -> bool {
        self.runner.take_unsaved()
    }

    /// Apply a cook command
    ///
    /// Returns the state machine event it caused, if any. Timer commands
    /// never cause one.
    pub fn process_command(&mut self, command: SessionCommand) -> Option<Event> {
        debug!("Command: {:?}", command);
        let event = match command {
            SessionCommand::StartTimer => {
                if !self.runner.start_timer() {
                    debug!("Timer not started");
                }
                None
            }
            SessionCommand::PauseTimer => {
                self.runner.pause_timer();
                None
            }
            SessionCommand::CompleteEvent => self.runner.complete_event(),
            SessionCommand::CompleteAction(index) => self.runner.complete_action(index as usize),
            SessionCommand::SkipPhase => self.runner.complete_phase(),
            SessionCommand::CompleteSession => self.runner.complete_session(),
            SessionCommand::Cancel => self.runner.cancel_session(),
        };
        if let Some(event) = event {
            info!("Event: {:?} -> {:?}", event, self.runner.state());
        }
        event
    }

    /// Credit one tick from the ticker holding `lease`
    pub fn tick(&mut self, lease: TickLease) -> Option<Event> {
        let event = self.runner.tick(lease, TICK_SECONDS);
        trace!("Tick, {} s left", self.runner.remaining_s());
        if let Some(event) = event {
            info!("Phase countdown finished: {:?}", event);
        }
        event
    }

    pub fn status(&self) -> StatusReport {
        StatusReport {
            state: self.runner.state(),
            progress: self.runner.progress(),
            remaining_s: self.runner.remaining_s(),
            timer_running: self.runner.is_timer_running(),
        }
    }

    pub fn session(&self) -> &CookingSession {
        self.runner.session()
    }

    pub fn into_session(self) -> CookingSession {
        self.runner.into_session()
    }
}
