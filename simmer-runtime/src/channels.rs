//! Inter-task communication channels
//!
//! Defines the static channels used for communication between the session
//! loop, the input layer and the alert task. Uses embassy-sync primitives
//! for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use simmer_core::scheduler::Progress;
use simmer_core::state::State;

/// Channel capacity for cook commands
pub const COMMAND_CHANNEL_SIZE: usize = 8;

/// Commands from the input layer to the session loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionCommand {
    /// Start or resume the phase countdown
    StartTimer,
    /// Pause the phase countdown
    PauseTimer,
    /// Current instruction done
    CompleteEvent,
    /// One action of the current instruction done
    CompleteAction(u8),
    /// Finish the current phase now
    SkipPhase,
    /// End the session as completed
    CompleteSession,
    /// Stop the session
    Cancel,
}

/// Snapshot of the running session for the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusReport {
    pub state: State,
    pub progress: Progress,
    /// Countdown remaining in the current phase (seconds)
    pub remaining_s: u32,
    pub timer_running: bool,
}

/// Requests to the alert task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertRequest {
    /// Pulse the first working output
    Sound,
    /// Stop any alert in progress
    Silence,
}

/// Command channel type, generic over the mutex so tests can use a
/// `NoopRawMutex`
pub type CommandChannel<M> = Channel<M, SessionCommand, COMMAND_CHANNEL_SIZE>;

/// Cook commands (from buttons, touch, remote)
pub static COMMANDS: CommandChannel<CriticalSectionRawMutex> = Channel::new();

/// Latest session status (updated by the session loop)
pub static STATUS: Signal<CriticalSectionRawMutex, StatusReport> = Signal::new();

/// Alert requests (raised by the session loop on countdown expiry)
pub static ALERT: Signal<CriticalSectionRawMutex, AlertRequest> = Signal::new();
