//! Session loop
//!
//! Waits on cook commands and the current phase's ticker, applies them
//! through the [`SessionController`], saves a snapshot after every change
//! to the session and publishes status. Returns the session once it is
//! completed or cancelled.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Duration;

use simmer_core::scheduler::SessionRunner;
use simmer_core::session::CookingSession;
use simmer_core::store::{save_session, SessionSlot, SessionStore};

use super::ticker::{sync_ticker, PhaseTicker};
use crate::channels::{AlertRequest, CommandChannel, SessionCommand, StatusReport};
use crate::controller::SessionController;

/// Channels the session loop talks over
pub struct SessionLink<'a, M: RawMutex> {
    pub commands: &'a CommandChannel<M>,
    pub status: &'a Signal<M, StatusReport>,
    pub alerts: &'a Signal<M, AlertRequest>,
}

/// Where snapshots go
pub struct SnapshotSink<'a, S> {
    pub store: &'a mut S,
    pub slot: SessionSlot,
    /// Scratch space for encoding
    pub buffer: &'a mut [u8],
}

impl<S: SessionStore> SnapshotSink<'_, S> {
    /// Save a snapshot; failures are logged and otherwise ignored
    async fn persist(&mut self, session: &CookingSession) {
        match save_session(&mut *self.store, self.slot, session, &mut *self.buffer).await {
            Ok(()) => trace!("Session saved"),
            Err(e) => warn!("Failed to save session: {:?}", e),
        }
    }
}

/// Run a session to completion
///
/// Starts the runner if it has not started yet. `period` is the real time
/// between countdown ticks (one second on a device).
pub async fn run_session<M: RawMutex, S: SessionStore>(
    runner: SessionRunner,
    link: SessionLink<'_, M>,
    mut sink: SnapshotSink<'_, S>,
    period: Duration,
) -> CookingSession {
    info!("Session task started");

    let mut controller = SessionController::new(runner);
    controller.start();
    if controller.take_unsaved() {
        sink.persist(controller.session()).await;
    }
    link.status.signal(controller.status());

    let mut ticker: Option<PhaseTicker> = None;

    while !controller.is_finished() {
        sync_ticker(&mut ticker, controller.tick_lease(), period);

        let timer_running = controller.is_timer_running();
        let next_tick = async {
            match ticker.as_mut() {
                Some(ticker) if timer_running => ticker.next().await,
                _ => core::future::pending().await,
            }
        };
        let outcome = select(link.commands.receive(), next_tick).await;

        match outcome {
            Either::First(command) => {
                if command == SessionCommand::StartTimer {
                    if let Some(ticker) = ticker.as_mut() {
                        ticker.reset();
                    }
                }
                controller.process_command(command);
                if controller.take_unsaved() {
                    sink.persist(controller.session()).await;
                }
            }
            Either::Second(lease) => {
                if let Some(event) = controller.tick(lease) {
                    if event.needs_alert() {
                        link.alerts.signal(AlertRequest::Sound);
                    }
                }
            }
        }

        link.status.signal(controller.status());
    }

    // Ticker goes with the last phase
    drop(ticker);
    link.alerts.signal(AlertRequest::Silence);
    info!("Session finished: {:?}", controller.state());
    controller.into_session()
}
