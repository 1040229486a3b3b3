//! Per-phase countdown ticker
//!
//! A ticker is bound to the tick lease of one phase. The session loop
//! creates it when the phase is entered and drops it when the lease
//! changes, so at most one ticker is ever alive and a late tick from a
//! previous phase is rejected by the runner.

use embassy_time::{Duration, Ticker};
use simmer_core::scheduler::TickLease;

/// Nominal tick period
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Periodic tick source for one phase
pub struct PhaseTicker {
    lease: TickLease,
    ticker: Ticker,
}

impl PhaseTicker {
    pub fn new(lease: TickLease, period: Duration) -> Self {
        debug!("Ticker armed for lease {}", lease.generation());
        Self {
            lease,
            ticker: Ticker::every(period),
        }
    }

    pub fn lease(&self) -> TickLease {
        self.lease
    }

    /// Wait for the next tick
    pub async fn next(&mut self) -> TickLease {
        self.ticker.next().await;
        self.lease
    }

    /// Restart the period from now
    ///
    /// Called when the countdown resumes so time spent paused is not
    /// replayed as a burst of ticks.
    pub fn reset(&mut self) {
        self.ticker.reset();
    }
}

/// Keep `ticker` bound to `lease`, replacing it when the phase changes
pub fn sync_ticker(ticker: &mut Option<PhaseTicker>, lease: Option<TickLease>, period: Duration) {
    if ticker.as_ref().map(PhaseTicker::lease) == lease {
        return;
    }
    // Release the old phase's ticker before arming the next
    *ticker = None;
    *ticker = lease.map(|lease| PhaseTicker::new(lease, period));
}
