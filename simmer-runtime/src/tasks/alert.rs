//! Alert task
//!
//! Pulses the alert chain when the session loop reports an expired phase
//! countdown. Outputs are tried in order; if none works the alert is
//! dropped.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};

use simmer_core::traits::{silence_all, sound_alert, AlertOutput};

use crate::channels::AlertRequest;

/// How long an alert sounds unless silenced
pub const ALERT_PULSE: Duration = Duration::from_secs(3);

/// Sound the chain for `pulse`, then silence it
///
/// Returns the index of the output that fired.
pub async fn pulse_alert(outputs: &mut [&mut dyn AlertOutput], pulse: Duration) -> Option<usize> {
    let fired = fire(outputs);
    if fired.is_some() {
        Timer::after(pulse).await;
        silence_all(outputs);
    }
    fired
}

/// Alert task - serves alert requests forever
///
/// `Silence` arriving while an alert sounds cuts the pulse short; another
/// `Sound` starts a fresh pulse.
pub async fn alert_task<M: RawMutex>(
    requests: &Signal<M, AlertRequest>,
    outputs: &mut [&mut dyn AlertOutput],
    pulse: Duration,
) -> ! {
    info!("Alert task started");

    let mut pending: Option<AlertRequest> = None;
    loop {
        let request = match pending.take() {
            Some(request) => request,
            None => requests.wait().await,
        };
        match request {
            AlertRequest::Sound => {
                if fire(outputs).is_none() {
                    continue;
                }
                match select(Timer::after(pulse), requests.wait()).await {
                    Either::First(()) => silence_all(outputs),
                    Either::Second(AlertRequest::Sound) => {
                        debug!("Alert restarted");
                        pending = Some(AlertRequest::Sound);
                    }
                    Either::Second(AlertRequest::Silence) => {
                        debug!("Alert cut short");
                        silence_all(outputs);
                    }
                }
            }
            AlertRequest::Silence => silence_all(outputs),
        }
    }
}

fn fire(outputs: &mut [&mut dyn AlertOutput]) -> Option<usize> {
    let fired = sound_alert(outputs);
    match fired {
        Some(index) => info!("Alert sounding on output {}", index),
        None => warn!("No alert output available"),
    }
    fired
}
