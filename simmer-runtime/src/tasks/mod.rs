//! Async tasks
//!
//! Executor-agnostic task bodies; the application spawns them.

pub mod alert;
pub mod session;
pub mod ticker;

pub use alert::{alert_task, pulse_alert, ALERT_PULSE};
pub use session::{run_session, SessionLink, SnapshotSink};
pub use ticker::{sync_ticker, PhaseTicker, TICK_PERIOD};
