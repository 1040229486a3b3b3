//! Session data model
//!
//! Items, batches and the session aggregate that owns them.

pub mod batch;
pub mod cooking;
pub mod ids;
pub mod item;

pub use batch::{CookingBatch, MAX_BATCHES, MAX_NOTE_LEN};
pub use cooking::{CookingSession, PlanMode, SessionError, SessionStatus};
pub use ids::{BatchId, ItemId, PhaseId, SessionId};
pub use item::{bounded_label, ItemName, SessionItem, MAX_ITEMS, MAX_NAME_LEN};
