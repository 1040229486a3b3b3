//! Cooking plan computation
//!
//! Pure functions turning a list of items into an ordered set of phases:
//! temperature grouping, staggered start times, instruction timelines and
//! the plan summary.

pub mod grouping;
pub mod optimizer;
pub mod phase;
pub mod stagger;
pub mod timeline;

/// Planner input outside the fixed capacities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlanError {
    /// More items than [`MAX_ITEMS`](crate::session::MAX_ITEMS)
    TooManyItems(usize),
    /// More batches than [`MAX_BATCHES`](crate::session::MAX_BATCHES)
    TooManyBatches(usize),
}

pub use grouping::{group_by_temperature, TemperatureCluster};
pub use optimizer::{
    estimate_total_time, optimize_cooking_session, GroupingMode, OptimizationResult, PlanSummary,
};
pub use phase::{
    ActionKind, CookingPhase, EventAction, Instruction, PhaseEvent, PhaseItem, MAX_ACTIONS,
    MAX_PHASES,
};
pub use stagger::{stagger_items, Stagger};
pub use timeline::{generate_timeline, shake_minute, Timeline};
