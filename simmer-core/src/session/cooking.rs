//! The cooking session aggregate
//!
//! A session owns its items, batches and (once cooking starts) the frozen
//! phase plan. All mutation goes through methods on [`CookingSession`] so the
//! item/batch invariants are enforced in one place.

use heapless::Vec;

use super::batch::{CookingBatch, MAX_BATCHES};
use super::ids::{allocate_id, ItemId, SessionId};
use super::item::{SessionItem, MAX_ITEMS};
use crate::config::{CookingConfig, ItemLimits};
use crate::planner::{
    optimize_cooking_session, CookingPhase, GroupingMode, OptimizationResult, PlanError,
    PlanSummary, MAX_PHASES,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SessionStatus {
    /// Items and batches can be edited
    #[default]
    Building,
    /// Plan frozen, execution under way
    InProgress,
    /// Every phase finished
    Completed,
    /// Stopped by the user
    Cancelled,
}

impl SessionStatus {
    /// Completed or cancelled sessions never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Cancelled)
    }
}

/// Rejected session operations
///
/// A rejected operation leaves the session unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionError {
    /// Items and batches are frozen once cooking starts
    NotEditable,
    /// Item or batch limit reached
    CapacityExceeded,
    /// No item with this id
    UnknownItem(ItemId),
    /// No batch with this id
    UnknownBatch(super::ids::BatchId),
    /// The item is not where the caller said it was
    ItemNotInSource(ItemId),
    /// Position outside the batch's member list
    IndexOutOfRange,
    /// The plan has no phases
    NothingToCook,
}

impl From<PlanError> for SessionError {
    fn from(_: PlanError) -> Self {
        SessionError::CapacityExceeded
    }
}

/// Where phases come from when cooking starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlanMode {
    /// Automatic temperature grouping over all items
    Auto,
    /// The session's own batches
    Batches,
}

/// Live cooking session
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CookingSession {
    id: SessionId,
    status: SessionStatus,
    pub(super) items: Vec<SessionItem, MAX_ITEMS>,
    pub(super) batches: Vec<CookingBatch, MAX_BATCHES>,
    phases: Vec<CookingPhase, MAX_PHASES>,
    summary: PlanSummary,
    current_phase: Option<u8>,
    next_item_id: u16,
    pub(super) next_batch_id: u16,
}

impl CookingSession {
    /// Create an empty session in the building state
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            status: SessionStatus::Building,
            items: Vec::new(),
            batches: Vec::new(),
            phases: Vec::new(),
            summary: PlanSummary::default(),
            current_phase: None,
            next_item_id: 1,
            next_batch_id: 1,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn items(&self) -> &[SessionItem] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&SessionItem> {
        self.items.iter().find(|i| i.id() == id)
    }

    /// Items not assigned to any batch
    pub fn unassigned_items(&self) -> impl Iterator<Item = &SessionItem> + '_ {
        self.items.iter().filter(|i| i.batch_id().is_none())
    }

    /// Frozen plan (empty while building)
    pub fn phases(&self) -> &[CookingPhase] {
        &self.phases
    }

    /// Summary of the frozen plan
    pub fn summary(&self) -> PlanSummary {
        self.summary
    }

    /// Index of the phase being cooked, once execution has started
    pub fn current_phase_index(&self) -> Option<u8> {
        self.current_phase
    }

    /// Add an item; temperature and time are sanitized against `limits`
    pub fn add_item(
        &mut self,
        name: &str,
        temperature_c: f32,
        time_min: f32,
        shake_halfway: bool,
        limits: &ItemLimits,
    ) -> Result<ItemId, SessionError> {
        self.ensure_editable()?;
        if self.items.is_full() {
            return Err(SessionError::CapacityExceeded);
        }

        let items = &self.items;
        let id = ItemId(allocate_id(&mut self.next_item_id, |id| {
            items.iter().any(|i| i.id().0 == id)
        }));
        let item = SessionItem::with_limits(id, name, temperature_c, time_min, shake_halfway, limits);
        self.items
            .push(item)
            .map_err(|_| SessionError::CapacityExceeded)?;
        Ok(id)
    }

    /// Replace an item's user-editable fields
    pub fn update_item(
        &mut self,
        id: ItemId,
        name: &str,
        temperature_c: f32,
        time_min: f32,
        shake_halfway: bool,
        limits: &ItemLimits,
    ) -> Result<(), SessionError> {
        self.ensure_editable()?;
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id() == id)
            .ok_or(SessionError::UnknownItem(id))?;
        item.edit(name, temperature_c, time_min, shake_halfway, limits);
        Ok(())
    }

    /// Remove an item, dropping it from its batch as well
    pub fn remove_item(&mut self, id: ItemId) -> Result<(), SessionError> {
        self.ensure_editable()?;
        let index = self
            .items
            .iter()
            .position(|i| i.id() == id)
            .ok_or(SessionError::UnknownItem(id))?;

        if let Some(batch_id) = self.items[index].batch_id() {
            if let Some(batch) = self.batches.iter_mut().find(|b| b.id() == batch_id) {
                batch.remove_member(id);
            }
        }
        self.items.remove(index);
        Ok(())
    }

    /// Compute the plan without committing it
    pub fn plan(
        &self,
        mode: PlanMode,
        config: &CookingConfig,
    ) -> Result<OptimizationResult, SessionError> {
        let grouping = match mode {
            PlanMode::Auto => GroupingMode::Auto,
            PlanMode::Batches => GroupingMode::Manual(&self.batches),
        };
        Ok(optimize_cooking_session(&self.items, grouping, config)?)
    }

    /// Freeze the plan and move to `InProgress`
    ///
    /// Writes each item's phase and offsets. An empty plan is rejected and
    /// the session stays in `Building`.
    pub fn begin_cooking(
        &mut self,
        mode: PlanMode,
        config: &CookingConfig,
    ) -> Result<PlanSummary, SessionError> {
        self.ensure_editable()?;
        let result = self.plan(mode, config)?;
        if result.is_empty() {
            return Err(SessionError::NothingToCook);
        }

        for phase in &result.phases {
            for member in phase.items() {
                if let Some(item) = self.items.iter_mut().find(|i| i.id() == member.id) {
                    item.set_schedule(phase.id(), member.start_offset_min, member.end_offset_min);
                }
            }
        }

        self.summary = result.summary();
        self.phases = result.phases;
        self.status = SessionStatus::InProgress;
        self.current_phase = None;
        Ok(self.summary)
    }

    pub(crate) fn ensure_editable(&self) -> Result<(), SessionError> {
        if self.status == SessionStatus::Building {
            Ok(())
        } else {
            Err(SessionError::NotEditable)
        }
    }

    pub(crate) fn phase_mut(&mut self, index: usize) -> Option<&mut CookingPhase> {
        self.phases.get_mut(index)
    }

    pub(crate) fn set_current_phase(&mut self, index: Option<u8>) {
        self.current_phase = index;
    }

    pub(crate) fn set_status(&mut self, status: SessionStatus) {
        self.status = status;
    }
}
