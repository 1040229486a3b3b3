//! Phases and their instruction timelines

use core::fmt;

use heapless::Vec;

use crate::session::{ItemId, ItemName, PhaseId, MAX_ITEMS};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum phases per plan (one per item at worst)
pub const MAX_PHASES: usize = MAX_ITEMS;

/// Maximum instruction actions per phase (insert, shake, remove per item)
pub const MAX_ACTIONS: usize = MAX_ITEMS * 3;

/// An item placed in a phase, with its staggered window
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhaseItem {
    pub id: ItemId,
    pub name: ItemName,
    /// Cook duration (minutes)
    pub time_min: u16,
    pub shake_halfway: bool,
    /// Minute the item goes in
    pub start_offset_min: u16,
    /// Minute the item comes out (always the phase end)
    pub end_offset_min: u16,
}

/// What the cook has to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ActionKind {
    /// Put the item in
    Insert,
    /// Shake or flip the item
    Shake,
    /// Take the item out
    Remove,
}

impl ActionKind {
    /// Instruction verb
    pub fn verb(&self) -> &'static str {
        match self {
            ActionKind::Insert => "Add",
            ActionKind::Shake => "Shake",
            ActionKind::Remove => "Remove",
        }
    }
}

/// One instruction for one item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EventAction {
    pub kind: ActionKind,
    pub item: ItemId,
    /// Marked done by the cook
    pub done: bool,
}

/// A timestamped instruction within a phase
///
/// All actions falling on the same minute are consolidated into one event.
/// The event refers to a contiguous run of the phase's action list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhaseEvent {
    /// Minutes from phase start
    pub minute: u16,
    pub(crate) first_action: u8,
    pub(crate) action_count: u8,
}

impl PhaseEvent {
    pub(crate) fn new(minute: u16, first_action: u8, action_count: u8) -> Self {
        Self {
            minute,
            first_action,
            action_count,
        }
    }

    fn range(&self) -> core::ops::Range<usize> {
        let start = self.first_action as usize;
        start..start + self.action_count as usize
    }
}

/// One run of the heating chamber at a single temperature
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CookingPhase {
    pub(crate) id: PhaseId,
    pub(crate) order: u8,
    pub(crate) target_temp_c: i16,
    pub(crate) total_duration_min: u16,
    pub(crate) rest_after_min: u16,
    pub(crate) time_saved_min: u16,
    pub(crate) items: Vec<PhaseItem, MAX_ITEMS>,
    pub(crate) actions: Vec<EventAction, MAX_ACTIONS>,
    pub(crate) events: Vec<PhaseEvent, MAX_ACTIONS>,
}

impl CookingPhase {
    pub fn id(&self) -> PhaseId {
        self.id
    }

    /// Position in the plan (0-based)
    pub fn order(&self) -> u8 {
        self.order
    }

    /// Chamber temperature for the whole phase (°C)
    pub fn target_temp_c(&self) -> i16 {
        self.target_temp_c
    }

    /// Phase length, equal to the longest member's cook time (minutes)
    pub fn total_duration_min(&self) -> u16 {
        self.total_duration_min
    }

    /// Rest after this phase; 0 for the last phase (minutes)
    pub fn rest_after_min(&self) -> u16 {
        self.rest_after_min
    }

    /// Minutes saved versus cooking the members one after another
    pub fn time_saved_min(&self) -> u16 {
        self.time_saved_min
    }

    /// Members in cooking order
    pub fn items(&self) -> &[PhaseItem] {
        &self.items
    }

    /// Look up a member by id
    pub fn item(&self, id: ItemId) -> Option<&PhaseItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn item_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items.iter().map(|i| i.id)
    }

    /// Events in chronological order
    pub fn events(&self) -> &[PhaseEvent] {
        &self.events
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Constituent actions of the event at `index`
    pub fn event_actions(&self, index: usize) -> &[EventAction] {
        match self.events.get(index) {
            Some(event) => &self.actions[event.range()],
            None => &[],
        }
    }

    /// Human-readable instruction for the event at `index`
    ///
    /// Consolidated actions are joined with `", "`, e.g.
    /// `"Remove chicken, Remove potatoes"`.
    pub fn instruction(&self, index: usize) -> Option<Instruction<'_>> {
        self.events.get(index).map(|_| Instruction {
            phase: self,
            actions: self.event_actions(index),
        })
    }

    /// An event is complete once every constituent action is done
    pub fn is_event_complete(&self, index: usize) -> bool {
        let actions = self.event_actions(index);
        !actions.is_empty() && actions.iter().all(|a| a.done)
    }

    /// Mark a single constituent action of an event as done
    pub fn mark_action_done(&mut self, event_index: usize, action_index: usize) -> bool {
        let Some(range) = self.events.get(event_index).map(PhaseEvent::range) else {
            return false;
        };
        if action_index >= range.len() {
            return false;
        }
        self.actions[range.start + action_index].done = true;
        true
    }

    /// Mark every constituent action of an event as done
    pub(crate) fn mark_event_done(&mut self, index: usize) -> bool {
        let Some(range) = self.events.get(index).map(PhaseEvent::range) else {
            return false;
        };
        for action in &mut self.actions[range] {
            action.done = true;
        }
        true
    }
}

/// Display adapter for a consolidated event instruction
pub struct Instruction<'a> {
    phase: &'a CookingPhase,
    actions: &'a [EventAction],
}

impl fmt::Display for Instruction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, action) in self.actions.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            let name = self
                .phase
                .item(action.item)
                .map(|item| item.name.as_str())
                .unwrap_or("?");
            write!(f, "{} {}", action.kind.verb(), name)?;
        }
        Ok(())
    }
}
