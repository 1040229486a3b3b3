//! Items being cooked in a session

use heapless::String;

use super::ids::{BatchId, ItemId, PhaseId};
use crate::config::ItemLimits;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum item name length (bytes)
pub const MAX_NAME_LEN: usize = 24;

/// Maximum items per session
pub const MAX_ITEMS: usize = 16;

/// Display name of an item
pub type ItemName = String<MAX_NAME_LEN>;

/// Copy `text` into a bounded string, truncating at a character boundary
pub fn bounded_label<const N: usize>(text: &str) -> String<N> {
    let mut label = String::new();
    for ch in text.chars() {
        if label.push(ch).is_err() {
            break;
        }
    }
    label
}

/// One thing being cooked
///
/// Temperature and time are sanitized on the way in. The phase assignment
/// and offsets are written by the planner when the session starts cooking;
/// the batch assignment only changes through the batch operations on
/// [`CookingSession`](super::CookingSession).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SessionItem {
    id: ItemId,
    name: ItemName,
    temperature_c: i16,
    time_min: u16,
    shake_halfway: bool,
    batch_id: Option<BatchId>,
    phase_id: Option<PhaseId>,
    start_offset_min: Option<u16>,
    end_offset_min: Option<u16>,
}

impl SessionItem {
    /// Create an item using the default input limits
    pub fn new(id: ItemId, name: &str, temperature_c: f32, time_min: f32, shake_halfway: bool) -> Self {
        Self::with_limits(id, name, temperature_c, time_min, shake_halfway, &ItemLimits::default())
    }

    /// Create an item, sanitizing temperature and time against `limits`
    pub fn with_limits(
        id: ItemId,
        name: &str,
        temperature_c: f32,
        time_min: f32,
        shake_halfway: bool,
        limits: &ItemLimits,
    ) -> Self {
        Self {
            id,
            name: bounded_label(name),
            temperature_c: limits.clamp_temperature(temperature_c),
            time_min: limits.clamp_time(time_min),
            shake_halfway,
            batch_id: None,
            phase_id: None,
            start_offset_min: None,
            end_offset_min: None,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub(crate) fn label(&self) -> &ItemName {
        &self.name
    }

    /// Target temperature (°C)
    pub fn temperature_c(&self) -> i16 {
        self.temperature_c
    }

    /// Cook duration (minutes)
    pub fn time_min(&self) -> u16 {
        self.time_min
    }

    pub fn shake_halfway(&self) -> bool {
        self.shake_halfway
    }

    /// Batch this item is assigned to (None = unassigned)
    pub fn batch_id(&self) -> Option<BatchId> {
        self.batch_id
    }

    /// Phase the planner placed this item in
    pub fn phase_id(&self) -> Option<PhaseId> {
        self.phase_id
    }

    /// Minute within its phase at which the item goes in
    pub fn start_offset_min(&self) -> Option<u16> {
        self.start_offset_min
    }

    /// Minute within its phase at which the item comes out
    pub fn end_offset_min(&self) -> Option<u16> {
        self.end_offset_min
    }

    pub(crate) fn edit(
        &mut self,
        name: &str,
        temperature_c: f32,
        time_min: f32,
        shake_halfway: bool,
        limits: &ItemLimits,
    ) {
        self.name = bounded_label(name);
        self.temperature_c = limits.clamp_temperature(temperature_c);
        self.time_min = limits.clamp_time(time_min);
        self.shake_halfway = shake_halfway;
    }

    pub(crate) fn set_batch(&mut self, batch_id: Option<BatchId>) {
        self.batch_id = batch_id;
    }

    pub(crate) fn set_schedule(&mut self, phase_id: PhaseId, start_min: u16, end_min: u16) {
        self.phase_id = Some(phase_id);
        self.start_offset_min = Some(start_min);
        self.end_offset_min = Some(end_min);
    }
}
