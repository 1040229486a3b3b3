//! Identifiers for session entities

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Session record identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SessionId(pub u32);

/// Item identifier, unique within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ItemId(pub u16);

/// Batch identifier, unique within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BatchId(pub u16);

/// Take the next id from `counter`, skipping zero and ids `in_use` reports
///
/// The counter wraps; callers hold far fewer live ids than the id space, so
/// a free id is always found.
pub(crate) fn allocate_id(counter: &mut u16, in_use: impl Fn(u16) -> bool) -> u16 {
    loop {
        let id = *counter;
        *counter = counter.wrapping_add(1);
        if id != 0 && !in_use(id) {
            return id;
        }
    }
}

/// Phase identifier (its position in the plan)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhaseId(pub u8);
