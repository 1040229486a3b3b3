//! Staggered starts
//!
//! Items in a phase start at different times so that they all finish when
//! the phase ends.

use heapless::Vec;

use super::phase::PhaseItem;
use crate::session::{SessionItem, MAX_ITEMS};

/// Result of staggering one cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stagger {
    /// Members with start/end offsets, in input order
    pub items: Vec<PhaseItem, MAX_ITEMS>,
    /// Longest member cook time (minutes)
    pub duration_min: u16,
    /// Sequential cook time minus phase duration (minutes)
    pub time_saved_min: u16,
}

/// Compute start/end offsets so every member finishes at phase end
pub fn stagger_items(members: &[&SessionItem]) -> Stagger {
    let duration_min = members.iter().map(|m| m.time_min()).max().unwrap_or(0);
    let sequential_min: u32 = members.iter().map(|m| m.time_min() as u32).sum();

    let mut items = Vec::new();
    for member in members {
        let _ = items.push(PhaseItem {
            id: member.id(),
            name: member.label().clone(),
            time_min: member.time_min(),
            shake_halfway: member.shake_halfway(),
            start_offset_min: duration_min - member.time_min(),
            end_offset_min: duration_min,
        });
    }

    Stagger {
        items,
        duration_min,
        time_saved_min: sequential_min.saturating_sub(duration_min as u32) as u16,
    }
}
