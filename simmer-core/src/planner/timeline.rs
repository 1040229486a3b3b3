//! Instruction timeline generation
//!
//! Turns staggered items into insert / shake / remove actions and
//! consolidates actions falling on the same minute into a single event.

use heapless::Vec;

use super::phase::{ActionKind, EventAction, PhaseEvent, PhaseItem, MAX_ACTIONS};

/// Actions and the events grouping them, both in chronological order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Timeline {
    pub actions: Vec<EventAction, MAX_ACTIONS>,
    pub events: Vec<PhaseEvent, MAX_ACTIONS>,
}

/// Minute at which an item needs its shake/flip
pub fn shake_minute(item: &PhaseItem) -> u16 {
    item.start_offset_min + item.time_min / 2
}

/// Generate the consolidated timeline for one phase
///
/// Within a minute, actions keep generation order: member order first, then
/// insert, shake, remove for each member.
pub fn generate_timeline(items: &[PhaseItem]) -> Timeline {
    let mut raw: Vec<(u16, u8, EventAction), MAX_ACTIONS> = Vec::new();

    let mut emit = |minute: u16, kind: ActionKind, item: &PhaseItem| {
        let seq = raw.len() as u8;
        let action = EventAction {
            kind,
            item: item.id,
            done: false,
        };
        let _ = raw.push((minute, seq, action));
    };

    for item in items {
        emit(item.start_offset_min, ActionKind::Insert, item);
        if item.shake_halfway {
            emit(shake_minute(item), ActionKind::Shake, item);
        }
        emit(item.end_offset_min, ActionKind::Remove, item);
    }

    raw.sort_unstable_by_key(|(minute, seq, _)| (*minute, *seq));

    let mut timeline = Timeline::default();
    for (minute, _, action) in raw {
        let index = timeline.actions.len() as u8;
        if timeline.actions.push(action).is_err() {
            break;
        }
        match timeline.events.last_mut() {
            Some(event) if event.minute == minute => event.action_count += 1,
            _ => {
                let _ = timeline.events.push(PhaseEvent::new(minute, index, 1));
            }
        }
    }

    timeline
}
