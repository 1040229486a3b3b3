//! Manual batches and the operations that edit them
//!
//! A batch is an ordered list of item ids the user wants cooked together.
//! Batch operations live on [`CookingSession`] so that an item's
//! `batch_id` and the batch member lists can never disagree: every item is
//! in at most one batch, and appears in that batch's list exactly when its
//! `batch_id` names the batch.

use heapless::{String, Vec};

use super::cooking::{CookingSession, SessionError};
use super::ids::{allocate_id, BatchId, ItemId};
use super::item::{bounded_label, SessionItem, MAX_ITEMS};
use crate::config::CookingConfig;
use crate::planner::grouping::{group_by_temperature, rounded_average};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum batches per session
pub const MAX_BATCHES: usize = MAX_ITEMS;

/// Maximum batch note length (bytes)
pub const MAX_NOTE_LEN: usize = 48;

/// User-defined cooking group
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CookingBatch {
    id: BatchId,
    order: u8,
    items: Vec<ItemId, MAX_ITEMS>,
    note: Option<String<MAX_NOTE_LEN>>,
}

impl CookingBatch {
    /// Empty batch at sequence position `order`
    pub fn new(id: BatchId, order: u8) -> Self {
        Self {
            id,
            order,
            items: Vec::new(),
            note: None,
        }
    }

    /// Batch pre-filled with members (extra ids beyond capacity are dropped)
    pub fn with_items(id: BatchId, order: u8, items: &[ItemId]) -> Self {
        Self {
            id,
            order,
            items: items.iter().copied().take(MAX_ITEMS).collect(),
            note: None,
        }
    }

    pub fn id(&self) -> BatchId {
        self.id
    }

    /// Sequence position; lower cooks first
    pub fn order(&self) -> u8 {
        self.order
    }

    /// Members in cooking order
    pub fn item_ids(&self) -> &[ItemId] {
        &self.items
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn contains(&self, item: ItemId) -> bool {
        self.items.contains(&item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, item: ItemId) -> Option<usize> {
        self.items.iter().position(|id| *id == item)
    }

    pub(super) fn remove_member(&mut self, item: ItemId) {
        if let Some(index) = self.position(item) {
            self.items.remove(index);
        }
    }
}

impl CookingSession {
    pub fn batches(&self) -> &[CookingBatch] {
        &self.batches
    }

    pub fn batch(&self, id: BatchId) -> Option<&CookingBatch> {
        self.batches.iter().find(|b| b.id == id)
    }

    /// Append an empty batch at the end of the sequence
    pub fn create_batch(&mut self) -> Result<BatchId, SessionError> {
        self.ensure_editable()?;
        if self.batches.is_full() {
            return Err(SessionError::CapacityExceeded);
        }

        let batches = &self.batches;
        let id = BatchId(allocate_id(&mut self.next_batch_id, |id| {
            batches.iter().any(|b| b.id.0 == id)
        }));
        let order = self.batches.len() as u8;
        self.batches
            .push(CookingBatch::new(id, order))
            .map_err(|_| SessionError::CapacityExceeded)?;
        Ok(id)
    }

    /// Delete a batch; its members become unassigned
    ///
    /// Remaining batches keep their relative order and are renumbered
    /// `0..n`.
    pub fn delete_batch(&mut self, id: BatchId) -> Result<(), SessionError> {
        self.ensure_editable()?;
        let index = self.batch_index(id)?;
        let removed = self.batches.remove(index);

        for member in removed.items.iter() {
            if let Some(item) = self.item_mut(*member) {
                item.set_batch(None);
            }
        }
        self.renumber_batches();
        Ok(())
    }

    /// Move an item between batches (or to/from the unassigned pool)
    ///
    /// `from` must match the item's current assignment. `target_index`
    /// places the item in the destination list; an index past the end, or
    /// `None`, appends. Moving within the same batch to a different index
    /// is a reorder.
    pub fn move_item_between_batches(
        &mut self,
        item: ItemId,
        from: Option<BatchId>,
        to: Option<BatchId>,
        target_index: Option<usize>,
    ) -> Result<(), SessionError> {
        self.ensure_editable()?;
        let current = self
            .item(item)
            .ok_or(SessionError::UnknownItem(item))?
            .batch_id();
        if current != from {
            return Err(SessionError::ItemNotInSource(item));
        }

        let to_index = match to {
            Some(batch) => Some(self.batch_index(batch)?),
            None => None,
        };

        if from == to {
            let (Some(batch_index), Some(target)) = (to_index, target_index) else {
                return Ok(());
            };
            let batch = &self.batches[batch_index];
            let Some(position) = batch.position(item) else {
                return Err(SessionError::ItemNotInSource(item));
            };
            let target = target.min(batch.len() - 1);
            return self.reorder_at(batch_index, position, target);
        }

        if let Some(index) = to_index {
            if self.batches[index].items.is_full() {
                return Err(SessionError::CapacityExceeded);
            }
        }

        if let Some(source) = from {
            let index = self.batch_index(source)?;
            self.batches[index].remove_member(item);
        }
        if let Some(index) = to_index {
            let members = &mut self.batches[index].items;
            let at = target_index.unwrap_or(members.len()).min(members.len());
            members
                .insert(at, item)
                .map_err(|_| SessionError::CapacityExceeded)?;
        }
        if let Some(entry) = self.item_mut(item) {
            entry.set_batch(to);
        }
        Ok(())
    }

    /// Move the member at `from_index` to `to_index` within one batch
    pub fn reorder_items_in_batch(
        &mut self,
        batch: BatchId,
        from_index: usize,
        to_index: usize,
    ) -> Result<(), SessionError> {
        self.ensure_editable()?;
        let index = self.batch_index(batch)?;
        self.reorder_at(index, from_index, to_index)
    }

    /// Propose batches from automatic temperature grouping
    ///
    /// Nothing is applied; pass the result to
    /// [`apply_batch_suggestion`](Self::apply_batch_suggestion) to accept it.
    pub fn auto_suggest_batches(&self, config: &CookingConfig) -> Vec<CookingBatch, MAX_BATCHES> {
        // Session items never exceed MAX_ITEMS, so grouping cannot fail here
        group_by_temperature(&self.items, config.group_threshold_c)
            .unwrap_or_default()
            .iter()
            .take(MAX_BATCHES)
            .enumerate()
            .map(|(order, cluster)| {
                let ids: Vec<ItemId, MAX_ITEMS> =
                    cluster.items.iter().map(|item| item.id()).collect();
                let id = BatchId(self.next_batch_id.wrapping_add(order as u16));
                CookingBatch::with_items(id, order as u8, &ids)
            })
            .collect()
    }

    /// Replace all batches with `batches`
    ///
    /// Batches are taken in `(order, id)` sequence and renumbered `0..n`.
    /// Unknown item ids are dropped, as is any repeat of an item already
    /// placed by an earlier batch. Duplicate batch ids get fresh ids.
    pub fn apply_batch_suggestion(&mut self, batches: &[CookingBatch]) -> Result<(), SessionError> {
        self.ensure_editable()?;
        if batches.len() > MAX_BATCHES {
            return Err(SessionError::CapacityExceeded);
        }

        let mut ordered: Vec<&CookingBatch, MAX_BATCHES> = batches.iter().collect();
        ordered.sort_unstable_by_key(|b| (b.order, b.id));

        let mut next_id = self.next_batch_id;
        let mut applied: Vec<CookingBatch, MAX_BATCHES> = Vec::new();
        let mut placed: Vec<ItemId, MAX_ITEMS> = Vec::new();

        for (order, source) in ordered.into_iter().enumerate() {
            let id = if applied.iter().any(|b| b.id == source.id) {
                BatchId(allocate_id(&mut next_id, |id| {
                    applied.iter().any(|b| b.id.0 == id) || batches.iter().any(|b| b.id.0 == id)
                }))
            } else {
                source.id
            };
            next_id = next_id.max(id.0.wrapping_add(1));

            let mut batch = CookingBatch::new(id, order as u8);
            batch.note = source.note.clone();
            for member in source.items.iter() {
                let known = self.items.iter().any(|i| i.id() == *member);
                if known && !placed.contains(member) {
                    // Both lists are bounded by the item count
                    let _ = placed.push(*member);
                    let _ = batch.items.push(*member);
                }
            }
            let _ = applied.push(batch);
        }

        for item in self.items.iter_mut() {
            item.set_batch(None);
        }
        for batch in applied.iter() {
            for member in batch.items.iter() {
                if let Some(item) = self.items.iter_mut().find(|i| i.id() == *member) {
                    item.set_batch(Some(batch.id));
                }
            }
        }
        self.batches = applied;
        self.next_batch_id = next_id;
        Ok(())
    }

    /// Attach a free-text note to a batch (`None` clears it)
    pub fn set_batch_note(&mut self, id: BatchId, note: Option<&str>) -> Result<(), SessionError> {
        self.ensure_editable()?;
        let index = self.batch_index(id)?;
        self.batches[index].note = note.map(bounded_label::<MAX_NOTE_LEN>);
        Ok(())
    }

    /// Rounded average temperature of a batch's members
    pub fn batch_temperature(&self, id: BatchId) -> Option<i16> {
        let batch = self.batch(id)?;
        let members = batch
            .items
            .iter()
            .filter_map(|m| self.item(*m))
            .map(SessionItem::temperature_c);
        let (sum, count) = members.fold((0i32, 0i32), |(s, n), t| (s + t as i32, n + 1));
        (count > 0).then(|| rounded_average(sum, count))
    }

    fn batch_index(&self, id: BatchId) -> Result<usize, SessionError> {
        self.batches
            .iter()
            .position(|b| b.id == id)
            .ok_or(SessionError::UnknownBatch(id))
    }

    fn item_mut(&mut self, id: ItemId) -> Option<&mut SessionItem> {
        self.items.iter_mut().find(|i| i.id() == id)
    }

    fn reorder_at(&mut self, batch_index: usize, from: usize, to: usize) -> Result<(), SessionError> {
        let members = &mut self.batches[batch_index].items;
        if from >= members.len() || to >= members.len() {
            return Err(SessionError::IndexOutOfRange);
        }
        if from != to {
            let moved = members.remove(from);
            members
                .insert(to, moved)
                .map_err(|_| SessionError::CapacityExceeded)?;
        }
        Ok(())
    }

    fn renumber_batches(&mut self) {
        self.batches.sort_unstable_by_key(|b| (b.order, b.id));
        for (order, batch) in self.batches.iter_mut().enumerate() {
            batch.order = order as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ItemLimits;
    use crate::session::SessionId;
    use proptest::prelude::*;
    use std::vec::Vec as StdVec;

    fn session(temps: &[i16]) -> (CookingSession, StdVec<ItemId>) {
        let mut session = CookingSession::new(SessionId(1));
        let limits = ItemLimits::default();
        let ids = temps
            .iter()
            .map(|t| session.add_item("item", *t as f32, 10.0, false, &limits).unwrap())
            .collect();
        (session, ids)
    }

    /// Every item is in at most one batch and agrees with its `batch_id`
    fn assert_consistent(session: &CookingSession) {
        for item in session.items() {
            let holders: StdVec<_> = session
                .batches()
                .iter()
                .filter(|b| b.contains(item.id()))
                .map(|b| b.id())
                .collect();
            assert!(holders.len() <= 1);
            assert_eq!(holders.first().copied(), item.batch_id());
        }
        for batch in session.batches() {
            for (i, member) in batch.item_ids().iter().enumerate() {
                assert!(!batch.item_ids()[i + 1..].contains(member));
            }
        }
    }

    #[test]
    fn test_create_and_delete_batch() {
        let (mut session, ids) = session(&[200, 180]);
        let a = session.create_batch().unwrap();
        let b = session.create_batch().unwrap();
        assert_ne!(a, b);
        assert_eq!(session.batch(b).unwrap().order(), 1);

        session.move_item_between_batches(ids[0], None, Some(a), None).unwrap();
        session.delete_batch(a).unwrap();

        assert!(session.item(ids[0]).unwrap().batch_id().is_none());
        assert_eq!(session.batches().len(), 1);
        assert_eq!(session.batch(b).unwrap().order(), 0);
        assert_eq!(session.delete_batch(a), Err(SessionError::UnknownBatch(a)));
        assert_consistent(&session);
    }

    #[test]
    fn test_move_between_batches() {
        let (mut session, ids) = session(&[200, 200, 200]);
        let a = session.create_batch().unwrap();
        let b = session.create_batch().unwrap();

        for id in &ids {
            session.move_item_between_batches(*id, None, Some(a), None).unwrap();
        }
        assert_eq!(session.batch(a).unwrap().item_ids(), &ids[..]);

        session
            .move_item_between_batches(ids[1], Some(a), Some(b), Some(0))
            .unwrap();
        assert_eq!(session.batch(a).unwrap().item_ids(), &[ids[0], ids[2]]);
        assert_eq!(session.batch(b).unwrap().item_ids(), &[ids[1]]);
        assert_eq!(session.item(ids[1]).unwrap().batch_id(), Some(b));

        // Back to the pool
        session.move_item_between_batches(ids[1], Some(b), None, None).unwrap();
        assert!(session.batch(b).unwrap().is_empty());
        assert_eq!(session.unassigned_items().count(), 1);
        assert_consistent(&session);
    }

    #[test]
    fn test_move_insert_position_clamped() {
        let (mut session, ids) = session(&[200, 200]);
        let a = session.create_batch().unwrap();
        session.move_item_between_batches(ids[0], None, Some(a), None).unwrap();
        session
            .move_item_between_batches(ids[1], None, Some(a), Some(99))
            .unwrap();
        assert_eq!(session.batch(a).unwrap().item_ids(), &[ids[0], ids[1]]);
    }

    #[test]
    fn test_move_rejects_wrong_source() {
        let (mut session, ids) = session(&[200]);
        let a = session.create_batch().unwrap();
        let b = session.create_batch().unwrap();
        session.move_item_between_batches(ids[0], None, Some(a), None).unwrap();

        let before = session.clone();
        assert_eq!(
            session.move_item_between_batches(ids[0], Some(b), None, None),
            Err(SessionError::ItemNotInSource(ids[0]))
        );
        assert_eq!(
            session.move_item_between_batches(ids[0], Some(a), Some(BatchId(77)), None),
            Err(SessionError::UnknownBatch(BatchId(77)))
        );
        assert_eq!(
            session.move_item_between_batches(ItemId(99), None, Some(a), None),
            Err(SessionError::UnknownItem(ItemId(99)))
        );
        assert_eq!(session, before);
    }

    #[test]
    fn test_move_within_batch_reorders() {
        let (mut session, ids) = session(&[200, 200, 200]);
        let a = session.create_batch().unwrap();
        for id in &ids {
            session.move_item_between_batches(*id, None, Some(a), None).unwrap();
        }
        session
            .move_item_between_batches(ids[0], Some(a), Some(a), Some(2))
            .unwrap();
        assert_eq!(session.batch(a).unwrap().item_ids(), &[ids[1], ids[2], ids[0]]);
    }

    #[test]
    fn test_reorder_items_in_batch() {
        let (mut session, ids) = session(&[200, 200, 200]);
        let a = session.create_batch().unwrap();
        for id in &ids {
            session.move_item_between_batches(*id, None, Some(a), None).unwrap();
        }
        session.reorder_items_in_batch(a, 2, 0).unwrap();
        assert_eq!(session.batch(a).unwrap().item_ids(), &[ids[2], ids[0], ids[1]]);

        assert_eq!(
            session.reorder_items_in_batch(a, 3, 0),
            Err(SessionError::IndexOutOfRange)
        );
    }

    #[test]
    fn test_auto_suggest_then_apply() {
        let (mut session, ids) = session(&[180, 185, 220]);
        let config = CookingConfig::default();

        let suggestion = session.auto_suggest_batches(&config);
        assert_eq!(suggestion.len(), 2);
        assert_eq!(suggestion[0].item_ids(), &[ids[0], ids[1]]);
        assert_eq!(suggestion[1].item_ids(), &[ids[2]]);
        // Suggesting does not touch the session
        assert!(session.batches().is_empty());

        session.apply_batch_suggestion(&suggestion).unwrap();
        assert_eq!(session.batches().len(), 2);
        assert_eq!(session.item(ids[2]).unwrap().batch_id(), Some(suggestion[1].id()));
        assert_eq!(session.batch_temperature(suggestion[0].id()), Some(183));
        assert_consistent(&session);

        // Fresh ids do not collide with the applied ones
        let c = session.create_batch().unwrap();
        assert!(suggestion.iter().all(|b| b.id() != c));
    }

    #[test]
    fn test_apply_drops_unknown_and_repeated_items() {
        let (mut session, ids) = session(&[200, 200]);
        let first = CookingBatch::with_items(BatchId(5), 1, &[ids[0], ItemId(42)]);
        let second = CookingBatch::with_items(BatchId(5), 0, &[ids[1], ids[0]]);

        session.apply_batch_suggestion(&[first, second]).unwrap();

        let batches = session.batches();
        assert_eq!(batches.len(), 2);
        // Order 0 comes first and claims both items
        assert_eq!(batches[0].item_ids(), &[ids[1], ids[0]]);
        assert!(batches[1].is_empty());
        assert_ne!(batches[0].id(), batches[1].id());
        assert_consistent(&session);
    }

    #[test]
    fn test_batch_ids_stay_unique_after_wrap() {
        let (mut session, _) = session(&[200]);
        let first = session.create_batch().unwrap();
        session.next_batch_id = u16::MAX;

        let last = session.create_batch().unwrap();
        let wrapped = session.create_batch().unwrap();

        assert_eq!(last, BatchId(u16::MAX));
        assert_eq!(first, BatchId(1));
        assert_eq!(wrapped, BatchId(2));
        assert_eq!(session.batches().len(), 3);
    }

    #[test]
    fn test_batch_note() {
        let (mut session, _) = session(&[200]);
        let a = session.create_batch().unwrap();
        session.set_batch_note(a, Some("crispy, second basket")).unwrap();
        assert_eq!(session.batch(a).unwrap().note(), Some("crispy, second basket"));
        session.set_batch_note(a, None).unwrap();
        assert_eq!(session.batch(a).unwrap().note(), None);
    }

    #[test]
    fn test_batch_temperature_empty() {
        let (mut session, _) = session(&[200]);
        let a = session.create_batch().unwrap();
        assert_eq!(session.batch_temperature(a), None);
        assert_eq!(session.batch_temperature(BatchId(9)), None);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Move { item: usize, to: Option<usize>, index: Option<usize> },
        Reorder { batch: usize, from: usize, to: usize },
        Delete { batch: usize },
        Create,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..6, proptest::option::of(0usize..4), proptest::option::of(0usize..8))
                .prop_map(|(item, to, index)| Op::Move { item, to, index }),
            (0usize..4, 0usize..6, 0usize..6)
                .prop_map(|(batch, from, to)| Op::Reorder { batch, from, to }),
            (0usize..4).prop_map(|batch| Op::Delete { batch }),
            Just(Op::Create),
        ]
    }

    proptest! {
        #[test]
        fn prop_item_in_at_most_one_batch(ops in proptest::collection::vec(op(), 0..40)) {
            let (mut session, ids) = session(&[180, 190, 200, 210, 220, 230]);
            for _ in 0..3 {
                session.create_batch().unwrap();
            }

            for op in ops {
                let batch_ids: StdVec<BatchId> = session.batches().iter().map(|b| b.id()).collect();
                let pick = |i: usize| batch_ids.get(i).copied();
                // Errors are fine; they must leave the session consistent
                let _ = match op {
                    Op::Move { item, to, index } => {
                        let id = ids[item];
                        let from = session.item(id).unwrap().batch_id();
                        session.move_item_between_batches(id, from, to.and_then(pick), index)
                    }
                    Op::Reorder { batch, from, to } => match pick(batch) {
                        Some(b) => session.reorder_items_in_batch(b, from, to),
                        None => Ok(()),
                    },
                    Op::Delete { batch } => match pick(batch) {
                        Some(b) => session.delete_batch(b),
                        None => Ok(()),
                    },
                    Op::Create => session.create_batch().map(|_| ()),
                };
                assert_consistent(&session);
            }
        }
    }
}
