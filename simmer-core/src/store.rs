//! Session snapshot persistence
//!
//! Sessions are stored as postcard-encoded snapshots in a key-value store
//! (flash on a device, anything on a host). Each snapshot carries a magic
//! number and format version so stale or foreign records are rejected
//! rather than misread.

use core::future::Future;

use crate::session::CookingSession;

/// Snapshot magic ("SIMR")
pub const SNAPSHOT_MAGIC: u32 = 0x5349_4D52;

/// Snapshot format version
pub const SNAPSHOT_VERSION: u8 = 1;

/// Buffer size that fits the largest possible session snapshot
pub const MAX_SNAPSHOT_SIZE: usize = 20 * 1024;

/// Storage slot a session snapshot lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionSlot(pub u8);

impl SessionSlot {
    /// Slot holding the session currently being built or cooked
    pub const ACTIVE: SessionSlot = SessionSlot(0);
}

/// Errors from snapshot storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Nothing stored in the slot
    NotFound,
    /// Buffer too small for the snapshot
    BufferTooSmall,
    /// Serialization failed
    Encode,
    /// Stored bytes are not a valid snapshot
    Corrupted,
    /// Underlying storage failed
    Storage,
}

/// Key-value snapshot storage
///
/// Implementations handle wear leveling and integrity of the medium; this
/// crate only hands them opaque bytes.
pub trait SessionStore {
    /// Read a slot into `buffer`, returning the number of bytes read
    fn read(
        &mut self,
        slot: SessionSlot,
        buffer: &mut [u8],
    ) -> impl Future<Output = Result<usize, StoreError>>;

    /// Replace the contents of a slot
    fn write(&mut self, slot: SessionSlot, data: &[u8]) -> impl Future<Output = Result<(), StoreError>>;

    /// Check if a slot holds anything
    fn exists(&mut self, slot: SessionSlot) -> impl Future<Output = bool>;

    /// Clear a slot
    fn remove(&mut self, slot: SessionSlot) -> impl Future<Output = Result<(), StoreError>>;
}

/// Encode a session snapshot into `buffer`
pub fn encode_session<'a>(
    session: &CookingSession,
    buffer: &'a mut [u8],
) -> Result<&'a [u8], StoreError> {
    let snapshot = (SNAPSHOT_MAGIC, SNAPSHOT_VERSION, session);
    match postcard::to_slice(&snapshot, buffer) {
        Ok(bytes) => Ok(bytes),
        Err(postcard::Error::SerializeBufferFull) => Err(StoreError::BufferTooSmall),
        Err(_) => Err(StoreError::Encode),
    }
}

/// Decode a session snapshot
pub fn decode_session(bytes: &[u8]) -> Result<CookingSession, StoreError> {
    let (magic, version, session): (u32, u8, CookingSession) =
        postcard::from_bytes(bytes).map_err(|_| StoreError::Corrupted)?;
    if magic != SNAPSHOT_MAGIC || version != SNAPSHOT_VERSION {
        return Err(StoreError::Corrupted);
    }
    Ok(session)
}

/// Encode and write a session, using `buffer` as scratch space
pub async fn save_session<S: SessionStore>(
    store: &mut S,
    slot: SessionSlot,
    session: &CookingSession,
    buffer: &mut [u8],
) -> Result<(), StoreError> {
    let bytes = encode_session(session, buffer)?;
    store.write(slot, bytes).await
}

/// Read and decode a session, using `buffer` as scratch space
pub async fn load_session<S: SessionStore>(
    store: &mut S,
    slot: SessionSlot,
    buffer: &mut [u8],
) -> Result<CookingSession, StoreError> {
    let len = store.read(slot, buffer).await?;
    let bytes = buffer.get(..len).ok_or(StoreError::Corrupted)?;
    decode_session(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CookingConfig, ItemLimits};
    use crate::scheduler::SessionRunner;
    use crate::session::{PlanMode, SessionId, SessionStatus};
    use embassy_futures::block_on;
    use std::vec::Vec;

    #[derive(Default)]
    struct MemoryStore {
        slots: Vec<(SessionSlot, Vec<u8>)>,
        broken: bool,
    }

    impl SessionStore for MemoryStore {
        async fn read(&mut self, slot: SessionSlot, buffer: &mut [u8]) -> Result<usize, StoreError> {
            let (_, data) = self
                .slots
                .iter()
                .find(|(s, _)| *s == slot)
                .ok_or(StoreError::NotFound)?;
            let target = buffer.get_mut(..data.len()).ok_or(StoreError::BufferTooSmall)?;
            target.copy_from_slice(data);
            Ok(data.len())
        }

        async fn write(&mut self, slot: SessionSlot, data: &[u8]) -> Result<(), StoreError> {
            if self.broken {
                return Err(StoreError::Storage);
            }
            self.slots.retain(|(s, _)| *s != slot);
            self.slots.push((slot, data.to_vec()));
            Ok(())
        }

        async fn exists(&mut self, slot: SessionSlot) -> bool {
            self.slots.iter().any(|(s, _)| *s == slot)
        }

        async fn remove(&mut self, slot: SessionSlot) -> Result<(), StoreError> {
            self.slots.retain(|(s, _)| *s != slot);
            Ok(())
        }
    }

    fn cooking_session() -> CookingSession {
        let mut session = CookingSession::new(SessionId(7));
        let limits = ItemLimits::default();
        session.add_item("chicken", 200.0, 25.0, true, &limits).unwrap();
        session.add_item("potatoes", 200.0, 20.0, false, &limits).unwrap();
        session.add_item("salmon", 180.0, 12.0, false, &limits).unwrap();
        let batch = session.create_batch().unwrap();
        session.set_batch_note(batch, Some("keep warm")).unwrap();
        session
            .begin_cooking(PlanMode::Auto, &CookingConfig::default())
            .unwrap();
        session
    }

    #[test]
    fn test_save_and_load() {
        let mut store = MemoryStore::default();
        let mut buffer = [0u8; 4096];
        let session = cooking_session();

        block_on(save_session(&mut store, SessionSlot::ACTIVE, &session, &mut buffer)).unwrap();
        assert!(block_on(store.exists(SessionSlot::ACTIVE)));

        let loaded = block_on(load_session(&mut store, SessionSlot::ACTIVE, &mut buffer)).unwrap();
        assert_eq!(loaded, session);
    }

    #[test]
    fn test_progress_survives_reload() {
        let mut store = MemoryStore::default();
        let mut buffer = [0u8; 4096];

        let mut runner = SessionRunner::new(cooking_session());
        runner.start();
        runner.complete_event();
        block_on(save_session(&mut store, SessionSlot::ACTIVE, runner.session(), &mut buffer)).unwrap();

        let loaded = block_on(load_session(&mut store, SessionSlot::ACTIVE, &mut buffer)).unwrap();
        assert_eq!(loaded.status(), SessionStatus::InProgress);
        let resumed = SessionRunner::new(loaded);
        assert_eq!(resumed.current_event_index(), Some(1));
    }

    #[test]
    fn test_missing_slot() {
        let mut store = MemoryStore::default();
        let mut buffer = [0u8; 64];
        assert_eq!(
            block_on(load_session(&mut store, SessionSlot(3), &mut buffer)),
            Err(StoreError::NotFound)
        );
    }

    #[test]
    fn test_buffer_too_small() {
        let mut buffer = [0u8; 8];
        assert_eq!(
            encode_session(&cooking_session(), &mut buffer),
            Err(StoreError::BufferTooSmall)
        );
    }

    #[test]
    fn test_corrupted_bytes_rejected() {
        let mut buffer = [0u8; 4096];
        let bytes = encode_session(&cooking_session(), &mut buffer).unwrap();

        let mut tampered: Vec<u8> = bytes.to_vec();
        tampered[0] ^= 0xFF;
        assert_eq!(decode_session(&tampered), Err(StoreError::Corrupted));

        assert_eq!(decode_session(&bytes[..bytes.len() / 2]), Err(StoreError::Corrupted));
        assert_eq!(decode_session(&[]), Err(StoreError::Corrupted));
    }

    #[test]
    fn test_storage_failure_propagates() {
        let mut store = MemoryStore {
            broken: true,
            ..Default::default()
        };
        let mut buffer = [0u8; 4096];
        assert_eq!(
            block_on(save_session(&mut store, SessionSlot::ACTIVE, &cooking_session(), &mut buffer)),
            Err(StoreError::Storage)
        );
        assert!(!block_on(store.exists(SessionSlot::ACTIVE)));
    }

    #[test]
    fn test_remove() {
        let mut store = MemoryStore::default();
        let mut buffer = [0u8; 4096];
        block_on(save_session(&mut store, SessionSlot(1), &cooking_session(), &mut buffer)).unwrap();
        block_on(store.remove(SessionSlot(1))).unwrap();
        assert!(!block_on(store.exists(SessionSlot(1))));
    }
}
