//! Handle-based snapshot storage with checked release.

use super::Snapshot;
use crate::error::{Error, Result};

/// Opaque reference to a snapshot held by a [`SnapshotPool`].
///
/// A handle stays valid until released. Slots are reused, so each handle
/// carries the generation of the slot it was issued for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SnapshotHandle {
    index: u32,
    generation: u32,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    snapshot: Option<Snapshot>,
}

/// Arena of snapshots addressed by [`SnapshotHandle`]. Any use of a released
/// handle fails with [`Error::UseAfterRelease`].
#[derive(Debug, Default)]
pub struct SnapshotPool {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl SnapshotPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, snapshot: Snapshot) -> SnapshotHandle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.snapshot = Some(snapshot);
            return SnapshotHandle {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            snapshot: Some(snapshot),
        });
        SnapshotHandle {
            index,
            generation: 0,
        }
    }

    pub fn get(&self, handle: SnapshotHandle) -> Result<&Snapshot> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.snapshot.as_ref())
            .ok_or(Error::UseAfterRelease)
    }

    /// Remove the snapshot and invalidate every copy of `handle`.
    pub fn release(&mut self, handle: SnapshotHandle) -> Result<Snapshot> {
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .ok_or(Error::UseAfterRelease)?;
        let snapshot = slot.snapshot.take().ok_or(Error::UseAfterRelease)?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        Ok(snapshot)
    }

    /// Number of live snapshots.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
