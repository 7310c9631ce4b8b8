//! Per-room exclusive access scopes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use common::{HotelId, RoomId};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type RoomKey = (HotelId, RoomId);
type LockTable = Arc<Mutex<HashMap<RoomKey, Arc<AsyncMutex<()>>>>>;

/// In-process registry of room locks keyed by (hotel, room).
///
/// Holding a [`RoomGuard`] serializes every orchestration step that reads a
/// room's availability and then mutates it. Entries are removed once the
/// last holder or waiter goes away.
#[derive(Debug, Clone, Default)]
pub struct RoomLocks {
    table: LockTable,
}

impl RoomLocks {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits up to `wait` for exclusive access to a room.
    ///
    /// Returns `None` if the room stayed held by another operation.
    pub async fn acquire(&self, hotel_id: HotelId, room_id: RoomId, wait: Duration) -> Option<RoomGuard> {
        let key = (hotel_id, room_id);
        let entry = lock_table(&self.table).entry(key).or_default().clone();

        match tokio::time::timeout(wait, entry.lock_owned()).await {
            Ok(guard) => Some(RoomGuard {
                guard: Some(guard),
                key,
                table: self.table.clone(),
            }),
            Err(_) => {
                prune(&self.table, key);
                None
            }
        }
    }

    /// Returns the number of rooms currently tracked.
    pub fn len(&self) -> usize {
        lock_table(&self.table).len()
    }

    /// Returns true if no room is held or awaited.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exclusive access to one room, released on drop.
#[derive(Debug)]
pub struct RoomGuard {
    guard: Option<OwnedMutexGuard<()>>,
    key: RoomKey,
    table: LockTable,
}

impl RoomGuard {
    /// Returns the hotel of the held room.
    pub fn hotel_id(&self) -> HotelId {
        self.key.0
    }

    /// Returns the held room.
    pub fn room_id(&self) -> RoomId {
        self.key.1
    }
}

impl Drop for RoomGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        prune(&self.table, self.key);
    }
}

fn lock_table(table: &LockTable) -> MutexGuard<'_, HashMap<RoomKey, Arc<AsyncMutex<()>>>> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

// Removes the entry if the table holds the only reference to it.
fn prune(table: &LockTable, key: RoomKey) {
    let mut table = lock_table(table);
    if table
        .get(&key)
        .is_some_and(|entry| Arc::strong_count(entry) == 1)
    {
        table.remove(&key);
    }
}
