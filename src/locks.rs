// Per-id critical sections.
//
// Scenario materialization and grading for one challenge id must never run
// twice concurrently, while different ids proceed in parallel. Entries are
// dropped from the map once nobody holds or waits on them, including when a
// waiter is cancelled before it acquires.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slots = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

#[derive(Debug, Clone, Default)]
pub struct IdLocks {
    slots: Slots,
}

/// Held for the duration of a critical section on one id.
pub struct IdGuard {
    key: String,
    slots: Slots,
    guard: Option<OwnedMutexGuard<()>>,
}

/// Lives while `lock` is parked on a busy slot. If the caller gives up
/// before acquiring, this is the last reference left to clean up the entry.
struct Waiting<'a> {
    key: &'a str,
    slots: &'a Slots,
    slot: Option<Arc<AsyncMutex<()>>>,
}

/// Removes `key` once only the map still references its mutex: no holder,
/// no waiter.
fn evict_if_idle(slots: &mut HashMap<String, Arc<AsyncMutex<()>>>, key: &str) {
    if slots
        .get(key)
        .is_some_and(|slot| Arc::strong_count(slot) == 1)
    {
        slots.remove(key);
    }
}

impl IdLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: &str) -> IdGuard {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            slots
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        let mut waiting = Waiting {
            key,
            slots: &self.slots,
            slot: Some(slot.clone()),
        };
        // Declared after `waiting` so a cancelled acquire is dropped first.
        let acquire = slot.lock_owned();
        let guard = acquire.await;
        waiting.slot = None;

        IdGuard {
            key: key.to_string(),
            slots: self.slots.clone(),
            guard: Some(guard),
        }
    }

    /// Number of ids currently held or waited on.
    pub fn active(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Drop for IdGuard {
    fn drop(&mut self) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        self.guard.take();
        evict_if_idle(&mut slots, &self.key);
    }
}

impl Drop for Waiting<'_> {
    fn drop(&mut self) {
        let Some(slot) = self.slot.take() else {
            return;
        };
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        drop(slot);
        evict_if_idle(&mut slots, self.key);
    }
}
