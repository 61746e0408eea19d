use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use uuid::Uuid;

use crate::errors::{LedgerError, Result};

/// Per-id mutual exclusion. Calls for different ids run in parallel; calls for
/// the same id run one after another.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    slots: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` while holding the lock for `key`.
    /// The slot is released even when `f` panics.
    pub fn with_lock<T>(&self, key: Uuid, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let held = HeldSlot {
            locks: self,
            key,
            slot: self.slot(key)?,
        };
        // The guarded value is `()`, so a poisoned lock holds nothing stale.
        let _guard = held.slot.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Number of ids that currently have a lock slot.
    pub fn active(&self) -> usize {
        self.slots.lock().map(|slots| slots.len()).unwrap_or(0)
    }

    fn slot(&self, key: Uuid) -> Result<Arc<Mutex<()>>> {
        let mut slots = self.slots.lock().map_err(|_| poisoned())?;
        Ok(slots.entry(key).or_default().clone())
    }

    fn release(&self, key: Uuid, slot: &Arc<Mutex<()>>) {
        if let Ok(mut slots) = self.slots.lock() {
            // One reference in the map plus ours: nobody else is waiting.
            if Arc::strong_count(slot) <= 2 {
                slots.remove(&key);
            }
        }
    }
}

/// Gives the slot back to the registry on drop, after the inner guard is gone.
struct HeldSlot<'a> {
    locks: &'a KeyedLocks,
    key: Uuid,
    slot: Arc<Mutex<()>>,
}

impl Drop for HeldSlot<'_> {
    fn drop(&mut self) {
        self.locks.release(self.key, &self.slot);
    }
}

fn poisoned() -> LedgerError {
    LedgerError::StoreUnavailable("lock registry poisoned".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn same_key_is_serialized() {
        let locks = Arc::new(KeyedLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let key = Uuid::new_v4();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                thread::spawn(move || {
                    locks
                        .with_lock(key, || {
                            assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                            thread::yield_now();
                            inside.fetch_sub(1, Ordering::SeqCst);
                            Ok(())
                        })
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(locks.active(), 0);
    }

    #[test]
    fn errors_pass_through_and_release_the_slot() {
        let locks = KeyedLocks::new();
        let key = Uuid::new_v4();
        let err = locks
            .with_lock(key, || -> Result<()> { Err(LedgerError::PlanNotFound(key)) })
            .unwrap_err();
        assert!(matches!(err, LedgerError::PlanNotFound(id) if id == key));
        assert_eq!(locks.active(), 0);
    }

    #[test]
    fn panicking_closure_still_releases_the_slot() {
        let locks = KeyedLocks::new();
        let key = Uuid::new_v4();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            locks.with_lock(key, || -> Result<()> { panic!("closure failed") })
        }));
        assert!(outcome.is_err());
        assert_eq!(locks.active(), 0);

        locks.with_lock(key, || Ok(())).unwrap();
        assert_eq!(locks.active(), 0);
    }
}
