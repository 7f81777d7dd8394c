//! Keyed lock provider.
//!
//! Serializes read-modify-write sections per string key. Injected into the
//! engine rather than reached through any global state; the only consumer
//! is the per-(user, line) quantity update path.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Per-key mutual exclusion.
///
/// Acquisition blocks with no provider-imposed timeout; deadline handling
/// belongs to the surrounding request. A poisoned cell is recovered rather
/// than propagated since the protected section holds no shared data of its
/// own.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    cells: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the exclusive lock for `key`.
    ///
    /// Calls with different keys proceed independently; calls with the same
    /// key serialize in acquisition order.
    pub fn acquire_and_run<T>(&self, key: &str, f: impl FnOnce() -> T) -> T {
        let cell = {
            let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(cells.entry(key.to_string()).or_default())
        };
        let result = {
            let _guard = cell.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };
        self.release(key, &cell);
        result
    }

    /// Drop the cell for `key` once no other caller holds a clone of it.
    ///
    /// Waiters clone the cell under the outer map lock, so a strong count
    /// of two (ours plus the map's) means nobody else can reach it. The
    /// map holds only keys with a current holder or waiter.
    fn release(&self, key: &str, cell: &Arc<Mutex<()>>) {
        let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        let last_out = cells
            .get(key)
            .map(|c| Arc::ptr_eq(c, cell) && Arc::strong_count(c) == 2)
            .unwrap_or(false);
        if last_out {
            cells.remove(key);
        }
    }

    #[cfg(test)]
    fn cell_count(&self) -> usize {
        self.cells
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
