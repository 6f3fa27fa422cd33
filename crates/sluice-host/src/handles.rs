//! Thread-safe registry of open native resources.
//!
//! Handles are `u64` IDs from a monotonic counter starting at 1 and are
//! never reused — no reuse eliminates close/reopen ambiguity. An ID
//! absent from the table is a "not found" result (`None`), never a
//! panic or an error: callers translate it into their own EOF/no-op/
//! rejection handling.
//!
//! The table is an explicit owned instance injected into every
//! dependent component, guarded by one mutex. Resources are stored as
//! cheaply clonable values (typically `Arc`s) so the table lock is
//! never held across I/O.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

struct TableInner<R> {
    next_id: u64,
    entries: HashMap<u64, R>,
}

/// Mutex-guarded handle table with monotonically increasing IDs.
pub struct HandleTable<R> {
    inner: Mutex<TableInner<R>>,
}

impl<R> HandleTable<R> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(TableInner {
                next_id: 1,
                entries: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TableInner<R>> {
        // A poisoned lock still holds a structurally valid table.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Register a resource and return its new, never-reused ID.
    pub fn allocate(&self, resource: R) -> u64 {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.insert(id, resource);
        tracing::debug!(handle = id, "handle allocated");
        id
    }

    /// Remove and return the resource, or `None` for an unknown ID.
    pub fn remove(&self, id: u64) -> Option<R> {
        let removed = self.lock().entries.remove(&id);
        tracing::debug!(handle = id, found = removed.is_some(), "handle removed");
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R: Clone> HandleTable<R> {
    /// Clone out the resource for an ID, or `None` for an unknown ID.
    pub fn lookup(&self, id: u64) -> Option<R> {
        self.lock().entries.get(&id).cloned()
    }
}

impl<R> Default for HandleTable<R> {
    fn default() -> Self {
        Self::new()
    }
}
