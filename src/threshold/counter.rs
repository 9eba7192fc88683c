//! Consecutive-violation counting
//!
//! Tracks how many checks in a row each (entity, data point) pair has
//! violated its threshold. Absent is distinct from zero: absent means
//! the pair has never been seen (or state is unknown after a restart),
//! zero means it was explicitly reset by a clear.

use crate::domain::EntityContext;
use std::collections::HashMap;
use std::sync::Mutex;

/// Entity-scoped violation counts
///
/// One store is owned by the engine and handed to every runtime state by
/// reference; counts are never kept in implicit shared structures. The
/// map is guarded by a single mutex so the store can be shared across
/// evaluation workers. Each key is touched once per datapoint check, so
/// contention stays negligible.
#[derive(Debug, Default)]
pub struct ViolationCounters {
    counts: Mutex<HashMap<String, u32>>,
}

impl ViolationCounters {
    /// Create an empty counter store
    pub fn new() -> Self {
        Self::default()
    }

    /// Current streak for an (entity, data point) pair, if ever tracked
    pub fn get(&self, entity: &EntityContext, data_point: &str) -> Option<u32> {
        self.lock().get(&entity.count_key(data_point)).copied()
    }

    /// Increment the streak, initializing an untracked pair to zero
    /// first; returns the new count
    pub fn increment(&self, entity: &EntityContext, data_point: &str) -> u32 {
        let mut counts = self.lock();
        let count = counts.entry(entity.count_key(data_point)).or_insert(0);
        *count += 1;
        *count
    }

    /// Reset the streak to zero
    pub fn reset(&self, entity: &EntityContext, data_point: &str) {
        self.lock().insert(entity.count_key(data_point), 0);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, u32>> {
        // A poisoned lock only means another worker panicked mid-update;
        // the counts themselves are always internally consistent.
        self.counts.lock().unwrap_or_else(|e| e.into_inner())
    }
}
