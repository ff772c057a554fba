//! Per-item in-flight tracking for loading indicators.

use std::collections::HashMap;

use crate::types::TodoId;

/// Ids with at least one mutation request in flight.
///
/// Counted so that two overlapping requests for the same id keep it pending
/// until both have settled.
#[derive(Debug, Clone, Default)]
pub struct PendingSet {
    counts: HashMap<TodoId, usize>,
}

impl PendingSet {
    pub fn acquire(&mut self, id: TodoId) {
        *self.counts.entry(id).or_insert(0) += 1;
    }

    pub fn release(&mut self, id: TodoId) {
        if let Some(count) = self.counts.get_mut(&id) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&id);
            }
        }
    }

    pub fn contains(&self, id: TodoId) -> bool {
        self.counts.contains_key(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Pending ids in ascending order.
    pub fn ids(&self) -> Vec<TodoId> {
        let mut ids: Vec<TodoId> = self.counts.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
