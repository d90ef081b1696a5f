//! In-order replay of out-of-order completions.

use std::collections::BTreeMap;

/// Result parked for ordered replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Slot<T> {
    /// Task produced a value.
    Completed(T),
    /// Task panicked; the cursor advances past it without an ordered event.
    Failed,
}

/// Holds results that finished ahead of a lower submission index.
///
/// `next` is the lowest index not yet replayed. An entry for index `i` lives
/// in `parked` only while some index below `i` is still outstanding.
#[derive(Debug)]
pub(crate) struct ReplayBuffer<T> {
    next: u64,
    parked: BTreeMap<u64, Slot<T>>,
}

impl<T> Default for ReplayBuffer<T> {
    fn default() -> Self {
        Self {
            next: 0,
            parked: BTreeMap::new(),
        }
    }
}

impl<T> ReplayBuffer<T> {
    /// Record the outcome of `index`.
    pub(crate) fn record(&mut self, index: u64, slot: Slot<T>) {
        debug_assert!(index >= self.next, "index {index} already replayed");
        self.parked.insert(index, slot);
    }

    /// Remove and return every contiguous outcome starting at the cursor.
    pub(crate) fn drain_ready(&mut self) -> Vec<(u64, Slot<T>)> {
        let mut ready = Vec::new();
        while let Some(slot) = self.parked.remove(&self.next) {
            ready.push((self.next, slot));
            self.next += 1;
        }
        ready
    }

    /// Lowest index not yet replayed.
    pub(crate) const fn next_index(&self) -> u64 {
        self.next
    }

    /// Number of outcomes waiting on a lower index.
    pub(crate) fn parked(&self) -> usize {
        self.parked.len()
    }
}
