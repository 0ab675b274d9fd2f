use std::cell::Cell;

use crate::dom::types::MutationRecord;

/// Passive observer of structural changes.
///
/// Counts inserted subtrees for diagnostics. It never starts matching.
#[derive(Debug)]
pub struct MutationWatcher {
    enabled: bool,
    subtrees: Cell<usize>,
    elements: Cell<usize>,
}

impl MutationWatcher {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            subtrees: Cell::new(0),
            elements: Cell::new(0),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Records a batch. Returns false when watching is disabled or nothing was added.
    pub fn observe(&self, record: &MutationRecord) -> bool {
        if !self.enabled || record.added_subtrees == 0 {
            return false;
        }
        self.subtrees.set(self.subtrees.get() + record.added_subtrees);
        self.elements.set(self.elements.get() + record.added_elements);
        tracing::debug!(
            added_subtrees = record.added_subtrees,
            added_elements = record.added_elements,
            total_subtrees = self.subtrees.get(),
            "document subtree added"
        );
        true
    }

    /// Total subtrees observed so far.
    pub fn observed_subtrees(&self) -> usize {
        self.subtrees.get()
    }

    pub fn observed_elements(&self) -> usize {
        self.elements.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_only_when_enabled() {
        let record = MutationRecord {
            added_subtrees: 2,
            added_elements: 5,
        };

        let watcher = MutationWatcher::new(true);
        assert!(watcher.observe(&record));
        assert!(watcher.observe(&record));
        assert_eq!(watcher.observed_subtrees(), 4);
        assert_eq!(watcher.observed_elements(), 10);
        assert!(!watcher.observe(&MutationRecord::default()));

        let off = MutationWatcher::new(false);
        assert!(!off.observe(&record));
        assert_eq!(off.observed_subtrees(), 0);
    }
}
