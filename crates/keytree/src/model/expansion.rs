//! Bookkeeping of expanded namespace branches.
//!
//! The tracker remembers namespaces by *name*. Rows and identities do not
//! survive a reload, names do; the price is that equal names under
//! different parents are indistinguishable.

use std::collections::BTreeSet;

use parking_lot::Mutex;

/// The set of namespace names currently considered expanded.
#[derive(Debug, Default)]
pub struct ExpansionTracker {
    names: Mutex<BTreeSet<String>>,
}

impl ExpansionTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `name` as expanded. Returns `true` if it was not tracked yet.
    pub fn mark_expanded(&self, name: impl Into<String>) -> bool {
        self.names.lock().insert(name.into())
    }

    /// Marks `name` as collapsed. Returns `true` if it was tracked.
    pub fn mark_collapsed(&self, name: &str) -> bool {
        self.names.lock().remove(name)
    }

    /// Returns `true` if `name` is tracked as expanded.
    pub fn contains(&self, name: &str) -> bool {
        self.names.lock().contains(name)
    }

    /// Returns the number of tracked names.
    pub fn len(&self) -> usize {
        self.names.lock().len()
    }

    /// Returns `true` if no names are tracked.
    pub fn is_empty(&self) -> bool {
        self.names.lock().is_empty()
    }

    /// Returns the tracked names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.names.lock().iter().cloned().collect()
    }

    /// Returns the tracked names and clears the live set.
    ///
    /// Restoration rebuilds the set from scratch as restored branches are
    /// marked expanded again.
    pub fn take(&self) -> BTreeSet<String> {
        std::mem::take(&mut *self.names.lock())
    }

    /// Forgets every tracked name.
    pub fn clear(&self) {
        self.names.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_then_collapse() {
        let tracker = ExpansionTracker::new();
        assert!(tracker.mark_expanded("users"));
        assert!(tracker.contains("users"));

        assert!(tracker.mark_collapsed("users"));
        assert!(!tracker.contains("users"));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_mark_twice_is_idempotent() {
        let tracker = ExpansionTracker::new();
        assert!(tracker.mark_expanded("users"));
        assert!(!tracker.mark_expanded("users"));
        assert_eq!(tracker.len(), 1);

        assert!(tracker.mark_collapsed("users"));
        assert!(!tracker.mark_collapsed("users"));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let tracker = ExpansionTracker::new();
        tracker.mark_expanded("Users");
        assert!(!tracker.contains("users"));
    }

    #[test]
    fn test_take_snapshots_and_clears() {
        let tracker = ExpansionTracker::new();
        tracker.mark_expanded("b");
        tracker.mark_expanded("a");

        let snapshot = tracker.take();
        assert_eq!(snapshot.into_iter().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(tracker.is_empty());
    }
}
