//! Generation-checked side table for resolving model indices.
//!
//! A [`ModelIndex`](super::ModelIndex) stays lightweight by carrying only a
//! registry key instead of an owning reference. The registry maps that key
//! back to a `Weak` handle so the node can be recovered while it is still
//! alive.
//!
//! Keys are slotmap keys: a slot freed for a dead node gets a new version
//! when it is reused, so a key handed out for a dropped node never resolves
//! again, even when a new node lands at the same address.
//!
//! Entries are recorded whenever the model hands out an index. They are
//! never removed eagerly: a lookup that hits a dead handle drops that entry
//! and reports nothing, so the table is a cache and never a source of truth
//! for liveness.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use keytree_core::logging::targets;
use parking_lot::Mutex;
use slotmap::{Key, KeyData, SlotMap, new_key_type};

use super::node::TreeNode;

new_key_type! {
    /// Registry key of a node, as carried in a model index.
    pub struct NodeKey;
}

impl NodeKey {
    /// Returns the key as a model index internal id.
    pub fn to_internal_id(self) -> u64 {
        self.data().as_ffi()
    }

    /// Rebuilds a key from a model index internal id.
    pub fn from_internal_id(id: u64) -> Self {
        KeyData::from_ffi(id).into()
    }
}

fn address(node: &Arc<dyn TreeNode>) -> usize {
    Arc::as_ptr(node) as *const () as usize
}

#[derive(Default)]
struct Entries {
    slots: SlotMap<NodeKey, Weak<dyn TreeNode>>,
    by_address: HashMap<usize, NodeKey>,
}

impl Entries {
    fn evict(&mut self, key: NodeKey) {
        let Some(weak) = self.slots.remove(key) else {
            return;
        };
        let addr = weak.as_ptr() as *const () as usize;
        if self.by_address.get(&addr) == Some(&key) {
            self.by_address.remove(&addr);
        }
    }
}

/// Maps registry keys to non-owning node handles.
#[derive(Default)]
pub struct NodeRegistry {
    entries: Mutex<Entries>,
}

impl NodeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `node` and returns its key as an internal id.
    ///
    /// Recording a live node again returns the same id. A node that reuses
    /// the address of a dropped one gets a fresh id.
    pub fn record(&self, node: &Arc<dyn TreeNode>) -> u64 {
        let addr = address(node);
        let mut entries = self.entries.lock();

        if let Some(&key) = entries.by_address.get(&addr) {
            let same_node = entries
                .slots
                .get(key)
                .and_then(Weak::upgrade)
                .is_some_and(|existing| Arc::ptr_eq(&existing, node));
            if same_node {
                return key.to_internal_id();
            }
            entries.evict(key);
        }

        let key = entries.slots.insert(Arc::downgrade(node));
        entries.by_address.insert(addr, key);
        key.to_internal_id()
    }

    /// Resolves an internal id to a live node.
    ///
    /// Returns `None` when the id was never handed out, belongs to a slot
    /// that has since been reused, or names a node that has been dropped; in
    /// the last case the dead entry is discarded.
    pub fn resolve(&self, id: u64) -> Option<Arc<dyn TreeNode>> {
        let key = NodeKey::from_internal_id(id);
        let mut entries = self.entries.lock();
        let weak = entries.slots.get(key)?;

        match weak.upgrade() {
            Some(node) => Some(node),
            None => {
                entries.evict(key);
                tracing::trace!(target: targets::REGISTRY, id, "dropped stale entry");
                None
            }
        }
    }

    /// Returns the number of entries, including stale ones.
    pub fn len(&self) -> usize {
        self.entries.lock().slots.len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().slots.is_empty()
    }

    /// Returns the number of entries whose node has been dropped.
    pub fn stale_count(&self) -> usize {
        self.entries
            .lock()
            .slots
            .values()
            .filter(|weak| weak.strong_count() == 0)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::node::NodeKind;

    struct Leaf(&'static str);

    impl TreeNode for Leaf {
        fn name(&self) -> String {
            self.0.to_string()
        }
        fn kind(&self) -> NodeKind {
            NodeKind::Key
        }
        fn row(&self) -> usize {
            0
        }
        fn set_row(&self, _row: usize) {}
        fn parent(&self) -> Option<Weak<dyn TreeNode>> {
            None
        }
        fn child_count(&self) -> usize {
            0
        }
        fn child(&self, _row: usize) -> Option<Arc<dyn TreeNode>> {
            None
        }
    }

    #[test]
    fn test_record_and_resolve() {
        let registry = NodeRegistry::new();
        let node: Arc<dyn TreeNode> = Arc::new(Leaf("user:1"));

        let id = registry.record(&node);
        assert_ne!(id, 0);

        let resolved = registry.resolve(id).unwrap();
        assert!(Arc::ptr_eq(&resolved, &node));
    }

    #[test]
    fn test_unknown_id_resolves_to_none() {
        let registry = NodeRegistry::new();
        assert!(registry.resolve(0x1234).is_none());
        assert!(registry.resolve(0).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_dead_entry_is_dropped_on_lookup() {
        let registry = NodeRegistry::new();
        let node: Arc<dyn TreeNode> = Arc::new(Leaf("gone"));
        let id = registry.record(&node);

        drop(node);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.stale_count(), 1);

        assert!(registry.resolve(id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_record_twice_keeps_one_entry() {
        let registry = NodeRegistry::new();
        let node: Arc<dyn TreeNode> = Arc::new(Leaf("twice"));
        let first = registry.record(&node);
        let second = registry.record(&node);
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.stale_count(), 0);
    }

    #[test]
    fn test_reused_slot_does_not_revive_old_id() {
        let registry = NodeRegistry::new();

        let old: Arc<dyn TreeNode> = Arc::new(Leaf("old"));
        let old_id = registry.record(&old);
        drop(old);
        assert!(registry.resolve(old_id).is_none());

        // The freed slot is reused with a new version.
        let new: Arc<dyn TreeNode> = Arc::new(Leaf("new"));
        let new_id = registry.record(&new);
        assert_ne!(new_id, old_id);
        assert!(registry.resolve(old_id).is_none());
        assert_eq!(registry.resolve(new_id).unwrap().name(), "new");
    }

    #[test]
    fn test_dead_node_at_reused_address_gets_fresh_id() {
        let registry = NodeRegistry::new();

        let old: Arc<dyn TreeNode> = Arc::new(Leaf("old"));
        let old_id = registry.record(&old);
        let addr = address(&old);
        drop(old);

        // Recording whatever now lives at an address with a dead entry must
        // not hand back the dead node's id.
        let new: Arc<dyn TreeNode> = Arc::new(Leaf("new"));
        let new_id = registry.record(&new);
        if address(&new) == addr {
            assert_eq!(registry.stale_count(), 0);
        }
        assert_ne!(new_id, old_id);
        assert!(registry.resolve(old_id).is_none());
    }
}
