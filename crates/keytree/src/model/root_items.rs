//! Ordered collection of top-level nodes.

use std::sync::Arc;

use parking_lot::RwLock;

use super::node::TreeNode;

/// The top-level nodes of the tree (typically server connections).
///
/// Every node's [`row`](TreeNode::row) equals its position in the
/// collection; insertion and removal renumber the nodes that follow.
#[derive(Default)]
pub struct RootItems {
    items: RwLock<Vec<Arc<dyn TreeNode>>>,
}

impl RootItems {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of top-level nodes.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Returns `true` if there are no top-level nodes.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Returns the node at `row`.
    pub fn get(&self, row: usize) -> Option<Arc<dyn TreeNode>> {
        self.items.read().get(row).cloned()
    }

    /// Returns the position of `node`, compared by identity.
    pub fn position(&self, node: &Arc<dyn TreeNode>) -> Option<usize> {
        self.items
            .read()
            .iter()
            .position(|item| Arc::ptr_eq(item, node))
    }

    /// Returns `true` if `node` is one of the top-level nodes.
    pub fn contains(&self, node: &Arc<dyn TreeNode>) -> bool {
        self.position(node).is_some()
    }

    /// Appends `node`, assigns its row and returns that row.
    pub fn push(&self, node: Arc<dyn TreeNode>) -> usize {
        let mut items = self.items.write();
        let row = items.len();
        node.set_row(row);
        items.push(node);
        row
    }

    /// Removes the node at `row` and renumbers the nodes after it.
    pub fn remove(&self, row: usize) -> Option<Arc<dyn TreeNode>> {
        let mut items = self.items.write();
        if row >= items.len() {
            return None;
        }

        let removed = items.remove(row);
        for (offset, item) in items.iter().enumerate().skip(row) {
            item.set_row(offset);
        }
        Some(removed)
    }

    /// Returns a snapshot of the top-level nodes in row order.
    pub fn to_vec(&self) -> Vec<Arc<dyn TreeNode>> {
        self.items.read().clone()
    }
}
