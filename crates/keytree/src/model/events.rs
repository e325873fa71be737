//! Event intake between nodes and the model.
//!
//! Nodes do not call into the model directly. They announce state changes
//! on the [`TreeEvents`] signals through a [`ModelHandle`], and the model
//! reacts in the slots it connected at construction. Dispatch is
//! synchronous: by the time an announcement returns, the model has emitted
//! every notification it implies.

use std::sync::{Arc, Weak};

use keytree_core::Signal;

use super::node::TreeNode;
use super::tree_model::ConnectionsModel;

/// Signals carrying node announcements to the model.
pub struct TreeEvents {
    /// A node finished loading its children.
    pub children_loaded: Signal<Weak<dyn TreeNode>>,
    /// A node dropped its children. Args: (node, child count before the drop)
    pub children_unloaded: Signal<(Weak<dyn TreeNode>, usize)>,
    /// A node's own data changed.
    pub item_changed: Signal<Weak<dyn TreeNode>>,
}

impl Default for TreeEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeEvents {
    /// Creates a new set of event signals.
    pub fn new() -> Self {
        Self {
            children_loaded: Signal::new(),
            children_unloaded: Signal::new(),
            item_changed: Signal::new(),
        }
    }
}

/// A non-owning handle nodes use to reach their model.
///
/// The handle never keeps the model alive. Announcements made after the
/// model is gone are dropped.
#[derive(Clone, Default)]
pub struct ModelHandle {
    model: Weak<ConnectionsModel>,
}

impl ModelHandle {
    /// Creates a handle to `model`.
    pub fn new(model: &Arc<ConnectionsModel>) -> Self {
        Self {
            model: Arc::downgrade(model),
        }
    }

    /// Creates a handle that is not connected to any model.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Returns the model, if it is still alive.
    pub fn model(&self) -> Option<Arc<ConnectionsModel>> {
        self.model.upgrade()
    }

    /// Announces that `node` has finished loading its children.
    pub fn children_loaded(&self, node: Weak<dyn TreeNode>) {
        if let Some(model) = self.model() {
            model.events().children_loaded.emit(node);
        }
    }

    /// Announces that `node` dropped its children.
    ///
    /// `previous_count` is the number of children before they were dropped.
    pub fn children_unloaded(&self, node: Weak<dyn TreeNode>, previous_count: usize) {
        if let Some(model) = self.model() {
            model.events().children_unloaded.emit((node, previous_count));
        }
    }

    /// Announces that `node`'s own data changed.
    pub fn item_changed(&self, node: Weak<dyn TreeNode>) {
        if let Some(model) = self.model() {
            model.events().item_changed.emit(node);
        }
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("attached", &(self.model.strong_count() > 0))
            .finish()
    }
}
