//! The connections tree model.
//!
//! `ConnectionsModel` maps stable tree positions onto a lazily-loaded graph
//! of [`TreeNode`]s that it does not own. It resolves indices through a
//! raw-identity registry, brackets structural changes with notifications,
//! delegates lazy loading to the nodes, and remembers which namespaces were
//! expanded so they can be reopened after a database reloads.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use keytree_core::logging::{span_names, targets};
use keytree_core::{PerfSpan, Signal};

use super::events::{ModelHandle, TreeEvents};
use super::expansion::ExpansionTracker;
use super::index::ModelIndex;
use super::node::{NodeKind, TreeNode};
use super::registry::NodeRegistry;
use super::role::{ItemData, ItemRole};
use super::root_items::RootItems;
use super::traits::{ItemFlags, ItemModel, MatchFlags, ModelSignals};
use crate::settings::{REOPEN_NAMESPACES_ON_RELOAD, SettingsSource};

/// Hierarchical model of server connections and their contents.
///
/// The model is always shared as an `Arc`: nodes reach it through a
/// [`ModelHandle`] and the model's own event slots hold it weakly.
///
/// # Reentrancy
///
/// Every notification is emitted synchronously and with no internal lock
/// held, so slots may call back into the model, including requests that make
/// nodes load children and announce them while an earlier announcement is
/// still being handled.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use keytree::model::{ConnectionsModel, ItemModel, MemoryNode, ModelIndex, NodeKind, NodeSpec};
/// use keytree::settings::Settings;
///
/// let model = ConnectionsModel::new(Arc::new(Settings::new()));
/// let server = MemoryNode::root(
///     model.handle(),
///     NodeSpec::new(NodeKind::Server, "local")
///         .child(NodeSpec::new(NodeKind::Database, "db0")),
/// );
/// model.add_root_item(server.clone());
///
/// let server_index = model.index(0, 0, &ModelIndex::invalid());
/// assert!(model.can_fetch_more(&server_index));
/// model.fetch_more(&server_index);
/// assert_eq!(model.row_count(&server_index), 1);
/// ```
pub struct ConnectionsModel {
    roots: RootItems,
    registry: NodeRegistry,
    expanded: ExpansionTracker,
    settings: Arc<dyn SettingsSource>,
    signals: ModelSignals,
    events: TreeEvents,
    expand_requested: Signal<ModelIndex>,
}

impl ConnectionsModel {
    /// Creates an empty model reading its preferences from `settings`.
    pub fn new(settings: Arc<dyn SettingsSource>) -> Arc<Self> {
        Arc::new_cyclic(|me: &Weak<Self>| {
            let model = Self {
                roots: RootItems::new(),
                registry: NodeRegistry::new(),
                expanded: ExpansionTracker::new(),
                settings,
                signals: ModelSignals::new(),
                events: TreeEvents::new(),
                expand_requested: Signal::new(),
            };

            let weak = me.clone();
            model.events.item_changed.connect(move |item| {
                if let Some(model) = weak.upgrade() {
                    model.on_item_changed(item);
                }
            });

            let weak = me.clone();
            model.events.children_loaded.connect(move |item| {
                if let Some(model) = weak.upgrade() {
                    model.on_item_children_loaded(item);
                }
            });

            let weak = me.clone();
            model
                .events
                .children_unloaded
                .connect(move |(item, previous_count)| {
                    if let Some(model) = weak.upgrade() {
                        model.on_item_children_unloaded(item, *previous_count);
                    }
                });

            model
        })
    }

    /// Returns a handle nodes use to announce changes to this model.
    pub fn handle(self: &Arc<Self>) -> ModelHandle {
        ModelHandle::new(self)
    }

    /// Returns the event intake signals.
    pub fn events(&self) -> &TreeEvents {
        &self.events
    }

    /// Emitted when the model asks the view to expand an item.
    pub fn expand_requested(&self) -> &Signal<ModelIndex> {
        &self.expand_requested
    }

    // -------------------------------------------------------------------------
    // Position resolution
    // -------------------------------------------------------------------------

    /// Returns the live node an index refers to.
    ///
    /// Returns `None` for the root (invalid index) and for indices whose
    /// node is unknown or has been dropped.
    pub fn node_from_index(&self, index: &ModelIndex) -> Option<Arc<dyn TreeNode>> {
        if !index.is_valid() {
            return None;
        }
        self.registry.resolve(index.internal_id())
    }

    /// Returns the index of a live node at its current row, column 0.
    ///
    /// Returns an invalid index if the node has been dropped.
    pub fn index_for_node(&self, node: &Weak<dyn TreeNode>) -> ModelIndex {
        match node.upgrade() {
            Some(node) => self.create_index(&node, node.row(), 0),
            None => ModelIndex::invalid(),
        }
    }

    fn create_index(&self, node: &Arc<dyn TreeNode>, row: usize, column: usize) -> ModelIndex {
        let id = self.registry.record(node);
        ModelIndex::new(row, column, id)
    }

    // -------------------------------------------------------------------------
    // Top-level items
    // -------------------------------------------------------------------------

    /// Returns the number of top-level items.
    pub fn size(&self) -> usize {
        self.roots.len()
    }

    /// Returns the top-level items in row order.
    pub fn root_items(&self) -> Vec<Arc<dyn TreeNode>> {
        self.roots.to_vec()
    }

    /// Appends a top-level item.
    ///
    /// Adding a node that is already a top-level item does nothing.
    pub fn add_root_item(&self, node: Arc<dyn TreeNode>) {
        if self.roots.contains(&node) {
            tracing::warn!(target: targets::MODEL, name = %node.name(), "root item already present");
            return;
        }

        let row = self.roots.len();
        self.signals
            .emit_rows_inserted(ModelIndex::invalid(), row, row, || {
                self.roots.push(node);
            });
    }

    /// Removes a top-level item.
    ///
    /// Removing a node that is not a top-level item does nothing.
    pub fn remove_root_item(&self, node: &Arc<dyn TreeNode>) {
        let Some(row) = self.roots.position(node) else {
            tracing::debug!(target: targets::MODEL, name = %node.name(), "remove of unknown root item ignored");
            return;
        };

        self.signals
            .emit_rows_removed(ModelIndex::invalid(), row, row, || {
                self.roots.remove(row);
            });
    }

    // -------------------------------------------------------------------------
    // Item data
    // -------------------------------------------------------------------------

    /// Returns the names views use to address roles.
    pub fn role_names(&self) -> HashMap<ItemRole, &'static str> {
        HashMap::from([(ItemRole::Display, "name"), (ItemRole::Type, "type")])
    }

    /// Returns the icon URL of the item at `index`.
    pub fn item_icon(&self, index: &ModelIndex) -> ItemData {
        self.data(index, ItemRole::Decoration)
    }

    /// Returns the kind identifier of the item at `index`.
    pub fn item_type(&self, index: &ModelIndex) -> ItemData {
        self.data(index, ItemRole::Type)
    }

    /// Returns the metadata value `key` of the item at `index`.
    pub fn metadata(&self, index: &ModelIndex, key: &str) -> ItemData {
        match self.node_from_index(index) {
            Some(node) => node.metadata(key),
            None => ItemData::None,
        }
    }

    /// Stores a metadata value on the item at `index`.
    pub fn set_metadata(&self, index: &ModelIndex, key: &str, value: ItemData) {
        if let Some(node) = self.node_from_index(index) {
            node.set_metadata(key, value);
        }
    }

    /// Forwards a named event to the item at `index`.
    pub fn send_event(&self, index: &ModelIndex, event: &str) {
        tracing::debug!(target: targets::MODEL, event, "event received");

        if let Some(node) = self.node_from_index(index) {
            node.handle_event(event);
        }
    }

    // -------------------------------------------------------------------------
    // Expanded namespaces
    // -------------------------------------------------------------------------

    /// Records that the namespace at `index` has been expanded.
    ///
    /// Items of any other kind are ignored.
    pub fn set_expanded(&self, index: &ModelIndex) {
        if let Some(node) = self.namespace_at(index) {
            self.expanded.mark_expanded(node.name());
        }
    }

    /// Records that the namespace at `index` has been collapsed.
    ///
    /// Items of any other kind are ignored.
    pub fn set_collapsed(&self, index: &ModelIndex) {
        if let Some(node) = self.namespace_at(index) {
            self.expanded.mark_collapsed(&node.name());
        }
    }

    fn namespace_at(&self, index: &ModelIndex) -> Option<Arc<dyn TreeNode>> {
        self.node_from_index(index)
            .filter(|node| node.kind() == NodeKind::Namespace)
    }

    /// Returns the names of the namespaces tracked as expanded, sorted.
    pub fn expanded_namespaces(&self) -> Vec<String> {
        self.expanded.names()
    }

    /// Requests expansion of every tracked namespace found below `scope`.
    ///
    /// The tracked set is cleared first; restored namespaces are tracked
    /// again once the view reports them expanded. Names are matched exactly
    /// against original names at any depth, so equally named namespaces in
    /// different branches of `scope` are all reopened.
    pub fn restore_opened_namespaces(&self, scope: &ModelIndex) {
        let _span = PerfSpan::new(span_names::RESTORE);

        let snapshot = self.expanded.take();
        let search_from = self.index(0, 0, scope);
        tracing::debug!(target: targets::MODEL, tracked = snapshot.len(), "restoring expanded namespaces");

        for name in snapshot {
            let matches = self.match_items(
                &search_from,
                ItemRole::OriginalName,
                &name,
                MatchFlags::exact_recursive(),
            );
            tracing::trace!(target: targets::MODEL, name = %name, matches = matches.len(), "namespace lookup");

            for index in matches {
                self.expand_requested.emit(index);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Node event handlers
    // -------------------------------------------------------------------------

    fn on_item_changed(&self, item: &Weak<dyn TreeNode>) {
        let Some(node) = item.upgrade() else {
            return;
        };

        let index = self.index_for_node(item);
        if !index.is_valid() || node.child_count() == 0 {
            return;
        }

        self.signals
            .emit_data_changed_single(index, vec![ItemRole::Display]);
    }

    fn on_item_children_loaded(&self, item: &Weak<dyn TreeNode>) {
        let Some(node) = item.upgrade() else {
            return;
        };

        let index = self.index_for_node(item);
        if !index.is_valid() {
            return;
        }

        let count = node.child_count();
        tracing::debug!(target: targets::MODEL, name = %node.name(), count, "children loaded");

        if count > 0 {
            self.signals.emit_rows_inserted(index, 0, count - 1, || {});
        }

        if node.kind() == NodeKind::Database {
            self.expand_requested.emit(index);

            if self.settings.bool_value(REOPEN_NAMESPACES_ON_RELOAD, true) {
                self.restore_opened_namespaces(&index);
            } else {
                tracing::debug!(target: targets::MODEL, "namespace reopening is disabled in settings");
                self.expanded.clear();
            }
        }
    }

    fn on_item_children_unloaded(&self, item: &Weak<dyn TreeNode>, previous_count: usize) {
        let index = self.index_for_node(item);
        if !index.is_valid() || previous_count == 0 {
            return;
        }

        tracing::debug!(target: targets::MODEL, previous_count, "children unloaded");
        self.signals
            .emit_rows_removed(index, 0, previous_count - 1, || {});
    }
}

impl ItemModel for ConnectionsModel {
    fn row_count(&self, parent: &ModelIndex) -> usize {
        let Some(node) = self.node_from_index(parent) else {
            return self.roots.len();
        };

        if parent.column() > 0 {
            return 0;
        }

        node.child_count()
    }

    fn column_count(&self, _parent: &ModelIndex) -> usize {
        1
    }

    fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData {
        let Some(node) = self.node_from_index(index) else {
            return ItemData::None;
        };

        match role {
            ItemRole::Display => ItemData::String(node.display_name()),
            ItemRole::Decoration => ItemData::from(node.icon_url()),
            ItemRole::Type => ItemData::from(node.kind().as_str()),
            ItemRole::OriginalName => ItemData::String(node.name()),
            _ => ItemData::None,
        }
    }

    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        if !self.has_index(row, column, parent) {
            return ModelIndex::invalid();
        }

        let child = match self.node_from_index(parent) {
            Some(parent_node) => parent_node.child(row),
            None => self.roots.get(row),
        };

        match child {
            Some(child) => self.create_index(&child, row, column),
            None => ModelIndex::invalid(),
        }
    }

    fn parent(&self, index: &ModelIndex) -> ModelIndex {
        let Some(child) = self.node_from_index(index) else {
            return ModelIndex::invalid();
        };

        match child.parent().and_then(|parent| parent.upgrade()) {
            Some(parent) => self.create_index(&parent, parent.row(), 0),
            None => ModelIndex::invalid(),
        }
    }

    fn signals(&self) -> &ModelSignals {
        &self.signals
    }

    fn flags(&self, index: &ModelIndex) -> ItemFlags {
        match self.node_from_index(index) {
            Some(node) => ItemFlags::none()
                .with_selectable(true)
                .with_enabled(node.is_enabled()),
            None => ItemFlags::none(),
        }
    }

    fn can_fetch_more(&self, parent: &ModelIndex) -> bool {
        self.node_from_index(parent)
            .is_some_and(|node| node.can_fetch_more())
    }

    fn fetch_more(&self, parent: &ModelIndex) {
        if let Some(node) = self.node_from_index(parent) {
            node.fetch_more();
        }
    }
}

static_assertions::assert_impl_all!(ConnectionsModel: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::memory_node::{MemoryNode, NodeSpec};
    use crate::settings::Settings;
    use parking_lot::Mutex;

    fn model() -> Arc<ConnectionsModel> {
        ConnectionsModel::new(Arc::new(Settings::new()))
    }

    fn server(model: &Arc<ConnectionsModel>, name: &str) -> Arc<MemoryNode> {
        MemoryNode::root(
            model.handle(),
            NodeSpec::new(NodeKind::Server, name)
                .child(NodeSpec::new(NodeKind::Database, "db0"))
                .child(NodeSpec::new(NodeKind::Database, "db1")),
        )
    }

    #[test]
    fn test_empty_model() {
        let model = model();
        let root = ModelIndex::invalid();
        assert_eq!(model.size(), 0);
        assert_eq!(model.row_count(&root), 0);
        assert!(!model.index(0, 0, &root).is_valid());
        assert!(!model.parent(&root).is_valid());
        assert!(!model.can_fetch_more(&root));
    }

    #[test]
    fn test_add_root_item_brackets_insert() {
        let model = model();
        let log = Arc::new(Mutex::new(Vec::new()));

        let about = log.clone();
        let observed = Arc::downgrade(&model);
        model
            .signals()
            .rows_about_to_be_inserted
            .connect(move |(parent, first, last)| {
                let size = observed.upgrade().map(|m| m.size()).unwrap_or_default();
                about.lock().push(("about", parent.is_valid(), *first, *last, size));
            });
        let done = log.clone();
        let observed = Arc::downgrade(&model);
        model
            .signals()
            .rows_inserted
            .connect(move |(parent, first, last)| {
                let size = observed.upgrade().map(|m| m.size()).unwrap_or_default();
                done.lock().push(("done", parent.is_valid(), *first, *last, size));
            });

        model.add_root_item(server(&model, "a"));
        model.add_root_item(server(&model, "b"));

        assert_eq!(
            *log.lock(),
            vec![
                ("about", false, 0, 0, 0),
                ("done", false, 0, 0, 1),
                ("about", false, 1, 1, 1),
                ("done", false, 1, 1, 2),
            ]
        );
    }

    #[test]
    fn test_add_same_root_twice_is_ignored() {
        let model = model();
        let node = server(&model, "a");
        model.add_root_item(node.clone());
        model.add_root_item(node);
        assert_eq!(model.size(), 1);
    }

    #[test]
    fn test_index_and_parent_navigation() {
        let model = model();
        model.add_root_item(server(&model, "local"));

        let server_index = model.index(0, 0, &ModelIndex::invalid());
        assert_eq!(model.display_text(&server_index).as_deref(), Some("local"));
        model.fetch_more(&server_index);

        let db1 = model.index(1, 0, &server_index);
        assert_eq!(model.display_text(&db1).as_deref(), Some("db1"));
        assert_eq!(model.item_type(&db1).as_string(), Some("database"));

        let parent = model.parent(&db1);
        assert_eq!(parent, server_index);
        assert!(!model.parent(&server_index).is_valid());
        assert!(!model.index(2, 0, &server_index).is_valid());
        assert!(!model.index(0, 1, &server_index).is_valid());
    }

    #[test]
    fn test_row_count_on_non_zero_column_is_zero() {
        let model = model();
        let node = server(&model, "local");
        model.add_root_item(node.clone());
        node.fetch_more();

        let dyn_node: Arc<dyn TreeNode> = node;
        let id = model.registry.record(&dyn_node);
        assert_eq!(model.row_count(&ModelIndex::new(0, 0, id)), 2);
        assert_eq!(model.row_count(&ModelIndex::new(0, 1, id)), 0);
    }

    #[test]
    fn test_flags_follow_enabled_state() {
        let model = model();
        let node = server(&model, "local");
        model.add_root_item(node.clone());

        let index = model.index(0, 0, &ModelIndex::invalid());
        assert_eq!(model.flags(&index), ItemFlags::new());

        node.set_enabled(false);
        let flags = model.flags(&index);
        assert!(flags.selectable);
        assert!(!flags.enabled);

        assert_eq!(model.flags(&ModelIndex::invalid()), ItemFlags::none());
    }

    #[test]
    fn test_data_roles() {
        let model = model();
        let node = MemoryNode::root(
            model.handle(),
            NodeSpec::new(NodeKind::Server, "local")
                .display_name("local (127.0.0.1)")
                .icon_url("qrc:/images/server.svg"),
        );
        model.add_root_item(node);

        let index = model.index(0, 0, &ModelIndex::invalid());
        assert_eq!(
            model.data(&index, ItemRole::Display).as_string(),
            Some("local (127.0.0.1)")
        );
        assert_eq!(
            model.data(&index, ItemRole::OriginalName).as_string(),
            Some("local")
        );
        assert_eq!(
            model.item_icon(&index).as_string(),
            Some("qrc:/images/server.svg")
        );
        assert!(model.data(&index, ItemRole::ToolTip).is_none());
        assert!(model.data(&ModelIndex::invalid(), ItemRole::Display).is_none());
        assert_eq!(model.role_names().get(&ItemRole::Type), Some(&"type"));
    }

    #[test]
    fn test_send_event_reaches_resolved_node() {
        let model = model();
        let node = server(&model, "local");
        model.add_root_item(node.clone());

        let index = model.index(0, 0, &ModelIndex::invalid());
        model.send_event(&index, "click");
        model.send_event(&ModelIndex::invalid(), "click");

        assert_eq!(node.received_events(), vec!["click".to_string()]);
    }

    #[test]
    fn test_metadata_delegation() {
        let model = model();
        model.add_root_item(server(&model, "local"));
        let index = model.index(0, 0, &ModelIndex::invalid());

        model.set_metadata(&index, "filter", ItemData::from("user:*"));
        assert_eq!(model.metadata(&index, "filter").as_string(), Some("user:*"));
        assert!(model.metadata(&index, "missing").is_none());
        assert!(model.metadata(&ModelIndex::invalid(), "filter").is_none());
    }

    #[test]
    fn test_item_changed_only_refreshes_loaded_branches() {
        let model = model();
        let node = server(&model, "local");
        model.add_root_item(node.clone());

        let changes = Arc::new(Mutex::new(0));
        let counter = changes.clone();
        model.signals().data_changed.connect(move |_| {
            *counter.lock() += 1;
        });

        node.set_display_name("renamed");
        assert_eq!(*changes.lock(), 0);

        node.fetch_more();
        node.set_display_name("renamed again");
        assert_eq!(*changes.lock(), 1);
    }
}
