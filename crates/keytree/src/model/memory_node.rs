//! An in-memory [`TreeNode`] implementation.
//!
//! `MemoryNode` holds a staged description of its children and publishes it
//! when asked to fetch. It announces every state change through its
//! [`ModelHandle`] the way a network-backed node would once its I/O
//! completes, which makes it suitable for tests, demos and offline trees.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use keytree_core::logging::targets;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::events::ModelHandle;
use super::node::{NodeKind, TreeNode};
use super::role::ItemData;

/// Description of a node and its (not yet loaded) children.
///
/// Specs can be built in code or deserialized:
///
/// ```
/// use keytree::model::{NodeKind, NodeSpec};
///
/// let spec: NodeSpec = serde_json::from_str(r#"{
///     "kind": "database",
///     "name": "db0",
///     "children": [{ "kind": "namespace", "name": "user" }]
/// }"#).unwrap();
/// assert_eq!(spec, NodeSpec::new(NodeKind::Database, "db0")
///     .child(NodeSpec::new(NodeKind::Namespace, "user")));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Node kind.
    pub kind: NodeKind,
    /// Original name.
    pub name: String,
    /// Name shown to the user; defaults to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Icon URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    /// Children published on the first fetch.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    /// Creates a node description with no children.
    pub fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            display_name: None,
            icon_url: None,
            children: Vec::new(),
        }
    }

    /// Sets the display name.
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Sets the icon URL.
    pub fn icon_url(mut self, icon_url: impl Into<String>) -> Self {
        self.icon_url = Some(icon_url.into());
        self
    }

    /// Appends a child spec.
    pub fn child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }

    /// Appends several child specs.
    pub fn children(mut self, children: impl IntoIterator<Item = NodeSpec>) -> Self {
        self.children.extend(children);
        self
    }
}

struct NodeState {
    display_name: Option<String>,
    icon_url: Option<String>,
    enabled: bool,
    staged: Vec<NodeSpec>,
    children: Vec<Arc<MemoryNode>>,
    loaded: bool,
    metadata: HashMap<String, ItemData>,
    events: Vec<String>,
}

/// A tree node backed by an in-memory [`NodeSpec`].
///
/// Keys never load children. Every other kind loads its staged children on
/// the first [`fetch_more`](TreeNode::fetch_more) and again after
/// [`unload_children`](MemoryNode::unload_children).
///
/// Recognized events for [`handle_event`](TreeNode::handle_event):
/// `"reload"` and `"unload"`. All events are recorded.
pub struct MemoryNode {
    me: Weak<MemoryNode>,
    handle: ModelHandle,
    parent: Option<Weak<dyn TreeNode>>,
    kind: NodeKind,
    name: String,
    row: AtomicUsize,
    fetches: AtomicUsize,
    state: RwLock<NodeState>,
}

impl MemoryNode {
    /// Creates a top-level node.
    pub fn root(handle: ModelHandle, spec: NodeSpec) -> Arc<Self> {
        Self::build(handle, spec, None, 0)
    }

    fn build(
        handle: ModelHandle,
        spec: NodeSpec,
        parent: Option<Weak<dyn TreeNode>>,
        row: usize,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            handle,
            parent,
            kind: spec.kind,
            name: spec.name,
            row: AtomicUsize::new(row),
            fetches: AtomicUsize::new(0),
            state: RwLock::new(NodeState {
                display_name: spec.display_name,
                icon_url: spec.icon_url,
                enabled: true,
                staged: spec.children,
                children: Vec::new(),
                loaded: false,
                metadata: HashMap::new(),
                events: Vec::new(),
            }),
        })
    }

    fn weak(&self) -> Weak<dyn TreeNode> {
        self.me.clone()
    }

    /// Returns `true` once children have been published.
    pub fn is_loaded(&self) -> bool {
        self.state.read().loaded
    }

    /// Returns how many times children have been published.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Returns the loaded children in row order.
    pub fn children(&self) -> Vec<Arc<MemoryNode>> {
        self.state.read().children.clone()
    }

    /// Returns the loaded child with the given original name.
    pub fn child_named(&self, name: &str) -> Option<Arc<MemoryNode>> {
        self.state
            .read()
            .children
            .iter()
            .find(|child| child.name == name)
            .cloned()
    }

    /// Replaces the children published by the next load.
    pub fn stage_children(&self, children: Vec<NodeSpec>) {
        self.state.write().staged = children;
    }

    /// Drops the loaded children and announces how many there were.
    ///
    /// Does nothing if the node is not loaded.
    pub fn unload_children(&self) {
        let previous_count = {
            let mut state = self.state.write();
            if !state.loaded {
                return;
            }
            state.loaded = false;
            let count = state.children.len();
            state.children.clear();
            count
        };

        tracing::trace!(target: targets::MODEL, name = %self.name, previous_count, "unloaded");
        self.handle.children_unloaded(self.weak(), previous_count);
    }

    /// Drops the loaded children and publishes the staged ones again.
    pub fn reload(&self) {
        self.unload_children();
        self.fetch_more();
    }

    /// Changes the display name and announces the change.
    pub fn set_display_name(&self, display_name: impl Into<String>) {
        self.state.write().display_name = Some(display_name.into());
        self.handle.item_changed(self.weak());
    }

    /// Enables or disables the node.
    pub fn set_enabled(&self, enabled: bool) {
        self.state.write().enabled = enabled;
    }

    /// Returns the events received through `handle_event`, oldest first.
    pub fn received_events(&self) -> Vec<String> {
        self.state.read().events.clone()
    }
}

impl TreeNode for MemoryNode {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn display_name(&self) -> String {
        self.state
            .read()
            .display_name
            .clone()
            .unwrap_or_else(|| self.name.clone())
    }

    fn icon_url(&self) -> Option<String> {
        self.state.read().icon_url.clone()
    }

    fn kind(&self) -> NodeKind {
        self.kind.clone()
    }

    fn row(&self) -> usize {
        self.row.load(Ordering::SeqCst)
    }

    fn set_row(&self, row: usize) {
        self.row.store(row, Ordering::SeqCst);
    }

    fn parent(&self) -> Option<Weak<dyn TreeNode>> {
        self.parent.clone()
    }

    fn child_count(&self) -> usize {
        self.state.read().children.len()
    }

    fn child(&self, row: usize) -> Option<Arc<dyn TreeNode>> {
        let child = self.state.read().children.get(row).cloned()?;
        Some(child)
    }

    fn is_enabled(&self) -> bool {
        self.state.read().enabled
    }

    fn metadata(&self, key: &str) -> ItemData {
        self.state
            .read()
            .metadata
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    fn set_metadata(&self, key: &str, value: ItemData) {
        self.state.write().metadata.insert(key.to_string(), value);
    }

    fn can_fetch_more(&self) -> bool {
        self.kind != NodeKind::Key && !self.state.read().loaded
    }

    fn fetch_more(&self) {
        if !self.can_fetch_more() {
            return;
        }

        {
            let mut state = self.state.write();
            if state.loaded {
                return;
            }
            let children = state
                .staged
                .iter()
                .enumerate()
                .map(|(row, spec)| {
                    MemoryNode::build(self.handle.clone(), spec.clone(), Some(self.weak()), row)
                })
                .collect();
            state.children = children;
            state.loaded = true;
        }

        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.handle.children_loaded(self.weak());
    }

    fn handle_event(&self, event: &str) {
        self.state.write().events.push(event.to_string());

        match event {
            "reload" => self.reload(),
            "unload" => self.unload_children(),
            _ => {}
        }
    }
}

impl std::fmt::Debug for MemoryNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("MemoryNode")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("row", &self.row())
            .field("loaded", &state.loaded)
            .field("children", &state.children.len())
            .finish()
    }
}

static_assertions::assert_impl_all!(MemoryNode: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    fn database() -> Arc<MemoryNode> {
        MemoryNode::root(
            ModelHandle::detached(),
            NodeSpec::new(NodeKind::Database, "db0").children([
                NodeSpec::new(NodeKind::Namespace, "user"),
                NodeSpec::new(NodeKind::Namespace, "session"),
                NodeSpec::new(NodeKind::Key, "counter"),
            ]),
        )
    }

    #[test]
    fn test_fetch_publishes_children_with_rows() {
        let db = database();
        assert!(db.can_fetch_more());
        assert_eq!(db.child_count(), 0);

        db.fetch_more();
        assert!(db.is_loaded());
        assert!(!db.can_fetch_more());
        assert_eq!(db.fetch_count(), 1);

        let rows: Vec<_> = db.children().iter().map(|c| (c.name(), c.row())).collect();
        assert_eq!(
            rows,
            vec![
                ("user".to_string(), 0),
                ("session".to_string(), 1),
                ("counter".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_second_fetch_is_ignored() {
        let db = database();
        db.fetch_more();
        db.fetch_more();
        assert_eq!(db.fetch_count(), 1);
    }

    #[test]
    fn test_children_point_back_to_parent() {
        let db = database();
        db.fetch_more();

        let user = db.child_named("user").unwrap();
        let parent = user.parent().and_then(|p| p.upgrade()).unwrap();
        assert_eq!(parent.name(), "db0");
    }

    #[test]
    fn test_keys_never_fetch() {
        let key = MemoryNode::root(
            ModelHandle::detached(),
            NodeSpec::new(NodeKind::Key, "counter").child(NodeSpec::new(NodeKind::Key, "x")),
        );
        assert!(!key.can_fetch_more());
        key.fetch_more();
        assert_eq!(key.child_count(), 0);
        assert_eq!(key.fetch_count(), 0);
    }

    #[test]
    fn test_unload_and_reload() {
        let db = database();
        db.fetch_more();
        let old_child = Arc::downgrade(&db.children()[0]);

        db.unload_children();
        assert_eq!(db.child_count(), 0);
        assert!(db.can_fetch_more());
        assert!(old_child.upgrade().is_none());

        db.stage_children(vec![NodeSpec::new(NodeKind::Namespace, "cache")]);
        db.fetch_more();
        assert_eq!(db.child(0).unwrap().name(), "cache");
        assert_eq!(db.fetch_count(), 2);
    }

    #[test]
    fn test_handle_event_records_and_dispatches() {
        let db = database();
        db.fetch_more();

        db.handle_event("click");
        db.handle_event("unload");
        assert!(!db.is_loaded());

        db.handle_event("reload");
        assert!(db.is_loaded());
        assert_eq!(db.received_events(), vec!["click", "unload", "reload"]);
    }

    #[test]
    fn test_display_name_defaults_to_name() {
        let db = database();
        assert_eq!(db.display_name(), "db0");
        db.set_display_name("db0 (3)");
        assert_eq!(db.display_name(), "db0 (3)");
        assert_eq!(db.name(), "db0");
    }

    #[test]
    fn test_metadata_store() {
        let db = database();
        assert!(db.metadata("filter").is_none());
        db.set_metadata("filter", ItemData::from("user:*"));
        assert_eq!(db.metadata("filter").as_string(), Some("user:*"));
    }

    #[test]
    fn test_spec_serde() {
        let spec = NodeSpec::new(NodeKind::Server, "local").display_name("Local");
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "kind": "server", "name": "local", "display_name": "Local" })
        );
    }
}
