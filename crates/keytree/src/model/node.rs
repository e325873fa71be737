//! The node contract consumed by the connections tree model.
//!
//! Concrete node kinds (servers, databases, namespaces, keys) live outside
//! the model. The model only sees them through [`TreeNode`]: identity, child
//! access, a parent back-reference, metadata and lazy-loading hooks.
//!
//! # Ownership
//!
//! A node is owned by its parent through an `Arc`, or by the model's root
//! collection for top-level nodes. Back-references to parents are `Weak` and
//! must be upgraded at every use.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Weak};

use serde::{Deserialize, Serialize};

use super::role::ItemData;

/// The kind of a tree node.
///
/// Kinds drive model policy: children loaded under a [`NodeKind::Database`]
/// trigger namespace restoration, and only [`NodeKind::Namespace`] nodes
/// are tracked as expanded. The lowercase identifiers (`"server"`,
/// `"database"`, `"namespace"`, `"key"`) are what external consumers see.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum NodeKind {
    /// A connection to a server.
    Server,
    /// A logical database on a server.
    Database,
    /// A key-name prefix grouping other namespaces and keys.
    Namespace,
    /// A single key.
    Key,
    /// Any other node kind, carried by its identifier.
    Other(String),
}

impl NodeKind {
    /// Returns the external identifier of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Server => "server",
            NodeKind::Database => "database",
            NodeKind::Namespace => "namespace",
            NodeKind::Key => "key",
            NodeKind::Other(tag) => tag,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for NodeKind {
    fn from(tag: &str) -> Self {
        match tag {
            "server" => NodeKind::Server,
            "database" => NodeKind::Database,
            "namespace" => NodeKind::Namespace,
            "key" => NodeKind::Key,
            other => NodeKind::Other(other.to_string()),
        }
    }
}

impl From<String> for NodeKind {
    fn from(tag: String) -> Self {
        NodeKind::from(tag.as_str())
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.as_str().to_string()
    }
}

impl FromStr for NodeKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(NodeKind::from(s))
    }
}

/// A node in the connections tree.
///
/// Implementations use interior mutability: the model and the view only
/// ever hold shared references.
///
/// # Rows
///
/// [`row`](TreeNode::row) is the node's position among its siblings. The
/// container assigns it at insertion time and must update it whenever an
/// earlier sibling is inserted or removed, so that siblings always occupy
/// rows `0..n`. The model assigns rows of top-level nodes through
/// [`set_row`](TreeNode::set_row).
///
/// # Lazy loading
///
/// Children appear when [`fetch_more`](TreeNode::fetch_more) completes; the
/// node then reports "children loaded" to the model through its
/// [`ModelHandle`](super::ModelHandle). Dropping children is reported as
/// "children unloaded" together with the child count before the drop.
pub trait TreeNode: Send + Sync {
    /// Returns the original (non-display) name of the node.
    fn name(&self) -> String;

    /// Returns the name shown to the user.
    fn display_name(&self) -> String {
        self.name()
    }

    /// Returns the icon URL for the node, if any.
    fn icon_url(&self) -> Option<String> {
        None
    }

    /// Returns the kind of the node.
    fn kind(&self) -> NodeKind;

    /// Returns the node's position among its siblings.
    fn row(&self) -> usize;

    /// Assigns the node's position among its siblings.
    fn set_row(&self, row: usize);

    /// Returns the owning parent, or `None` for top-level nodes.
    fn parent(&self) -> Option<Weak<dyn TreeNode>>;

    /// Returns the number of currently loaded children.
    fn child_count(&self) -> usize;

    /// Returns the child at `row`, if loaded.
    fn child(&self, row: usize) -> Option<Arc<dyn TreeNode>>;

    /// Returns `true` if the node can be interacted with.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Returns the metadata value stored under `key`.
    fn metadata(&self, _key: &str) -> ItemData {
        ItemData::None
    }

    /// Stores a metadata value under `key`.
    fn set_metadata(&self, _key: &str, _value: ItemData) {}

    /// Returns `true` if children can be fetched for this node.
    fn can_fetch_more(&self) -> bool {
        false
    }

    /// Starts fetching children for this node.
    fn fetch_more(&self) {}

    /// Handles a named event forwarded by the view (e.g. `"click"`).
    fn handle_event(&self, _event: &str) {}
}

impl fmt::Debug for dyn TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeNode")
            .field("kind", &self.kind())
            .field("name", &self.name())
            .field("row", &self.row())
            .finish()
    }
}
