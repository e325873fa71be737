//! Connections tree model.
//!
//! This module provides the model half of a model/view split for a
//! key-value browser: servers contain databases, databases contain
//! namespaces and keys, and namespaces nest. Nodes load their children
//! lazily and the model keeps views informed of every structural change.
//!
//! # Core Components
//!
//! - [`ModelIndex`]: Lightweight position handle (row, column, node identity)
//! - [`TreeNode`]: The contract every node kind implements
//! - [`ItemModel`]: The positional interface views consume
//! - [`ConnectionsModel`]: The model itself
//! - [`ModelSignals`] and [`TreeEvents`]: Outgoing and incoming notifications
//!
//! # Lazy Loading
//!
//! A view asks [`ItemModel::can_fetch_more`] for an item and, when it is
//! expanded, calls [`ItemModel::fetch_more`]. The node loads its children
//! and reports back through its [`ModelHandle`]; the model then announces
//! the inserted rows. When a database finishes loading, the model asks the
//! view to expand it and to reopen the namespaces that were expanded before.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use keytree::model::{ConnectionsModel, ItemModel, MemoryNode, ModelIndex, NodeKind, NodeSpec};
//! use keytree::settings::Settings;
//!
//! let model = ConnectionsModel::new(Arc::new(Settings::new()));
//! let server = MemoryNode::root(model.handle(), NodeSpec::new(NodeKind::Server, "local"));
//! model.add_root_item(server);
//!
//! assert_eq!(model.row_count(&ModelIndex::invalid()), 1);
//! ```

mod debug;
mod events;
mod expansion;
mod index;
mod memory_node;
mod node;
mod registry;
mod role;
mod root_items;
mod traits;
mod tree_model;

pub use debug::{ModelTreeDebug, TreeStyle};
pub use events::{ModelHandle, TreeEvents};
pub use expansion::ExpansionTracker;
pub use index::ModelIndex;
pub use memory_node::{MemoryNode, NodeSpec};
pub use node::{NodeKind, TreeNode};
pub use registry::{NodeKey, NodeRegistry};
pub use role::{ItemData, ItemRole};
pub use root_items::RootItems;
pub use traits::{ItemFlags, ItemModel, MatchFlags, ModelSignals};
pub use tree_model::ConnectionsModel;
