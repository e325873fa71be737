//! keytree - a lazily-loaded connections tree model for key-value browsers.
//!
//! This is the main crate. It re-exports the core signal and logging
//! systems and adds the tree model and the settings store.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use keytree::model::{ConnectionsModel, ItemModel, MemoryNode, ModelIndex, NodeKind, NodeSpec};
//! use keytree::settings::Settings;
//!
//! let model = ConnectionsModel::new(Arc::new(Settings::new()));
//!
//! // Views react to structural changes through the model's signals.
//! model.signals().rows_inserted.connect(|(parent, first, last)| {
//!     println!("rows {first}..={last} inserted under {parent:?}");
//! });
//!
//! let server = MemoryNode::root(
//!     model.handle(),
//!     NodeSpec::new(NodeKind::Server, "local").child(NodeSpec::new(NodeKind::Database, "db0")),
//! );
//! model.add_root_item(server);
//!
//! let server_index = model.index(0, 0, &ModelIndex::invalid());
//! model.fetch_more(&server_index);
//! assert_eq!(model.row_count(&server_index), 1);
//! ```

pub use keytree_core::*;

pub mod model;
pub mod settings;

/// Commonly used types.
pub mod prelude {
    pub use crate::model::{
        ConnectionsModel, ItemData, ItemModel, ItemRole, ModelHandle, ModelIndex, NodeKind,
        TreeNode,
    };
    pub use crate::settings::{Settings, SettingsSource};
    pub use keytree_core::Signal;
}
