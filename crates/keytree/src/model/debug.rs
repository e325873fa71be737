//! Text rendering of a model's loaded tree.
//!
//! ```
//! use std::sync::Arc;
//! use keytree::model::{ConnectionsModel, MemoryNode, ModelTreeDebug, NodeKind, NodeSpec, TreeStyle};
//! use keytree::settings::Settings;
//!
//! let model = ConnectionsModel::new(Arc::new(Settings::new()));
//! model.add_root_item(MemoryNode::root(model.handle(), NodeSpec::new(NodeKind::Server, "local")));
//!
//! let text = ModelTreeDebug::new().with_style(TreeStyle::Ascii).format(model.as_ref());
//! assert!(text.contains("local (server)"));
//! ```

use std::fmt;

use super::index::ModelIndex;
use super::role::ItemRole;
use super::traits::ItemModel;

/// Branch drawing style for [`ModelTreeDebug`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Indentation only.
    Compact,
}

/// Renders the currently loaded rows of an [`ItemModel`].
///
/// Only rows the model already knows about are visited; rendering never
/// triggers a fetch.
#[derive(Debug, Clone)]
pub struct ModelTreeDebug {
    style: TreeStyle,
    show_types: bool,
    show_rows: bool,
    max_depth: Option<usize>,
}

impl Default for ModelTreeDebug {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelTreeDebug {
    /// Creates a renderer showing kinds, without rows, at unlimited depth.
    pub fn new() -> Self {
        Self {
            style: TreeStyle::default(),
            show_types: true,
            show_rows: false,
            max_depth: None,
        }
    }

    /// Sets the branch style.
    pub fn with_style(mut self, style: TreeStyle) -> Self {
        self.style = style;
        self
    }

    /// Shows or hides the kind after each name.
    pub fn show_types(mut self, show: bool) -> Self {
        self.show_types = show;
        self
    }

    /// Shows or hides each item's row.
    pub fn show_rows(mut self, show: bool) -> Self {
        self.show_rows = show;
        self
    }

    /// Limits the rendered depth; top-level items are depth 0.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Renders the whole model.
    pub fn format(&self, model: &dyn ItemModel) -> String {
        ModelTree {
            debug: self,
            model,
        }
        .to_string()
    }

    fn write_children(
        &self,
        model: &dyn ItemModel,
        parent: &ModelIndex,
        depth: usize,
        lead: &str,
        out: &mut impl fmt::Write,
    ) -> fmt::Result {
        if self.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }

        let count = model.row_count(parent);
        for row in 0..count {
            let index = model.index(row, 0, parent);
            if !index.is_valid() {
                continue;
            }
            let is_last = row + 1 == count;

            let (connector, continuation) = match (self.style, is_last) {
                (TreeStyle::Ascii, false) => ("+-- ", "|   "),
                (TreeStyle::Ascii, true) => ("`-- ", "    "),
                (TreeStyle::Unicode, false) => ("\u{251c}\u{2500}\u{2500} ", "\u{2502}   "),
                (TreeStyle::Unicode, true) => ("\u{2514}\u{2500}\u{2500} ", "    "),
                (TreeStyle::Compact, _) => ("- ", "  "),
            };

            let name = model.display_text(&index).unwrap_or_default();
            write!(out, "{lead}{connector}{name}")?;
            if self.show_types
                && let Some(kind) = model.data(&index, ItemRole::Type).as_string()
            {
                write!(out, " ({kind})")?;
            }
            if self.show_rows {
                write!(out, " [row {}]", index.row())?;
            }
            writeln!(out)?;

            let child_lead = format!("{lead}{continuation}");
            self.write_children(model, &index, depth + 1, &child_lead, out)?;
        }

        Ok(())
    }
}

struct ModelTree<'a> {
    debug: &'a ModelTreeDebug,
    model: &'a dyn ItemModel,
}

impl fmt::Display for ModelTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = ModelIndex::invalid();
        writeln!(f, "Model Tree ({} top-level items):", self.model.row_count(&root))?;
        if !self.model.has_children(&root) {
            return writeln!(f, "  (empty)");
        }
        self.debug.write_children(self.model, &root, 0, "", f)
    }
}
