//! Core traits for the connections tree model.
//!
//! This module defines the positional interface models implement for the
//! view layer, and the signals through which they announce structural and
//! data changes.

use keytree_core::Signal;

use super::index::ModelIndex;
use super::role::{ItemData, ItemRole};

/// Flags indicating what operations are allowed on an item.
///
/// `ItemFlags::default()` carries no flags at all, which is what the model
/// reports for positions it cannot resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemFlags {
    /// Item can be selected.
    pub selectable: bool,
    /// Item is enabled (can interact).
    pub enabled: bool,
}

impl ItemFlags {
    /// Creates flags for a selectable, enabled item.
    pub fn new() -> Self {
        Self {
            selectable: true,
            enabled: true,
        }
    }

    /// Creates flags with nothing set.
    pub fn none() -> Self {
        Self::default()
    }

    /// Sets the selectable flag.
    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    /// Sets the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Options for [`ItemModel::match_items`].
///
/// Matching always compares whole strings; there is no wildcard or regex
/// mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchFlags {
    /// Search the children of every visited item, to unbounded depth.
    pub recursive: bool,
    /// Compare with case sensitivity.
    pub case_sensitive: bool,
}

impl MatchFlags {
    /// Exact, case-sensitive, recursive matching.
    pub const fn exact_recursive() -> Self {
        Self {
            recursive: true,
            case_sensitive: true,
        }
    }
}

impl Default for MatchFlags {
    fn default() -> Self {
        Self {
            recursive: false,
            case_sensitive: true,
        }
    }
}

/// The positional interface a hierarchical model exposes to views.
///
/// Positions are addressed with [`ModelIndex`]; the invalid index stands for
/// the implicit root. Views request lazily-loaded children through
/// [`can_fetch_more`](ItemModel::can_fetch_more) and
/// [`fetch_more`](ItemModel::fetch_more) and learn about the outcome from
/// [`signals`](ItemModel::signals).
pub trait ItemModel: Send + Sync {
    /// Returns the number of rows under the given parent.
    fn row_count(&self, parent: &ModelIndex) -> usize;

    /// Returns the number of columns for children of the given parent.
    fn column_count(&self, parent: &ModelIndex) -> usize;

    /// Returns the data stored under the given role for the item at index.
    ///
    /// Returns `ItemData::None` for invalid indices and unsupported roles.
    fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData;

    /// Creates a model index for the given row and column under parent.
    ///
    /// Returns `ModelIndex::invalid()` if the position is out of bounds.
    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex;

    /// Returns the parent of the given index.
    ///
    /// Returns `ModelIndex::invalid()` for top-level items and for indices
    /// that cannot be resolved.
    fn parent(&self, index: &ModelIndex) -> ModelIndex;

    /// Returns the signals for this model.
    fn signals(&self) -> &ModelSignals;

    // -------------------------------------------------------------------------
    // Optional methods with default implementations
    // -------------------------------------------------------------------------

    /// Returns the flags for the item at the given index.
    fn flags(&self, _index: &ModelIndex) -> ItemFlags {
        ItemFlags::new()
    }

    /// Returns `true` if the item at parent has any children.
    fn has_children(&self, parent: &ModelIndex) -> bool {
        self.row_count(parent) > 0
    }

    /// Returns `true` if more data can be fetched for the given parent.
    fn can_fetch_more(&self, _parent: &ModelIndex) -> bool {
        false
    }

    /// Fetches more data for the given parent.
    fn fetch_more(&self, _parent: &ModelIndex) {}

    // -------------------------------------------------------------------------
    // Convenience methods
    // -------------------------------------------------------------------------

    /// Returns `true` if `(row, column)` addresses an existing item under parent.
    fn has_index(&self, row: usize, column: usize, parent: &ModelIndex) -> bool {
        row < self.row_count(parent) && column < self.column_count(parent)
    }

    /// Returns the display text for an item.
    fn display_text(&self, index: &ModelIndex) -> Option<String> {
        self.data(index, ItemRole::Display).into_string()
    }

    /// Creates a sibling index at the given row and column.
    fn sibling(&self, index: &ModelIndex, row: usize, column: usize) -> ModelIndex {
        if !index.is_valid() {
            return ModelIndex::invalid();
        }
        self.index(row, column, &self.parent(index))
    }

    /// Finds items whose `role` data equals `value`.
    ///
    /// The search starts at `start` and walks forward through its siblings;
    /// with `flags.recursive` it also descends into every visited item's
    /// children. Returns all hits in visiting order.
    fn match_items(
        &self,
        start: &ModelIndex,
        role: ItemRole,
        value: &str,
        flags: MatchFlags,
    ) -> Vec<ModelIndex> {
        let mut hits = Vec::new();
        if start.is_valid() {
            collect_matches(self, start, role, value, flags, &mut hits);
        }
        hits
    }
}

fn collect_matches<M: ItemModel + ?Sized>(
    model: &M,
    start: &ModelIndex,
    role: ItemRole,
    value: &str,
    flags: MatchFlags,
    hits: &mut Vec<ModelIndex>,
) {
    let parent = model.parent(start);
    let column = start.column();

    for row in start.row()..model.row_count(&parent) {
        let index = model.index(row, column, &parent);
        if !index.is_valid() {
            continue;
        }

        if let Some(text) = model.data(&index, role).as_string() {
            let found = if flags.case_sensitive {
                text == value
            } else {
                text.to_lowercase() == value.to_lowercase()
            };
            if found {
                hits.push(index);
            }
        }

        if flags.recursive && model.has_children(&index) {
            let first_child = model.index(0, column, &index);
            if first_child.is_valid() {
                collect_matches(model, &first_child, role, value, flags, hits);
            }
        }
    }
}

/// Collection of signals emitted by item models.
///
/// # Signal Usage
///
/// - **Before modifications**: `rows_about_to_be_*`
/// - **After modifications**: `rows_*`
/// - **Data changes**: `data_changed` for value modifications
pub struct ModelSignals {
    /// Emitted just before rows are inserted.
    /// Args: (parent index, first row, last row)
    pub rows_about_to_be_inserted: Signal<(ModelIndex, usize, usize)>,

    /// Emitted after rows have been inserted.
    /// Args: (parent index, first row, last row)
    pub rows_inserted: Signal<(ModelIndex, usize, usize)>,

    /// Emitted just before rows are removed.
    /// Args: (parent index, first row, last row)
    pub rows_about_to_be_removed: Signal<(ModelIndex, usize, usize)>,

    /// Emitted after rows have been removed.
    /// Args: (parent index, first row, last row)
    pub rows_removed: Signal<(ModelIndex, usize, usize)>,

    /// Emitted when data in existing items changes.
    /// Args: (top-left index, bottom-right index, changed roles)
    pub data_changed: Signal<(ModelIndex, ModelIndex, Vec<ItemRole>)>,
}

impl Default for ModelSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelSignals {
    /// Creates a new set of model signals.
    pub fn new() -> Self {
        Self {
            rows_about_to_be_inserted: Signal::new(),
            rows_inserted: Signal::new(),
            rows_about_to_be_removed: Signal::new(),
            rows_removed: Signal::new(),
            data_changed: Signal::new(),
        }
    }

    /// Emits signals for row insertion.
    ///
    /// Calls the provided function between the about_to_be_inserted and inserted signals.
    pub fn emit_rows_inserted<F>(&self, parent: ModelIndex, first: usize, last: usize, insert_fn: F)
    where
        F: FnOnce(),
    {
        self.rows_about_to_be_inserted.emit((parent, first, last));
        insert_fn();
        self.rows_inserted.emit((parent, first, last));
    }

    /// Emits signals for row removal.
    ///
    /// Calls the provided function between the about_to_be_removed and removed signals.
    pub fn emit_rows_removed<F>(&self, parent: ModelIndex, first: usize, last: usize, remove_fn: F)
    where
        F: FnOnce(),
    {
        self.rows_about_to_be_removed.emit((parent, first, last));
        remove_fn();
        self.rows_removed.emit((parent, first, last));
    }

    /// Emits the data_changed signal for a single item.
    pub fn emit_data_changed_single(&self, index: ModelIndex, roles: Vec<ItemRole>) {
        self.data_changed.emit((index, index, roles));
    }
}
