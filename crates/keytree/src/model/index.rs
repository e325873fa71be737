//! Model index for addressing items in the connections tree.
//!
//! The `ModelIndex` type is the way views and callers reference items
//! within an `ItemModel`. It is a lightweight (row, column, internal id)
//! triple; the internal id is a generation-checked registry key for the
//! node it points at and never keeps that node alive.

use std::hash::{Hash, Hasher};

/// Represents a position within an `ItemModel`.
///
/// Each index contains:
/// - Row and column within the parent
/// - An internal ID for model-specific identification (for the connections
///   tree, the registry key of the referenced node)
///
/// # Index Validity
///
/// Model indices are hints. They should be used immediately and not stored
/// long-term: after a node is dropped or its children are reloaded, an
/// index that referred to it resolves to nothing.
///
/// # Example
///
/// ```ignore
/// use keytree::model::{ItemModel, ModelIndex};
///
/// // Get a top-level item
/// let server = model.index(0, 0, &ModelIndex::invalid());
///
/// // Get one of its children
/// let database = model.index(0, 0, &server);
/// ```
#[derive(Clone, Copy)]
pub struct ModelIndex {
    /// The row within the parent.
    row: usize,
    /// The column within the parent.
    column: usize,
    /// Model-specific identifier of the referenced item.
    internal_id: u64,
    /// Whether this index is valid.
    valid: bool,
}

impl Default for ModelIndex {
    fn default() -> Self {
        Self::invalid()
    }
}

impl ModelIndex {
    /// Creates an invalid (null) model index.
    ///
    /// An invalid index is used to represent:
    /// - The implicit root of the model (as a parent reference)
    /// - A non-existent or out-of-bounds item
    #[inline]
    pub const fn invalid() -> Self {
        Self {
            row: 0,
            column: 0,
            internal_id: 0,
            valid: false,
        }
    }

    /// Creates a new valid model index.
    ///
    /// This is typically called by model implementations rather than
    /// directly.
    ///
    /// # Arguments
    ///
    /// * `row` - The row within the parent
    /// * `column` - The column within the parent
    /// * `internal_id` - Model-specific identifier
    #[inline]
    pub const fn new(row: usize, column: usize, internal_id: u64) -> Self {
        Self {
            row,
            column,
            internal_id,
            valid: true,
        }
    }

    /// Returns `true` if this is a valid index.
    ///
    /// Invalid indices are returned when:
    /// - Requesting an out-of-bounds item
    /// - Using `ModelIndex::invalid()`
    /// - Referencing the root (which has no index)
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Returns the row of this index within its parent.
    ///
    /// Returns 0 for invalid indices.
    #[inline]
    pub fn row(&self) -> usize {
        self.row
    }

    /// Returns the column of this index within its parent.
    ///
    /// Returns 0 for invalid indices.
    #[inline]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Returns the internal ID associated with this index.
    #[inline]
    pub fn internal_id(&self) -> u64 {
        self.internal_id
    }
}

impl std::fmt::Debug for ModelIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            f.debug_struct("ModelIndex")
                .field("row", &self.row)
                .field("column", &self.column)
                .field("internal_id", &format_args!("{:#x}", self.internal_id))
                .finish()
        } else {
            write!(f, "ModelIndex(invalid)")
        }
    }
}

impl PartialEq for ModelIndex {
    fn eq(&self, other: &Self) -> bool {
        // Two invalid indices are equal
        if !self.is_valid() && !other.is_valid() {
            return true;
        }
        self.valid == other.valid
            && self.row == other.row
            && self.column == other.column
            && self.internal_id == other.internal_id
    }
}

impl Eq for ModelIndex {}

impl Hash for ModelIndex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.valid.hash(state);
        if self.valid {
            self.row.hash(state);
            self.column.hash(state);
            self.internal_id.hash(state);
        }
    }
}
