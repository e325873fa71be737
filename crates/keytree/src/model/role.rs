//! Data roles and values for item models.
//!
//! Roles define what aspect of an item is being requested. The connections
//! tree exposes the display name, an icon, the node kind and the original
//! (non-display) name of every node.

use std::any::Any;
use std::sync::Arc;

/// Roles for accessing different aspects of item data.
///
/// # Roles
///
/// - **Display**: The name shown to the user (may be decorated, e.g. with a
///   key count)
/// - **Decoration**: Icon URL for the item
/// - **ToolTip**: Text shown when hovering over the item
/// - **Type**: The node kind identifier (`"server"`, `"database"`, ...)
/// - **OriginalName**: The undecorated name used to re-identify nodes
/// - **User**: Application-specific roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemRole {
    /// Display name of the item. Returns `String`.
    Display,
    /// Icon URL for the item. Returns `String`.
    Decoration,
    /// Tooltip text. Returns `String`.
    ToolTip,
    /// Node kind identifier. Returns `String`.
    Type,
    /// Original (non-display) name. Returns `String`.
    OriginalName,
    /// Application-specific data, `User(n)` for n >= 0.
    User(u32),
}

impl ItemRole {
    /// Returns the numeric value of this role.
    ///
    /// Standard roles have fixed values below 256, user roles start at 256.
    pub fn value(&self) -> u32 {
        match self {
            ItemRole::Display => 0,
            ItemRole::Decoration => 1,
            ItemRole::ToolTip => 3,
            ItemRole::Type => 32,
            ItemRole::OriginalName => 33,
            ItemRole::User(n) => 256 + n,
        }
    }

    /// Creates an ItemRole from a numeric value.
    ///
    /// Returns `None` for values below 256 that name no role.
    pub fn from_value(value: u32) -> Option<Self> {
        match value {
            0 => Some(ItemRole::Display),
            1 => Some(ItemRole::Decoration),
            3 => Some(ItemRole::ToolTip),
            32 => Some(ItemRole::Type),
            33 => Some(ItemRole::OriginalName),
            n if n >= 256 => Some(ItemRole::User(n - 256)),
            _ => None,
        }
    }
}

/// Dynamically typed value for item data and node metadata.
///
/// `ItemData` is what `ItemModel::data` returns and what nodes store in
/// their metadata maps. `ItemData::None` means "no value".
///
/// # Example
///
/// ```
/// use keytree::model::ItemData;
///
/// let data = ItemData::from("db0");
/// assert_eq!(data.as_string(), Some("db0"));
///
/// let data = ItemData::new(42u32);
/// assert_eq!(data.downcast::<u32>(), Some(&42));
/// ```
#[derive(Debug, Clone, Default)]
pub enum ItemData {
    /// No data.
    #[default]
    None,
    /// String data.
    String(String),
    /// Integer data.
    Int(i64),
    /// Floating point data.
    Float(f64),
    /// Boolean data.
    Bool(bool),
    /// Raw bytes (binary-safe key names and values).
    Bytes(Vec<u8>),
    /// Custom data (type-erased, shared).
    Custom(Arc<dyn Any + Send + Sync>),
}

impl ItemData {
    /// Creates new custom data from any type.
    pub fn new<T: Any + Send + Sync + 'static>(value: T) -> Self {
        ItemData::Custom(Arc::new(value))
    }

    /// Returns `true` if this is `ItemData::None`.
    pub fn is_none(&self) -> bool {
        matches!(self, ItemData::None)
    }

    /// Returns `true` if this contains some data.
    pub fn is_some(&self) -> bool {
        !self.is_none()
    }

    /// Attempts to get the data as a string slice.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            ItemData::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attempts to get the data as an owned string.
    pub fn into_string(self) -> Option<String> {
        match self {
            ItemData::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to get the data as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ItemData::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the data as a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ItemData::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the data as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ItemData::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to get the data as raw bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ItemData::Bytes(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    /// Attempts to downcast custom data to the specified type.
    pub fn downcast<T: Any>(&self) -> Option<&T> {
        match self {
            ItemData::Custom(data) => data.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl PartialEq for ItemData {
    /// Custom values compare equal only when they share an allocation.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ItemData::None, ItemData::None) => true,
            (ItemData::String(a), ItemData::String(b)) => a == b,
            (ItemData::Int(a), ItemData::Int(b)) => a == b,
            (ItemData::Float(a), ItemData::Float(b)) => a == b,
            (ItemData::Bool(a), ItemData::Bool(b)) => a == b,
            (ItemData::Bytes(a), ItemData::Bytes(b)) => a == b,
            (ItemData::Custom(a), ItemData::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<String> for ItemData {
    fn from(s: String) -> Self {
        ItemData::String(s)
    }
}

impl From<&str> for ItemData {
    fn from(s: &str) -> Self {
        ItemData::String(s.to_string())
    }
}

impl From<i64> for ItemData {
    fn from(n: i64) -> Self {
        ItemData::Int(n)
    }
}

impl From<i32> for ItemData {
    fn from(n: i32) -> Self {
        ItemData::Int(n as i64)
    }
}

impl From<f64> for ItemData {
    fn from(n: f64) -> Self {
        ItemData::Float(n)
    }
}

impl From<bool> for ItemData {
    fn from(b: bool) -> Self {
        ItemData::Bool(b)
    }
}

impl From<Vec<u8>> for ItemData {
    fn from(b: Vec<u8>) -> Self {
        ItemData::Bytes(b)
    }
}

impl From<Option<String>> for ItemData {
    fn from(opt: Option<String>) -> Self {
        match opt {
            Some(s) => ItemData::String(s),
            None => ItemData::None,
        }
    }
}
