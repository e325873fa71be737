//! Values held by the settings store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A value stored in [`Settings`](super::Settings).
///
/// Objects are ordered by key so saved files are stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingsValue {
    /// No value.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A 64-bit signed integer.
    Integer(i64),
    /// A 64-bit float.
    Float(f64),
    /// A string.
    String(String),
    /// A list of values.
    Array(Vec<SettingsValue>),
    /// A nested group.
    Object(BTreeMap<String, SettingsValue>),
}

impl SettingsValue {
    /// Returns `true` if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, SettingsValue::Null)
    }

    /// Returns the boolean, if this is one.
    ///
    /// The strings `"true"` and `"false"` are accepted as well, since
    /// hand-edited files often quote them.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingsValue::Bool(v) => Some(*v),
            SettingsValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Returns the integer, if this is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SettingsValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as a float. Integers convert.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            SettingsValue::Float(v) => Some(*v),
            SettingsValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Returns the string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingsValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the list, if this is one.
    pub fn as_array(&self) -> Option<&[SettingsValue]> {
        match self {
            SettingsValue::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the group, if this is one.
    pub fn as_object(&self) -> Option<&BTreeMap<String, SettingsValue>> {
        match self {
            SettingsValue::Object(v) => Some(v),
            _ => None,
        }
    }

    pub(crate) fn from_toml(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => SettingsValue::String(s),
            toml::Value::Integer(i) => SettingsValue::Integer(i),
            toml::Value::Float(f) => SettingsValue::Float(f),
            toml::Value::Boolean(b) => SettingsValue::Bool(b),
            toml::Value::Datetime(dt) => SettingsValue::String(dt.to_string()),
            toml::Value::Array(arr) => {
                SettingsValue::Array(arr.into_iter().map(Self::from_toml).collect())
            }
            toml::Value::Table(table) => SettingsValue::Object(
                table
                    .into_iter()
                    .map(|(k, v)| (k, Self::from_toml(v)))
                    .collect(),
            ),
        }
    }

    /// Converts to TOML. TOML has no null, so nulls are left out of groups
    /// and lists.
    pub(crate) fn to_toml(&self) -> Option<toml::Value> {
        Some(match self {
            SettingsValue::Null => return None,
            SettingsValue::Bool(b) => toml::Value::Boolean(*b),
            SettingsValue::Integer(i) => toml::Value::Integer(*i),
            SettingsValue::Float(f) => toml::Value::Float(*f),
            SettingsValue::String(s) => toml::Value::String(s.clone()),
            SettingsValue::Array(arr) => {
                toml::Value::Array(arr.iter().filter_map(Self::to_toml).collect())
            }
            SettingsValue::Object(obj) => toml::Value::Table(
                obj.iter()
                    .filter_map(|(k, v)| Some((k.clone(), v.to_toml()?)))
                    .collect(),
            ),
        })
    }
}

impl From<bool> for SettingsValue {
    fn from(v: bool) -> Self {
        SettingsValue::Bool(v)
    }
}

impl From<i32> for SettingsValue {
    fn from(v: i32) -> Self {
        SettingsValue::Integer(v.into())
    }
}

impl From<i64> for SettingsValue {
    fn from(v: i64) -> Self {
        SettingsValue::Integer(v)
    }
}

impl From<f64> for SettingsValue {
    fn from(v: f64) -> Self {
        SettingsValue::Float(v)
    }
}

impl From<String> for SettingsValue {
    fn from(v: String) -> Self {
        SettingsValue::String(v)
    }
}

impl From<&str> for SettingsValue {
    fn from(v: &str) -> Self {
        SettingsValue::String(v.to_string())
    }
}

impl<T: Into<SettingsValue>> From<Vec<T>> for SettingsValue {
    fn from(v: Vec<T>) -> Self {
        SettingsValue::Array(v.into_iter().map(Into::into).collect())
    }
}

/// Types that can be read out of a [`SettingsValue`].
pub trait FromSettingsValue: Sized {
    /// Converts the value, or returns `None` on a type mismatch.
    fn from_settings_value(value: &SettingsValue) -> Option<Self>;
}

impl FromSettingsValue for bool {
    fn from_settings_value(value: &SettingsValue) -> Option<Self> {
        value.as_bool()
    }
}

impl FromSettingsValue for i32 {
    fn from_settings_value(value: &SettingsValue) -> Option<Self> {
        value.as_integer().and_then(|v| i32::try_from(v).ok())
    }
}

impl FromSettingsValue for i64 {
    fn from_settings_value(value: &SettingsValue) -> Option<Self> {
        value.as_integer()
    }
}

impl FromSettingsValue for f64 {
    fn from_settings_value(value: &SettingsValue) -> Option<Self> {
        value.as_float()
    }
}

impl FromSettingsValue for String {
    fn from_settings_value(value: &SettingsValue) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl<T: FromSettingsValue> FromSettingsValue for Vec<T> {
    fn from_settings_value(value: &SettingsValue) -> Option<Self> {
        value
            .as_array()
            .and_then(|arr| arr.iter().map(T::from_settings_value).collect())
    }
}

impl FromSettingsValue for SettingsValue {
    fn from_settings_value(value: &SettingsValue) -> Option<Self> {
        Some(value.clone())
    }
}
