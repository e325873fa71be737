//! Application settings.
//!
//! A hierarchical key/value store with JSON and TOML persistence. Paths use
//! either `.` or `/` as separators, so `"app/reopenNamespacesOnReload"` and
//! `"app.reopenNamespacesOnReload"` address the same value.
//!
//! ```
//! use keytree::settings::{REOPEN_NAMESPACES_ON_RELOAD, Settings, SettingsSource};
//!
//! let settings = Settings::new();
//! assert!(settings.bool_value(REOPEN_NAMESPACES_ON_RELOAD, true));
//!
//! settings.set(REOPEN_NAMESPACES_ON_RELOAD, false);
//! assert_eq!(settings.get::<bool>("app.reopenNamespacesOnReload"), Some(false));
//! ```
//!
//! The model only reads settings through [`SettingsSource`], so any other
//! preference backend can be plugged in.

mod error;
mod value;

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use keytree_core::Signal;
use keytree_core::logging::targets;
use parking_lot::RwLock;

pub use error::{SettingsError, SettingsResult};
pub use value::{FromSettingsValue, SettingsValue};

/// Whether namespaces expanded before a database reload are reopened.
pub const REOPEN_NAMESPACES_ON_RELOAD: &str = "app/reopenNamespacesOnReload";

/// Read access to boolean preferences.
pub trait SettingsSource: Send + Sync {
    /// Returns the boolean stored under `key`, or `default` when the key is
    /// missing or not a boolean.
    fn bool_value(&self, key: &str, default: bool) -> bool;
}

/// On-disk format of a settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    /// JSON.
    Json,
    /// TOML.
    Toml,
}

impl SettingsFormat {
    /// Picks the format from a file extension.
    pub fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(SettingsFormat::Json),
            Some("toml") => Ok(SettingsFormat::Toml),
            _ => Err(SettingsError::UnknownFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// A hierarchical key/value settings store.
pub struct Settings {
    data: RwLock<BTreeMap<String, SettingsValue>>,
    changed: Signal<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl Settings {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::from_data(BTreeMap::new())
    }

    /// Creates a store holding `data`.
    pub fn from_data(data: BTreeMap<String, SettingsValue>) -> Self {
        Self {
            data: RwLock::new(data),
            changed: Signal::new(),
        }
    }

    /// Emitted with the path of every changed value. An empty path means
    /// the whole store was cleared.
    pub fn changed(&self) -> &Signal<String> {
        &self.changed
    }

    /// Stores `value` at `path`, creating intermediate groups.
    pub fn set<V: Into<SettingsValue>>(&self, path: &str, value: V) {
        let parts = parse_path(path);
        if parts.is_empty() {
            return;
        }

        set_nested(&mut self.data.write(), &parts, value.into());
        tracing::trace!(target: targets::SETTINGS, path, "value set");
        self.changed.emit(path.to_string());
    }

    /// Returns the value at `path` converted to `T`.
    pub fn get<T: FromSettingsValue>(&self, path: &str) -> Option<T> {
        let data = self.data.read();
        get_nested(&data, &parse_path(path)).and_then(T::from_settings_value)
    }

    /// Returns the value at `path`, or `default`.
    pub fn get_or<T: FromSettingsValue>(&self, path: &str, default: T) -> T {
        self.get(path).unwrap_or(default)
    }

    /// Returns `true` if a value exists at `path`.
    pub fn contains(&self, path: &str) -> bool {
        get_nested(&self.data.read(), &parse_path(path)).is_some()
    }

    /// Removes and returns the value at `path`.
    pub fn remove(&self, path: &str) -> Option<SettingsValue> {
        let parts = parse_path(path);
        let removed = remove_nested(&mut self.data.write(), &parts);
        if removed.is_some() {
            self.changed.emit(path.to_string());
        }
        removed
    }

    /// Removes every value.
    pub fn clear(&self) {
        self.data.write().clear();
        self.changed.emit(String::new());
    }

    /// Returns the top-level keys in order.
    pub fn keys(&self) -> Vec<String> {
        self.data.read().keys().cloned().collect()
    }

    /// Returns the number of top-level keys.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Returns the platform's settings file for keytree, if a home
    /// directory can be determined.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("io", "keytree", "keytree")
            .map(|dirs| dirs.config_dir().join("settings.toml"))
    }

    /// Loads a file, picking the format from its extension.
    pub fn load(path: impl AsRef<Path>) -> SettingsResult<Self> {
        let path = path.as_ref();
        match SettingsFormat::from_path(path)? {
            SettingsFormat::Json => Self::load_json(path),
            SettingsFormat::Toml => Self::load_toml(path),
        }
    }

    /// Loads a file if it exists, otherwise returns an empty store.
    pub fn load_or_default(path: impl AsRef<Path>) -> SettingsResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(target: targets::SETTINGS, path = %path.display(), "no settings file, using defaults");
            return Ok(Self::new());
        }
        Self::load(path)
    }

    /// Loads a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> SettingsResult<Self> {
        let path = path.as_ref();
        let content = read_text(path)?;
        let data = serde_json::from_str(&content).map_err(|source| SettingsError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(target: targets::SETTINGS, path = %path.display(), "loaded JSON settings");
        Ok(Self::from_data(data))
    }

    /// Loads a TOML file.
    pub fn load_toml(path: impl AsRef<Path>) -> SettingsResult<Self> {
        let path = path.as_ref();
        let content = read_text(path)?;
        let table: toml::Table = content.parse().map_err(|source| SettingsError::TomlParse {
            path: path.to_path_buf(),
            source,
        })?;

        let data = table
            .into_iter()
            .map(|(k, v)| (k, SettingsValue::from_toml(v)))
            .collect();
        tracing::debug!(target: targets::SETTINGS, path = %path.display(), "loaded TOML settings");
        Ok(Self::from_data(data))
    }

    /// Saves to a file, picking the format from its extension.
    pub fn save(&self, path: impl AsRef<Path>) -> SettingsResult<()> {
        let path = path.as_ref();
        match SettingsFormat::from_path(path)? {
            SettingsFormat::Json => self.save_json(path),
            SettingsFormat::Toml => self.save_toml(path),
        }
    }

    /// Saves as pretty-printed JSON, replacing the file atomically.
    pub fn save_json(&self, path: impl AsRef<Path>) -> SettingsResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&*self.data.read()).map_err(|source| {
            SettingsError::Json {
                path: path.to_path_buf(),
                source,
            }
        })?;
        atomic_write(path, json.as_bytes())
    }

    /// Saves as TOML, replacing the file atomically. Null values are not
    /// written.
    pub fn save_toml(&self, path: impl AsRef<Path>) -> SettingsResult<()> {
        let path = path.as_ref();
        let table: toml::Table = self
            .data
            .read()
            .iter()
            .filter_map(|(k, v)| Some((k.clone(), v.to_toml()?)))
            .collect();
        let text = toml::to_string_pretty(&table).map_err(|source| SettingsError::TomlSerialize {
            path: path.to_path_buf(),
            source,
        })?;
        atomic_write(path, text.as_bytes())
    }
}

impl SettingsSource for Settings {
    fn bool_value(&self, key: &str, default: bool) -> bool {
        self.get_or(key, default)
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("data", &*self.data.read())
            .finish()
    }
}

static_assertions::assert_impl_all!(Settings: Send, Sync);

fn parse_path(path: &str) -> Vec<&str> {
    path.split(['.', '/']).filter(|s| !s.is_empty()).collect()
}

fn get_nested<'a>(
    data: &'a BTreeMap<String, SettingsValue>,
    parts: &[&str],
) -> Option<&'a SettingsValue> {
    let (first, rest) = parts.split_first()?;
    let value = data.get(*first)?;
    if rest.is_empty() {
        return Some(value);
    }
    match value {
        SettingsValue::Object(group) => get_nested(group, rest),
        _ => None,
    }
}

fn set_nested(data: &mut BTreeMap<String, SettingsValue>, parts: &[&str], value: SettingsValue) {
    let Some((first, rest)) = parts.split_first() else {
        return;
    };
    if rest.is_empty() {
        data.insert(first.to_string(), value);
        return;
    }

    let entry = data
        .entry(first.to_string())
        .or_insert_with(|| SettingsValue::Object(BTreeMap::new()));
    if !matches!(entry, SettingsValue::Object(_)) {
        *entry = SettingsValue::Object(BTreeMap::new());
    }
    if let SettingsValue::Object(group) = entry {
        set_nested(group, rest, value);
    }
}

fn remove_nested(
    data: &mut BTreeMap<String, SettingsValue>,
    parts: &[&str],
) -> Option<SettingsValue> {
    let (first, rest) = parts.split_first()?;
    if rest.is_empty() {
        return data.remove(*first);
    }
    match data.get_mut(*first)? {
        SettingsValue::Object(group) => remove_nested(group, rest),
        _ => None,
    }
}

fn read_text(path: &Path) -> SettingsResult<String> {
    std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `bytes` to a temporary file next to `path` and renames it over
/// `path`, so readers never observe a partial file.
fn atomic_write(path: &Path, bytes: &[u8]) -> SettingsResult<()> {
    let io_err = |source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(io_err)?;

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    temp.write_all(bytes).map_err(io_err)?;
    temp.as_file().sync_all().map_err(io_err)?;
    temp.persist(path).map_err(|e| io_err(e.error))?;

    tracing::debug!(target: targets::SETTINGS, path = %path.display(), "settings saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_basic_get_set() {
        let settings = Settings::new();
        settings.set("name", "local");
        settings.set("count", 42);
        settings.set("enabled", true);

        assert_eq!(settings.get::<String>("name"), Some("local".to_string()));
        assert_eq!(settings.get::<i32>("count"), Some(42));
        assert_eq!(settings.get::<bool>("enabled"), Some(true));
        assert_eq!(settings.get::<bool>("name"), None);
    }

    #[test]
    fn test_separators_are_interchangeable() {
        let settings = Settings::new();
        settings.set("app/reopenNamespacesOnReload", false);
        assert_eq!(settings.get::<bool>("app.reopenNamespacesOnReload"), Some(false));
        assert_eq!(settings.keys(), vec!["app".to_string()]);
    }

    #[test]
    fn test_set_replaces_scalar_with_group() {
        let settings = Settings::new();
        settings.set("app", 1);
        settings.set("app.theme", "dark");
        assert_eq!(settings.get::<String>("app/theme"), Some("dark".to_string()));
    }

    #[test]
    fn test_remove_and_clear() {
        let settings = Settings::new();
        settings.set("a.b", 1);
        settings.set("c", 2);

        assert_eq!(settings.remove("a.b"), Some(SettingsValue::Integer(1)));
        assert!(!settings.contains("a.b"));
        assert_eq!(settings.remove("missing"), None);

        settings.clear();
        assert!(settings.is_empty());
    }

    #[test]
    fn test_changed_signal() {
        let settings = Settings::new();
        let changes = Arc::new(Mutex::new(Vec::new()));

        let recorder = changes.clone();
        settings.changed().connect(move |path| {
            recorder.lock().push(path.clone());
        });

        settings.set(REOPEN_NAMESPACES_ON_RELOAD, false);
        settings.remove(REOPEN_NAMESPACES_ON_RELOAD);
        settings.remove(REOPEN_NAMESPACES_ON_RELOAD);

        assert_eq!(
            *changes.lock(),
            vec![
                REOPEN_NAMESPACES_ON_RELOAD.to_string(),
                REOPEN_NAMESPACES_ON_RELOAD.to_string(),
            ]
        );
    }

    #[test]
    fn test_bool_value_defaults() {
        let settings = Settings::new();
        assert!(settings.bool_value(REOPEN_NAMESPACES_ON_RELOAD, true));

        settings.set(REOPEN_NAMESPACES_ON_RELOAD, "yes please");
        assert!(settings.bool_value(REOPEN_NAMESPACES_ON_RELOAD, true));

        settings.set(REOPEN_NAMESPACES_ON_RELOAD, false);
        assert!(!settings.bool_value(REOPEN_NAMESPACES_ON_RELOAD, true));
    }

    #[test]
    fn test_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let settings = Settings::new();
        settings.set(REOPEN_NAMESPACES_ON_RELOAD, false);
        settings.set("connections.recent", vec!["local", "staging"]);
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded.get::<bool>(REOPEN_NAMESPACES_ON_RELOAD), Some(false));
        assert_eq!(
            loaded.get::<Vec<String>>("connections.recent"),
            Some(vec!["local".to_string(), "staging".to_string()])
        );
    }

    #[test]
    fn test_toml_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        let settings = Settings::new();
        settings.set(REOPEN_NAMESPACES_ON_RELOAD, true);
        settings.set("ui.tree.indent", 12);
        settings.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("reopenNamespacesOnReload = true"));

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded.get::<i64>("ui/tree/indent"), Some(12));
    }

    #[test]
    fn test_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::new().save(dir.path().join("settings.ini")).unwrap_err();
        assert!(matches!(err, SettingsError::UnknownFormat { .. }));
    }

    #[test]
    fn test_load_errors_carry_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Settings::load(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Json { .. }));
        assert_eq!(err.path(), path.as_path());

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            Settings::load(&missing).unwrap_err(),
            SettingsError::Io { .. }
        ));
        assert!(Settings::load_or_default(&missing).unwrap().is_empty());
    }
}
