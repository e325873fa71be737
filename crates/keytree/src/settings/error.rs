//! Error types for settings persistence.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for settings persistence.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Errors raised while loading or saving a settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The file could not be read or written.
    #[error("I/O error on settings file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON, or the store could not be encoded.
    #[error("invalid JSON in settings file '{}': {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The file is not valid TOML.
    #[error("invalid TOML in settings file '{}': {source}", .path.display())]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The store could not be encoded as TOML.
    #[error("cannot encode settings as TOML for '{}': {source}", .path.display())]
    TomlSerialize {
        path: PathBuf,
        #[source]
        source: toml::ser::Error,
    },

    /// The file extension does not name a known format.
    #[error("unknown settings format for '{}' (expected .json or .toml)", .path.display())]
    UnknownFormat { path: PathBuf },
}

impl SettingsError {
    /// Returns the path of the file involved.
    pub fn path(&self) -> &std::path::Path {
        match self {
            SettingsError::Io { path, .. }
            | SettingsError::Json { path, .. }
            | SettingsError::TomlParse { path, .. }
            | SettingsError::TomlSerialize { path, .. }
            | SettingsError::UnknownFormat { path } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_path() {
        let err = SettingsError::UnknownFormat {
            path: PathBuf::from("/tmp/keytree.ini"),
        };
        assert_eq!(
            err.to_string(),
            "unknown settings format for '/tmp/keytree.ini' (expected .json or .toml)"
        );
        assert_eq!(err.path(), std::path::Path::new("/tmp/keytree.ini"));
    }

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error as _;

        let err = SettingsError::Io {
            path: PathBuf::from("settings.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("settings.json"));
    }
}
