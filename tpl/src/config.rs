//! Configuration for tpl

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Directory under the user's home holding the config file and default store
pub const BASE_DIR: &str = "tpl";

/// Config file name inside [`BASE_DIR`]
pub const CONFIG_FILE: &str = "config.json";

/// Default store folder inside [`BASE_DIR`]
pub const DEFAULT_STORE_FOLDER: &str = "store";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot resolve the home directory")]
    HomeNotFound,

    #[error("Configuration file {path} is corrupt")]
    ConfigCorrupt {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to write configuration file {path}")]
    PersistFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid configuration type '{name}'. Valid configuration types: {valid}")]
    InvalidField { name: String, valid: String },
}

/// Persisted tpl configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Root directory of the template store
    #[serde(rename = "StorePath")]
    pub store_path: PathBuf,
}

/// Fields that can be read and set through `tpl config`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    StorePath,
}

impl ConfigField {
    pub const ALL: &'static [ConfigField] = &[ConfigField::StorePath];

    pub fn name(self) -> &'static str {
        match self {
            ConfigField::StorePath => "StorePath",
        }
    }

    /// Comma separated list of every valid field name
    pub fn valid_names() -> String {
        Self::ALL.iter().map(|f| f.name()).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConfigField {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| ConfigError::InvalidField {
                name: s.to_string(),
                valid: Self::valid_names(),
            })
    }
}

/// `<home>/tpl`
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(BASE_DIR))
        .ok_or(ConfigError::HomeNotFound)
}

/// `<home>/tpl/config.json`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join(CONFIG_FILE))
}

impl Config {
    /// Defaults relative to a base directory: `<base>/store`
    pub fn with_base_dir(base: &Path) -> Self {
        Self {
            store_path: base.join(DEFAULT_STORE_FOLDER),
        }
    }

    /// Defaults for the current user: `<home>/tpl/store`
    pub fn home_default() -> Result<Self, ConfigError> {
        Ok(Self::with_base_dir(&base_dir()?))
    }

    /// Load config from file, or use the home defaults if it doesn't exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_or_else(path, Self::home_default)
    }

    /// Load config from file, or build defaults with `fallback` if it doesn't exist.
    ///
    /// A file that exists but cannot be read or parsed is an error, never
    /// silently replaced by defaults.
    pub fn load_or_else<F>(path: &Path, fallback: F) -> Result<Self, ConfigError>
    where
        F: FnOnce() -> Result<Self, ConfigError>,
    {
        let corrupt = |source: Box<dyn std::error::Error + Send + Sync>| ConfigError::ConfigCorrupt {
            path: path.to_path_buf(),
            source,
        };

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(?path, "No config file found, using defaults");
                return fallback();
            }
            Err(e) => return Err(corrupt(Box::new(e))),
        };

        let config: Self = serde_json::from_str(&content).map_err(|e| corrupt(Box::new(e)))?;
        tracing::debug!(?path, store_path = ?config.store_path, "Loaded config");
        Ok(config)
    }

    /// Save config to file, creating its parent directory if needed
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let persist = |source: io::Error| ConfigError::PersistFailed {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(persist)?;
        }

        let mut content = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut content, formatter);
        self.serialize(&mut serializer).map_err(|e| persist(e.into()))?;

        fs::write(path, content).map_err(persist)?;
        tracing::info!(?path, "Saved config");
        Ok(())
    }

    /// Current value of a field, rendered for display
    pub fn value(&self, field: ConfigField) -> String {
        match field {
            ConfigField::StorePath => self.store_path.display().to_string(),
        }
    }

    /// Every field with its current value, in declaration order
    pub fn entries(&self) -> Vec<(ConfigField, String)> {
        ConfigField::ALL.iter().map(|&f| (f, self.value(f))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fallback_in(temp: &TempDir) -> impl FnOnce() -> Result<Config, ConfigError> + '_ {
        move || Ok(Config::with_base_dir(temp.path()))
    }

    #[test]
    fn test_missing_file_uses_fallback() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");

        let config = Config::load_or_else(&path, fallback_in(&temp)).unwrap();

        assert_eq!(config.store_path, temp.path().join(DEFAULT_STORE_FOLDER));
        assert!(!path.exists(), "loading must not create the file");
    }

    #[test]
    fn test_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.json");
        let config = Config {
            store_path: PathBuf::from("/tmp/store"),
        };

        config.save(&path).unwrap();
        let loaded = Config::load_or_else(&path, fallback_in(&temp)).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_saved_format() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        Config {
            store_path: PathBuf::from("/tmp/store"),
        }
        .save(&path)
        .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "{\n    \"StorePath\": \"/tmp/store\"\n}");
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{"StorePath": "/data/tpl", "Theme": "dark"}"#).unwrap();

        let config = Config::load_or_else(&path, fallback_in(&temp)).unwrap();
        assert_eq!(config.store_path, PathBuf::from("/data/tpl"));
    }

    #[test]
    fn test_malformed_file_is_corrupt() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");

        for content in ["", "{not json", "[]", "{}"] {
            fs::write(&path, content).unwrap();
            let err = Config::load_or_else(&path, fallback_in(&temp)).unwrap_err();
            assert!(matches!(err, ConfigError::ConfigCorrupt { .. }), "content {content:?}");
        }
    }

    #[test]
    fn test_directory_in_place_of_file_is_corrupt() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::create_dir(&path).unwrap();

        let err = Config::load_or_else(&path, fallback_in(&temp)).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigCorrupt { .. }));
    }

    #[test]
    fn test_save_to_unwritable_location() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let err = Config::with_base_dir(temp.path())
            .save(&blocker.join("config.json"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::PersistFailed { .. }));
    }

    #[test]
    fn test_field_parsing() {
        assert_eq!("StorePath".parse::<ConfigField>().unwrap(), ConfigField::StorePath);

        let err = "storepath".parse::<ConfigField>().unwrap_err();
        assert!(err.to_string().contains("Valid configuration types: StorePath"));
    }

    #[test]
    fn test_entries_list_every_field() {
        let config = Config {
            store_path: PathBuf::from("/tmp/store"),
        };

        let entries = config.entries();
        assert_eq!(entries, vec![(ConfigField::StorePath, "/tmp/store".to_string())]);
    }
}
