//! Keyed template store
//!
//! Every template lives at `<root>/<key>`. Saving a directory copies its tree
//! there; saving a single file places it at `<root>/<key>/<file name>`.
//!
//! ```text
//! <root>/
//! ├── .git/            # ignored by `list`
//! ├── rust-cli/
//! │   ├── Cargo.toml
//! │   └── src/main.rs
//! └── notes/
//!     └── single.txt
//! ```

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::config::{Config, ConfigError};
use crate::fsops::{self, CopySummary, FsError, PathKind};

/// Names under the store root that are never reported as keys
pub const IGNORED_NAMES: &[&str] = &[".git"];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid key '{key}': a key must be a single, non-empty path segment")]
    InvalidKey { key: String },

    #[error("Invalid template path {path}: {reason}")]
    InvalidSource { path: PathBuf, reason: &'static str },

    #[error("Invalid destination {path}: {reason}")]
    InvalidDestination { path: PathBuf, reason: &'static str },

    #[error("Unknown key: {key}")]
    UnknownKey { key: String },

    #[error("Failed to copy template '{key}'")]
    CopyFailed {
        key: String,
        #[source]
        source: FsError,
    },

    #[error("Failed to create store entry {path}")]
    KeyCreationFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid store path: {path}")]
    InvalidPath {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to update store at {path}")]
    PersistFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Store root {path} is not accessible")]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Fs(#[from] FsError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// The template library
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Open the store at `root`, creating the directory if it doesn't exist
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|source| StoreError::StoreUnavailable {
            path: root.clone(),
            source,
        })?;
        debug!(?root, "Opened template store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn canonical_root(&self) -> Result<PathBuf, StoreError> {
        fs::canonicalize(&self.root).map_err(|source| StoreError::StoreUnavailable {
            path: self.root.clone(),
            source,
        })
    }

    /// Path of the entry for `key`, after checking the key is a single segment
    pub fn entry_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let mut components = Path::new(key).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(segment)), None) if segment == key => Ok(self.root.join(key)),
            _ => Err(StoreError::InvalidKey { key: key.to_string() }),
        }
    }

    /// Whether an entry exists for `key`
    pub fn contains(&self, key: &str) -> Result<bool, StoreError> {
        let entry = self.entry_path(key)?;
        Ok(fsops::classify(&entry)? != PathKind::Absent)
    }

    /// Check that `source` can be saved under `key` and report its shape.
    ///
    /// The source must exist and must neither contain nor lie inside the
    /// entry it would be copied to.
    pub fn check_source(&self, key: &str, source: &Path) -> Result<PathKind, StoreError> {
        self.entry_path(key)?;
        let kind = fsops::classify(source)?;
        if kind == PathKind::Absent {
            return Err(StoreError::InvalidSource {
                path: source.to_path_buf(),
                reason: "no such file or directory",
            });
        }

        let source_abs = fs::canonicalize(source).map_err(|e| FsError::from_io(source, e))?;
        let entry_abs = self.canonical_root()?.join(key);

        if source_abs.starts_with(&entry_abs) {
            return Err(StoreError::InvalidSource {
                path: source.to_path_buf(),
                reason: "it is stored under the same key",
            });
        }
        if kind == PathKind::Directory && entry_abs.starts_with(&source_abs) {
            return Err(StoreError::InvalidSource {
                path: source.to_path_buf(),
                reason: "it contains the template store",
            });
        }

        Ok(kind)
    }

    /// Save `source` under `key`, replacing any existing entry wholesale.
    ///
    /// Callers are responsible for confirming an overwrite before calling.
    pub fn save(&self, key: &str, source: &Path) -> Result<CopySummary, StoreError> {
        debug!(%key, ?source, "Store::save: called");
        let kind = self.check_source(key, source)?;
        let entry = self.entry_path(key)?;

        remove_entry(&entry)?;
        fs::create_dir_all(&entry).map_err(|source| StoreError::KeyCreationFailed {
            path: entry.clone(),
            source,
        })?;

        let summary = fsops::copy(source, &entry, kind == PathKind::Directory).map_err(|source| {
            StoreError::CopyFailed {
                key: key.to_string(),
                source,
            }
        })?;

        info!(%key, files = summary.files, "Saved template");
        Ok(summary)
    }

    /// Copy the entry for `key` into `destination`, merging with what is there.
    ///
    /// `destination` must not be the entry itself or lie inside it.
    ///
    /// Only directory-shaped entries can be fetched. Everything `save` writes
    /// is a directory, so a plain file at `<root>/<key>` only appears when
    /// placed there by other means (for example a `pull`), and is reported
    /// as an unknown key.
    pub fn get(&self, key: &str, destination: &Path) -> Result<CopySummary, StoreError> {
        debug!(%key, ?destination, "Store::get: called");
        let entry = self.entry_path(key)?;

        match fsops::classify(&entry)? {
            PathKind::Directory => {}
            kind => {
                debug!(%key, ?kind, "Store::get: entry is not a directory");
                return Err(StoreError::UnknownKey { key: key.to_string() });
            }
        }

        let entry_abs = self.canonical_root()?.join(key);
        let destination_abs = resolve_destination(destination).map_err(|e| FsError::from_io(destination, e))?;
        if destination_abs.starts_with(&entry_abs) {
            return Err(StoreError::InvalidDestination {
                path: destination.to_path_buf(),
                reason: "it lies inside the template being fetched",
            });
        }

        let summary = fsops::copy(&entry, destination, true).map_err(|source| StoreError::CopyFailed {
            key: key.to_string(),
            source,
        })?;

        info!(%key, files = summary.files, "Fetched template");
        Ok(summary)
    }

    /// Remove the entry for `key`.
    ///
    /// Callers are responsible for confirming the deletion before calling.
    pub fn delete(&self, key: &str) -> Result<(), StoreError> {
        debug!(%key, "Store::delete: called");
        let entry = self.entry_path(key)?;

        if fsops::classify(&entry)? == PathKind::Absent {
            return Err(StoreError::UnknownKey { key: key.to_string() });
        }

        remove_entry(&entry)?;
        info!(%key, "Deleted template");
        Ok(())
    }

    /// Keys starting with `prefix`, sorted, excluding [`IGNORED_NAMES`]
    pub fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let unavailable = |source| StoreError::StoreUnavailable {
            path: self.root.clone(),
            source,
        };

        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(unavailable)? {
            let entry = entry.map_err(unavailable)?;
            let Ok(name) = entry.file_name().into_string() else {
                debug!(path = ?entry.path(), "Store::list: skipping non UTF-8 name");
                continue;
            };

            if name.starts_with(prefix) && !IGNORED_NAMES.contains(&name.as_str()) {
                keys.push(name);
            }
        }

        keys.sort();
        Ok(keys)
    }

    /// Point the configuration at a new store root and persist it.
    ///
    /// `new_path` is resolved to an absolute path and created if missing.
    /// Existing entries stay under the old root; nothing is migrated.
    pub fn relocate(config: &mut Config, config_file: &Path, new_path: &Path) -> Result<Store, StoreError> {
        debug!(?new_path, "Store::relocate: called");
        let invalid = |source| StoreError::InvalidPath {
            path: new_path.to_path_buf(),
            source,
        };

        fs::create_dir_all(new_path).map_err(invalid)?;
        let resolved = fs::canonicalize(new_path).map_err(invalid)?;

        let meta = fs::metadata(&resolved).map_err(invalid)?;
        if !meta.is_dir() {
            return Err(invalid(io::Error::other("not a directory")));
        }
        if meta.permissions().readonly() {
            return Err(invalid(io::Error::from(io::ErrorKind::PermissionDenied)));
        }

        let updated = Config {
            store_path: resolved.clone(),
        };
        updated.save(config_file)?;
        let previous = std::mem::replace(config, updated).store_path;

        info!(?previous, current = ?resolved, "Relocated template store");
        Ok(Store { root: resolved })
    }
}

/// Canonical form of a path that may not exist yet: the deepest existing
/// ancestor is canonicalized and the missing tail appended.
fn resolve_destination(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut existing = absolute.as_path();
    let mut missing = Vec::new();

    loop {
        match fs::canonicalize(existing) {
            Ok(resolved) => return Ok(missing.iter().rev().fold(resolved, |acc, part| acc.join(part))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let (Some(parent), Some(name)) = (existing.parent(), existing.file_name()) else {
                    return Err(e);
                };
                missing.push(name);
                existing = parent;
            }
            Err(e) => return Err(e),
        }
    }
}

fn remove_entry(entry: &Path) -> Result<(), StoreError> {
    let result = match fsops::classify(entry)? {
        PathKind::Absent => return Ok(()),
        PathKind::File => fs::remove_file(entry),
        PathKind::Directory => fs::remove_dir_all(entry),
    };

    result.map_err(|source| StoreError::PersistFailed {
        path: entry.to_path_buf(),
        source,
    })
}
