//! tpl - personal template library
//!
//! Saves snapshots of files or directories under a user-chosen key, copies
//! them back into the working directory on demand and syncs the library with
//! a git remote.
//!
//! # Layout
//!
//! ```text
//! ~/tpl/
//! ├── config.json      # {"StorePath": "..."}
//! └── store/           # default store root
//!     ├── .git/
//!     └── {key}/       # one entry per template
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tpl::Store;
//!
//! let store = Store::open("/tmp/store")?;
//! store.save("proj", Path::new("/tmp/src_dir"))?;
//! store.get("proj", Path::new("/tmp/out"))?;
//! assert_eq!(store.list("pr")?, vec!["proj"]);
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod confirm;
pub mod fsops;
pub mod store;
pub mod sync;

pub use config::{Config, ConfigError, ConfigField};
pub use fsops::{CopySummary, FsError, PathKind, classify, copy};
pub use store::{IGNORED_NAMES, Store, StoreError};
pub use sync::{GitSync, SyncError};
