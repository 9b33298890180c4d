//! Command handlers: turn a parsed [`Command`] into store operations
//!
//! This is the only layer that talks to the user. The store, config and sync
//! layers return typed errors and never print.

use std::io::Write;
use std::path::{Path, PathBuf};

use colored::*;
use eyre::{Result, bail};
use tracing::debug;

use crate::cli::Command;
use crate::config::{Config, ConfigField};
use crate::confirm::Confirm;
use crate::fsops::CopySummary;
use crate::store::Store;
use crate::sync::GitSync;

const OVERWRITE_PROMPT: &str = "Do you want to override the existing key?";
const DELETE_PROMPT: &str = "Do you want to delete this key?";

/// Everything a single invocation needs, supplied by `main`
pub struct Dispatcher<'a, W: Write> {
    config: Config,
    config_path: PathBuf,
    cwd: PathBuf,
    confirm: &'a dyn Confirm,
    out: W,
}

impl<'a, W: Write> Dispatcher<'a, W> {
    pub fn new(config: Config, config_path: PathBuf, cwd: PathBuf, confirm: &'a dyn Confirm, out: W) -> Self {
        Self {
            config,
            config_path,
            cwd,
            confirm,
            out,
        }
    }

    pub fn run(&mut self, command: Command) -> Result<()> {
        debug!(?command, "Dispatcher::run: called");
        match command {
            Command::Save { key, path } => self.save(&key, &path),
            Command::Get { key } => self.get(&key),
            Command::Delete { key } => self.delete(&key),
            Command::Ls { prefix } => self.ls(prefix.as_deref().unwrap_or_default()),
            Command::Config { field, value } => self.configure(field.as_deref(), value.as_deref()),
            Command::Push => Ok(GitSync::new(self.store()?.root()).push()?),
            Command::Pull => Ok(GitSync::new(self.store()?.root()).pull()?),
        }
    }

    fn store(&self) -> Result<Store> {
        Ok(Store::open(&self.config.store_path)?)
    }

    fn save(&mut self, key: &str, path: &Path) -> Result<()> {
        let store = self.store()?;
        let source = self.cwd.join(path);
        store.check_source(key, &source)?;

        if store.contains(key)? && !self.confirm.confirm(OVERWRITE_PROMPT)? {
            writeln!(self.out, "Aborted, '{}' left unchanged", key)?;
            return Ok(());
        }

        let summary = store.save(key, &source)?;
        writeln!(self.out, "{} Saved {} ({})", "✓".green(), key.cyan(), describe(summary))?;
        Ok(())
    }

    fn get(&mut self, key: &str) -> Result<()> {
        let summary = self.store()?.get(key, &self.cwd)?;
        writeln!(self.out, "{} Fetched {} ({})", "✓".green(), key.cyan(), describe(summary))?;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        let store = self.store()?;
        if store.contains(key)? && !self.confirm.confirm(DELETE_PROMPT)? {
            writeln!(self.out, "Aborted, '{}' left unchanged", key)?;
            return Ok(());
        }

        store.delete(key)?;
        writeln!(self.out, "{} Deleted {}", "✓".green(), key)?;
        Ok(())
    }

    fn ls(&mut self, prefix: &str) -> Result<()> {
        for key in self.store()?.list(prefix)? {
            writeln!(self.out, "{}", key)?;
        }
        Ok(())
    }

    fn configure(&mut self, field: Option<&str>, value: Option<&str>) -> Result<()> {
        match (field, value) {
            (None, None) => {
                for (field, value) in self.config.entries() {
                    writeln!(self.out, "{}: {}", field, value)?;
                }
                Ok(())
            }
            (Some(field), Some(value)) => match field.parse::<ConfigField>()? {
                ConfigField::StorePath => {
                    let target = self.cwd.join(value);
                    let store = Store::relocate(&mut self.config, &self.config_path, &target)?;
                    writeln!(
                        self.out,
                        "{} StorePath: {}",
                        "✓".green(),
                        store.root().display().to_string().cyan()
                    )?;
                    Ok(())
                }
            },
            _ => bail!(
                "Valid format: config [type] [value]. Valid configuration types: {}",
                ConfigField::valid_names()
            ),
        }
    }
}

fn describe(summary: CopySummary) -> String {
    match summary.files {
        1 => "1 file".to_string(),
        n => format!("{} files", n),
    }
}
