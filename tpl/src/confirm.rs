//! Yes/no confirmation for destructive commands

use dialoguer::Confirm as Prompt;
use dialoguer::theme::ColorfulTheme;
use eyre::{Context, Result};

/// Asks the user whether to go ahead with an action
pub trait Confirm {
    fn confirm(&self, message: &str) -> Result<bool>;
}

/// Interactive prompt on the terminal, defaulting to "no"
#[derive(Debug, Default)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, message: &str) -> Result<bool> {
        Prompt::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .default(false)
            .interact()
            .context("Failed to read confirmation (use --yes when not running in a terminal)")
    }
}

/// Answers yes to everything, for `--yes`
#[derive(Debug, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, message: &str) -> Result<bool> {
        tracing::debug!(%message, "AssumeYes::confirm: answering yes");
        Ok(true)
    }
}
