use std::io;
use std::process::ExitCode;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::info;

use tpl::cli::Cli;
use tpl::commands::Dispatcher;
use tpl::config::{self, Config};
use tpl::confirm::{AssumeYes, Confirm, TerminalConfirm};

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .without_time()
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .map_err(|e| eyre::eyre!("{}", e))
}

fn run(cli: Cli) -> Result<()> {
    let config_path = match cli.config {
        Some(path) => path,
        None => config::default_config_path()?,
    };
    let config = Config::load(&config_path).context("Failed to load configuration")?;
    info!(config = %config_path.display(), store = %config.store_path.display(), "tpl starting");

    let cwd = std::env::current_dir().context("Failed to resolve current directory")?;
    let confirm: Box<dyn Confirm> = if cli.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(TerminalConfirm)
    };

    let stdout = io::stdout();
    Dispatcher::new(config, config_path, cwd, confirm.as_ref(), stdout.lock()).run(cli.command)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_logging(cli.verbose) {
        eprintln!("{} failed to setup logging: {:#}", "warning:".yellow(), e);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
