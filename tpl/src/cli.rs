//! CLI argument parsing for tpl

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tpl")]
#[command(author, version, about = "A simple tool for easy managing of file or project templates", long_about = None)]
pub struct Cli {
    /// Path to config file (default: ~/tpl/config.json)
    #[arg(short, long, global = true, env = "TPL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Save a template associated with the specified key to the library
    #[command(visible_alias = "s")]
    Save {
        /// Key to store the template under
        key: String,

        /// File or directory to save
        path: PathBuf,
    },

    /// Get a template associated with the specified key from the library
    #[command(visible_alias = "g")]
    Get {
        /// Key of the template to copy into the current directory
        key: String,
    },

    /// Delete a template associated with the specified key from the library
    #[command(visible_alias = "d")]
    Delete {
        /// Key of the template to delete
        key: String,
    },

    /// List the keys that begin with prefix
    #[command(visible_alias = "l")]
    Ls {
        /// Key prefix (default: list everything)
        prefix: Option<String>,
    },

    /// Show or set configuration. The valid configuration type is "StorePath"
    #[command(visible_alias = "c")]
    Config {
        /// Configuration type to set
        #[arg(value_name = "TYPE")]
        field: Option<String>,

        /// New value
        value: Option<String>,
    },

    /// Call git push on the template library directory
    Push,

    /// Call git pull on the template library directory
    Pull,
}
