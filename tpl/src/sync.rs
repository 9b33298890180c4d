//! Remote sync of the store root through the git command line

use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use thiserror::Error;
use tracing::{debug, info, warn};

/// Commit message used by `push`
pub const COMMIT_MESSAGE: &str = "update";

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Failed to run {program}")]
    SpawnFailed {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` failed with {status}")]
    SyncFailed { command: String, status: ExitStatus },
}

/// Runs git against the store root as both git dir owner and work tree
#[derive(Debug, Clone)]
pub struct GitSync {
    root: PathBuf,
    program: OsString,
}

impl GitSync {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_program(root, "git")
    }

    /// Use a different executable in place of `git`
    pub fn with_program(root: impl Into<PathBuf>, program: impl Into<OsString>) -> Self {
        Self {
            root: root.into(),
            program: program.into(),
        }
    }

    /// Build the command for `git --git-dir=<root>/.git --work-tree=<root> <args>`
    pub fn command<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut git_dir = OsString::from("--git-dir=");
        git_dir.push(self.root.join(".git"));
        let mut work_tree = OsString::from("--work-tree=");
        work_tree.push(&self.root);

        let mut cmd = Command::new(&self.program);
        cmd.arg(git_dir).arg(work_tree).args(args).current_dir(&self.root);
        cmd
    }

    fn run(&self, args: &[&str]) -> Result<ExitStatus, SyncError> {
        let command = format!("{} {}", self.program.to_string_lossy(), args.join(" "));
        debug!(%command, root = ?self.root, "GitSync::run: called");

        self.command(args).status().map_err(|source| SyncError::SpawnFailed {
            program: self.program.to_string_lossy().into_owned(),
            source,
        })
    }

    fn run_checked(&self, args: &[&str]) -> Result<(), SyncError> {
        let status = self.run(args)?;
        if !status.success() {
            return Err(SyncError::SyncFailed {
                command: format!("git {}", args.join(" ")),
                status,
            });
        }
        Ok(())
    }

    /// Stage everything, commit and push to the configured remote.
    ///
    /// A commit that fails (typically nothing to commit) does not stop the push.
    pub fn push(&self) -> Result<(), SyncError> {
        self.run_checked(&["add", "."])?;

        let status = self.run(&["commit", "-m", COMMIT_MESSAGE])?;
        if !status.success() {
            warn!(%status, "git commit did not create a commit, pushing anyway");
        }

        self.run_checked(&["push"])?;
        info!(root = ?self.root, "Pushed template store");
        Ok(())
    }

    /// Pull remote changes into the store root
    pub fn pull(&self) -> Result<(), SyncError> {
        self.run_checked(&["pull"])?;
        info!(root = ?self.root, "Pulled template store");
        Ok(())
    }
}
