use std::path::{Path, PathBuf};

use tracing::debug;

use super::runner::{CommandError, CommandOutput, CommandRunner, ProcessRunner};

/// Thin wrapper over the `git` executable bound to one working directory.
///
/// Every method returns the raw output regardless of exit status; only a
/// failure to spawn `git` is an error. Use [`CommandOutput::check`] to
/// classify non-zero exits.
#[derive(Debug, Clone)]
pub struct GitCli<R = ProcessRunner> {
    workdir: PathBuf,
    runner: R,
}

impl GitCli<ProcessRunner> {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self::with_runner(workdir, ProcessRunner)
    }
}

impl<R: CommandRunner> GitCli<R> {
    pub fn with_runner(workdir: impl Into<PathBuf>, runner: R) -> Self {
        Self {
            workdir: workdir.into(),
            runner,
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub const fn runner(&self) -> &R {
        &self.runner
    }

    /// `git status --porcelain`
    pub fn status_porcelain(&self) -> Result<CommandOutput, CommandError> {
        self.git(&["status", "--porcelain"])
    }

    /// `git add .`
    pub fn add_all(&self) -> Result<CommandOutput, CommandError> {
        self.git(&["add", "."])
    }

    /// `git commit -m <message>`; the message is passed as a single argument.
    pub fn commit(&self, message: &str) -> Result<CommandOutput, CommandError> {
        self.git(&["commit", "-m", message])
    }

    /// `git push <remote> <branch>`
    pub fn push(&self, remote: &str, branch: &str) -> Result<CommandOutput, CommandError> {
        self.git(&["push", remote, branch])
    }

    fn git(&self, args: &[&str]) -> Result<CommandOutput, CommandError> {
        debug!(event = "git_exec", args = ?args, cwd = %self.workdir.display());
        self.runner
            .run("git", args, &self.workdir)
            .map_err(|source| CommandError::Spawn {
                command: command_line(args),
                source,
            })
    }
}

/// Render `git <args>` for log lines and error messages.
#[must_use]
pub fn command_line(args: &[&str]) -> String {
    format!("git {}", args.join(" "))
}
