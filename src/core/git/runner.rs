use std::{io, path::Path, process::Command};

use thiserror::Error;

/// Captured result of one external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0))
    }

    /// Describe a non-zero exit as [`CommandError::CommandFailed`].
    #[must_use]
    pub fn failure(&self, command: &str) -> Option<CommandError> {
        if self.success() {
            return None;
        }
        let detail = if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        };
        Some(CommandError::CommandFailed {
            command: command.to_string(),
            code: self.code,
            stderr: detail.clone(),
        })
    }

    /// Turn a non-zero exit into [`CommandError::CommandFailed`].
    ///
    /// # Errors
    /// Returns an error if the command did not exit with status 0.
    pub fn check(self, command: &str) -> Result<Self, CommandError> {
        match self.failure(command) {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

/// Failure of an external command. The polling loop only logs these.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("`{command}` exited with code {code:?}: {}", .stderr.trim())]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Seam for executing external programs.
pub trait CommandRunner {
    /// Run `program` with `args` in `cwd`, blocking until it exits.
    ///
    /// # Errors
    /// Returns an error only if the process could not be spawned.
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> io::Result<CommandOutput>;
}

/// Runs commands as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> io::Result<CommandOutput> {
        let output = Command::new(program).args(args).current_dir(cwd).output()?;
        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
