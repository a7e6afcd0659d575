use std::path::PathBuf;

use anyhow::Result;

use crate::config::AutopushConfig;

#[derive(Debug, Clone)]
pub struct AppContext {
    pub repo_root: PathBuf,
    pub git_dir: PathBuf,
    pub cfg: AutopushConfig,
    pub verbosity: u8,
}

impl AppContext {
    pub const fn new(
        repo_root: PathBuf,
        git_dir: PathBuf,
        cfg: AutopushConfig,
        verbosity: u8,
    ) -> Self {
        Self {
            repo_root,
            git_dir,
            cfg,
            verbosity,
        }
    }

    /// Convenience constructor discovering the repository from the current directory.
    pub fn from_repo(verbosity: u8) -> Result<Self> {
        let root = crate::core::git::repo_root()?;
        let git_dir = crate::core::git::git_dir(&root)?;
        let cfg = AutopushConfig::load(&root)?;
        Ok(Self::new(root, git_dir, cfg, verbosity))
    }

    /// Directory holding the PID lock and log files.
    pub fn runtime_dir(&self) -> PathBuf {
        crate::core::git::autopush_dir(&self.git_dir)
    }
}
