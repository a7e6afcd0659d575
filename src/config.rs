use std::{path::Path, time::Duration};

use anyhow::{Context, Result};
use git2::Repository;

/// Autopush configuration values sourced from git config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutopushConfig {
    /// Remote branch that receives every push.
    pub branch: String,
    /// Remote name passed to `git push`.
    pub remote: String,
    /// Pause between two status checks.
    pub interval: Duration,
}

impl Default for AutopushConfig {
    fn default() -> Self {
        Self {
            branch: "main".to_string(),
            remote: "origin".to_string(),
            interval: Duration::from_secs(60),
        }
    }
}

impl AutopushConfig {
    /// Load configuration from git config with precedence: local → global → system.
    ///
    /// Recognized keys: `autopush.branch`, `autopush.remote` and
    /// `autopush.interval-secs`. Missing, empty or out-of-range values keep
    /// their defaults.
    ///
    /// # Errors
    /// Returns an error if repository discovery or reading config fails.
    pub fn load(repo_root: &Path) -> Result<Self> {
        let repo = Repository::discover(repo_root).with_context(|| {
            format!(
                "failed to discover Git repository from {}",
                repo_root.display()
            )
        })?;

        let cfg = repo.config().context("failed to open git config")?;

        let mut out = Self::default();

        if let Ok(v) = cfg.get_string("autopush.branch")
            && !v.trim().is_empty()
        {
            out.branch = v.trim().to_string();
        }
        if let Ok(v) = cfg.get_string("autopush.remote")
            && !v.trim().is_empty()
        {
            out.remote = v.trim().to_string();
        }
        if let Ok(v) = cfg.get_i64("autopush.interval-secs")
            && v > 0
            && let Ok(secs) = u64::try_from(v)
        {
            out.interval = Duration::from_secs(secs);
        }

        Ok(out)
    }

    /// Apply command-line overrides on top of loaded values. Empty strings
    /// are ignored, as they are for git config.
    #[must_use]
    pub fn with_overrides(
        mut self,
        branch: Option<&str>,
        remote: Option<&str>,
        interval_secs: Option<u64>,
    ) -> Self {
        if let Some(b) = branch.map(str::trim).filter(|b| !b.is_empty()) {
            self.branch = b.to_string();
        }
        if let Some(r) = remote.map(str::trim).filter(|r| !r.is_empty()) {
            self.remote = r.to_string();
        }
        if let Some(s) = interval_secs.filter(|s| *s > 0) {
            self.interval = Duration::from_secs(s);
        }
        self
    }
}
