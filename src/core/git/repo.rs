use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use git2::Repository;

/// Discover the current repository root directory.
pub fn repo_root() -> Result<PathBuf> {
    let repo = Repository::discover(".").context("not inside a Git repository")?;
    let workdir = repo
        .workdir()
        .context("repository has no working directory")?;
    Ok(workdir.to_path_buf())
}

/// Resolve the `.git` directory for the repository at `repo_root`.
///
/// Handles worktrees and `.git` files, where the git dir is not simply
/// `repo_root/.git`.
pub fn git_dir(repo_root: &Path) -> Result<PathBuf> {
    let repo = Repository::discover(repo_root).with_context(|| {
        format!(
            "failed to discover Git repository from {}",
            repo_root.display()
        )
    })?;
    Ok(repo.path().to_path_buf())
}

/// Directory for autopush runtime files (pid lock, logs).
///
/// It lives inside the git dir so it never shows up in `git status`.
pub fn autopush_dir(git_dir: &Path) -> PathBuf {
    git_dir.join("autopush")
}

/// Create the autopush runtime directory if absent.
pub fn ensure_autopush_dir(git_dir: &Path) -> Result<PathBuf> {
    let dir = autopush_dir(git_dir);
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    Ok(dir)
}
