use std::{
    fs::{self, File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use fs2::FileExt;
use tracing::debug;

use crate::core::git::autopush_dir;

/// Path to the PID lock file inside the git dir.
#[must_use]
pub fn pid_file(git_dir: &Path) -> PathBuf {
    autopush_dir(git_dir).join("autopush.pid")
}

/// Guard for the single running loop of a repository. Dropping it releases
/// the lock; the PID file stays so every instance locks the same inode.
pub struct InstanceLock {
    file: File,
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// Acquire the exclusive instance lock and record our PID.
///
/// # Errors
/// Returns an error if another loop already holds the lock or the file
/// cannot be written.
pub fn acquire_lock(git_dir: &Path) -> Result<InstanceLock> {
    let path = pid_file(git_dir);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(&path)
        .with_context(|| format!("failed to open lock file {}", path.display()))?;

    if file.try_lock_exclusive().is_err() {
        let holder = fs::read_to_string(&path).unwrap_or_default();
        bail!(
            "autopush already running (pid {}) for this repository",
            holder.trim()
        );
    }

    file.set_len(0)
        .with_context(|| format!("failed to truncate {}", path.display()))?;
    write!(file, "{}", std::process::id())
        .with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), pid = std::process::id(), "instance lock acquired");

    Ok(InstanceLock { file })
}

/// Whether a loop currently holds the instance lock.
///
/// # Errors
/// Returns an error if an existing PID file cannot be opened.
pub fn is_running(git_dir: &Path) -> Result<bool> {
    let path = pid_file(git_dir);
    if !path.exists() {
        return Ok(false);
    }
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    if file.try_lock_exclusive().is_ok() {
        let _ = file.unlock();
        Ok(false)
    } else {
        Ok(true)
    }
}
